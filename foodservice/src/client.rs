use anyhow::{bail, Context};
use reqwest::header::{AUTHORIZATION, LOCATION};
use reqwest::StatusCode;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;

use crate::api::{
    BotReply, GetAllRecipesResponse, McpManifest, RecipeDetails, RecipeDetailsPatch, RecipeId,
    RecipeNameAndId, ValidateResponse,
};

pub struct FoodServiceClient {
    url: String,
    client: ClientWithMiddleware,
}

impl FoodServiceClient {
    pub fn new(url: &str) -> anyhow::Result<Self> {
        let reqwest_client = reqwest::Client::builder()
            .build()
            .context("Failed to build reqwest client")?;
        let client = ClientBuilder::new(reqwest_client)
            // Insert the tracing middleware
            .with(TracingMiddleware::default())
            .build();

        Ok(Self {
            url: url.to_string(),
            client,
        })
    }

    /// Calls POST /api/recipe endpoint
    /// Returns the id assigned to the added recipe
    pub async fn add_recipe(&self, recipe_details: RecipeDetails) -> anyhow::Result<RecipeId> {
        let response = self
            .client
            .post(format!("{}/api/recipe", self.url))
            .json(&recipe_details)
            .send()
            .await?;

        if !response.status().is_success() {
            let error: String = response.json().await.unwrap_or_default();
            bail!("Failed to add recipe {}", error)
        }

        let location_header = response
            .headers()
            .get(LOCATION)
            .context("No location header")?;

        location_header
            .to_str()
            .context("Failed to convert header to str")?
            .strip_prefix("/api/recipe/")
            .context("Invalid location header")?
            .parse()
            .context("Failed to parse recipe id")
    }

    /// Calls GET /api/recipe/{recipe_id} endpoint
    /// Returns recipe details if the recipe was present
    /// None if recipe was not in the repository
    /// and error in case of any other failure
    pub async fn get_recipe(&self, recipe_id: RecipeId) -> anyhow::Result<Option<RecipeDetails>> {
        let response = self
            .client
            .get(format!("{}/api/recipe/{}", self.url, recipe_id))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            Ok(None)
        } else if response.status().is_success() {
            Ok(Some(response.json().await?))
        } else {
            let error: String = response.json().await.unwrap_or_default();
            bail!("Failed to get recipe {}", error)
        }
    }

    /// Calls PATCH /api/recipe/{recipe_id} endpoint
    /// Returns true if the recipe was updated and false if it was not found
    pub async fn update_recipe(
        &self,
        recipe_id: RecipeId,
        patch: RecipeDetailsPatch,
    ) -> anyhow::Result<bool> {
        let response = self
            .client
            .patch(format!("{}/api/recipe/{}", self.url, recipe_id))
            .json(&patch)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            Ok(false)
        } else if response.status().is_success() {
            Ok(true)
        } else {
            let error: String = response.json().await.unwrap_or_default();
            bail!("Failed to update recipe {}", error)
        }
    }

    /// Calls GET /api/recipes endpoint
    pub async fn list_recipes(&self) -> anyhow::Result<Vec<RecipeNameAndId>> {
        let response = self
            .client
            .get(format!("{}/api/recipes", self.url))
            .send()
            .await?;
        if response.status().is_success() {
            let body: GetAllRecipesResponse = response.json().await?;
            Ok(body.recipes)
        } else {
            let error: String = response.json().await.unwrap_or_default();
            bail!("Failed to list recipes {}", error)
        }
    }

    /// Calls GET /api/recipe?user_id=..&dish=.. endpoint (the chat flow)
    pub async fn ask_recipe(&self, user_id: &str, dish: &str) -> anyhow::Result<BotReply> {
        let response = self
            .client
            .get(format!("{}/api/recipe", self.url))
            .query(&[("user_id", user_id), ("dish", dish)])
            .send()
            .await?;
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            let error: String = response.json().await.unwrap_or_default();
            bail!("Failed to ask for recipe {}", error)
        }
    }

    /// Calls GET /api/locality endpoint
    /// The body is either a BotReply or an error shape, returned raw
    pub async fn locality(&self, dish: &str, city: &str) -> anyhow::Result<serde_json::Value> {
        let response = self
            .client
            .get(format!("{}/api/locality", self.url))
            .query(&[("dish", dish), ("city", city)])
            .send()
            .await?;
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            bail!("Failed to get locality, status {}", response.status())
        }
    }

    /// Calls GET /api/recommend endpoint
    /// The body is either a BotReply or an error shape, returned raw
    pub async fn recommend(
        &self,
        dish: &str,
        top_n: Option<usize>,
    ) -> anyhow::Result<serde_json::Value> {
        let mut request = self
            .client
            .get(format!("{}/api/recommend", self.url))
            .query(&[("dish", dish)]);
        if let Some(top_n) = top_n {
            request = request.query(&[("top_n", top_n.to_string())]);
        }
        let response = request.send().await?;
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            bail!("Failed to get recommendations, status {}", response.status())
        }
    }

    /// Calls GET /mcp endpoint
    pub async fn mcp_manifest(&self, token: Option<&str>) -> anyhow::Result<McpManifest> {
        let mut request = self.client.get(format!("{}/mcp", self.url));
        if let Some(token) = token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        let response = request.send().await?;
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            bail!("Failed to get manifest, status {}", response.status())
        }
    }

    /// Calls GET /validate endpoint
    /// Returns the phone number carried by the token, None on 401
    pub async fn validate(&self, token: &str) -> anyhow::Result<Option<String>> {
        let response = self
            .client
            .get(format!("{}/validate", self.url))
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .send()
            .await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            Ok(None)
        } else if response.status().is_success() {
            let body: ValidateResponse = response.json().await?;
            Ok(Some(body.phone))
        } else {
            bail!("Failed to validate token, status {}", response.status())
        }
    }
}
