use anyhow::Context;
use serde_json::json;
use tokio_postgres::{Client, NoTls, Statement};

use crate::api::{RecipeDetails, RecipeDetailsPatch, RecipeId, RecipeNameAndId};
use crate::recipes_repository::RecipeRepositoryError::Other;
use crate::recipes_repository::{RecipeRepository, RecipeRepositoryError};

pub struct PostgresRecipeRepository {
    client: Client,
}

pub struct PostgresRecipeRepositoryConfig {
    pub hostname: String,
    pub username: String,
    pub password: String,
}

impl PostgresRecipeRepository {
    pub async fn init(config: PostgresRecipeRepositoryConfig) -> anyhow::Result<Self> {
        let connection_str = format!(
            "postgresql://{}:{}@{}",
            config.username, config.password, config.hostname
        );
        tracing::info!("Postgres connection_str: {}", connection_str);
        let (client, connection) = tokio_postgres::connect(&connection_str, NoTls)
            .await
            .context("Failed to start postgres")?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                eprintln!("connection error: {}", e);
            }
        });

        client
            .batch_execute(
                "
        CREATE TABLE IF NOT EXISTS recipes (
            id              SERIAL PRIMARY KEY,
            params          JSONB
            )
        ",
            )
            .await
            .context("Failed to setup table")?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl RecipeRepository for PostgresRecipeRepository {
    async fn add_recipe(&self, details: RecipeDetails) -> Result<RecipeId, RecipeRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("INSERT INTO recipes (params) VALUES ($1) RETURNING id")
            .await?;

        let rows = self.client.query(&stmt, &[&json!(details)]).await?;

        let recipe_id: RecipeId = rows
            .first()
            .ok_or_else(|| RecipeRepositoryError::Other("Id not returned".to_string()))?
            .try_get(0)?;

        Ok(recipe_id)
    }

    async fn update_recipe(
        &self,
        recipe_id: RecipeId,
        patch: RecipeDetailsPatch,
    ) -> Result<bool, RecipeRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare(
                "UPDATE recipes SET params = params || ($1)::JSONB WHERE id = ($2) RETURNING id",
            )
            .await?;

        let rows = self
            .client
            .query(&stmt, &[&json!(patch), &recipe_id])
            .await?;
        Ok(!rows.is_empty())
    }

    async fn get_recipe(
        &self,
        recipe_id: RecipeId,
    ) -> Result<RecipeDetails, RecipeRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("SELECT params FROM recipes WHERE id = ($1)")
            .await?;

        let rows = self.client.query(&stmt, &[&recipe_id]).await?;

        let details: serde_json::Value = rows
            .first()
            .ok_or(RecipeRepositoryError::NotFound(recipe_id))?
            .try_get(0)?;

        Ok(serde_json::from_value(details)?)
    }

    async fn find_by_name(
        &self,
        name: &str,
    ) -> Result<Option<(RecipeId, RecipeDetails)>, RecipeRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("SELECT id, params FROM recipes WHERE LOWER(params->>'name') = LOWER($1) LIMIT 1")
            .await?;

        let rows = self.client.query(&stmt, &[&name]).await?;

        rows.first()
            .map(|row| {
                let recipe_id: RecipeId = row.try_get(0)?;
                let details: serde_json::Value = row.try_get(1)?;
                Ok((recipe_id, serde_json::from_value(details)?))
            })
            .transpose()
    }

    async fn list_recipes(&self) -> Result<Vec<RecipeNameAndId>, RecipeRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("SELECT id, params->'name' FROM recipes")
            .await?;

        let rows = self.client.query(&stmt, &[]).await?;

        rows.iter()
            .map(|row| {
                let recipe_id = row.try_get(0)?;
                let name_json: serde_json::Value = row.try_get(1)?;

                Ok(RecipeNameAndId {
                    recipe_id,
                    name: name_json
                        .as_str()
                        .ok_or_else(|| Other("Name is not string".to_string()))?
                        .to_string(),
                })
            })
            .collect()
    }

    async fn all_recipes(&self) -> Result<Vec<(RecipeId, RecipeDetails)>, RecipeRepositoryError> {
        let stmt: Statement = self.client.prepare("SELECT id, params FROM recipes").await?;

        let rows = self.client.query(&stmt, &[]).await?;

        rows.iter()
            .map(|row| {
                let recipe_id: RecipeId = row.try_get(0)?;
                let details: serde_json::Value = row.try_get(1)?;
                Ok((recipe_id, serde_json::from_value(details)?))
            })
            .collect()
    }
}

#[cfg(test)]
mod postgres_recipe_repository_tests {
    use serial_test::file_serial;
    use testcontainers::core::IntoContainerPort;
    use testcontainers::runners::AsyncRunner;
    use testcontainers::{ContainerAsync, GenericImage, ImageExt};

    use crate::api::{RecipeDetails, RecipeDetailsPatch};
    use crate::recipes_repository::{RecipeRepository, RecipeRepositoryError};

    async fn start_postgres_container_and_init_repo() -> (
        ContainerAsync<GenericImage>,
        crate::recipes_repository::PostgresRecipeRepository,
    ) {
        let _pg_container = GenericImage::new("postgres", "latest")
            .with_mapped_port(5432, 5432.tcp())
            .with_env_var("POSTGRES_USER", "postgres")
            .with_env_var("POSTGRES_PASSWORD", "postgres")
            .start()
            .await
            .expect("Failed to start postgres");

        for _ in 0..10 {
            if let Ok(repo) = crate::recipes_repository::PostgresRecipeRepository::init(
                crate::recipes_repository::PostgresRecipeRepositoryConfig {
                    hostname: "127.0.0.1".to_string(),
                    username: "postgres".to_string(),
                    password: "postgres".to_string(),
                },
            )
            .await
            {
                return (_pg_container, repo);
            }
            tokio::time::sleep(std::time::Duration::from_millis(300)).await;
        }
        panic!("Failed to setup postgres container")
    }

    fn sample_recipe(name: &str) -> RecipeDetails {
        RecipeDetails {
            name: name.to_string(),
            description: "rich tomato gravy".to_string(),
            cuisine: "punjabi".to_string(),
            course: "main course".to_string(),
            diet: "vegetarian".to_string(),
            prep_time: "40 mins".to_string(),
            ingredients: vec!["cottage cheese".to_string(), "butter".to_string()],
            instructions: "Simmer paneer cubes in the gravy.".to_string(),
        }
    }

    #[tokio::test]
    #[file_serial(key, path => "../.pgtestslock")]
    /// Tests add_recipe, get_recipe and find_by_name against a real postgres
    /// for the sake of not starting container multiple times it tests everything in one testcase
    async fn test_add_recipe_get_and_find_it() {
        let (_container, repo) = start_postgres_container_and_init_repo().await;

        let not_existing_recipe_id = 20000;
        let recipe_not_found = repo.get_recipe(not_existing_recipe_id).await;
        assert!(matches!(
            recipe_not_found,
            Err(RecipeRepositoryError::NotFound(..))
        ));

        let recipe_details = sample_recipe("Paneer Butter Masala");
        let id = repo
            .add_recipe(recipe_details.clone())
            .await
            .expect("Failed to add recipe");

        let details = repo.get_recipe(id).await.expect("Failed to get recipe");
        assert_eq!(details, recipe_details);

        let found = repo
            .find_by_name("paneer butter masala")
            .await
            .expect("Failed to find recipe");
        assert_eq!(found, Some((id, recipe_details)));
    }

    #[tokio::test]
    #[file_serial(key, path => "../.pgtestslock")]
    /// Tests update_recipe merge patch semantics
    /// for the sake of not starting container multiple times it tests everything in one testcase
    async fn test_add_recipe_patch_and_get_it() {
        let (_container, repo) = start_postgres_container_and_init_repo().await;

        let not_existing_recipe = 2000;
        let result = repo
            .update_recipe(not_existing_recipe, RecipeDetailsPatch::default())
            .await
            .expect("Failed to update");
        // false means nothing to update
        assert!(!result);

        let recipe_details = sample_recipe("Paneer Butter Masala");
        let id = repo
            .add_recipe(recipe_details.clone())
            .await
            .expect("Failed to add recipe");

        let patch_diet_only = RecipeDetailsPatch {
            diet: Some("high protein vegetarian".to_string()),
            ..RecipeDetailsPatch::default()
        };
        let patch_result = repo
            .update_recipe(id, patch_diet_only)
            .await
            .expect("Failed to patch");
        assert!(patch_result);

        let expected_with_patched_diet = RecipeDetails {
            diet: "high protein vegetarian".to_string(),
            ..recipe_details
        };
        assert_eq!(repo.get_recipe(id).await.unwrap(), expected_with_patched_diet);
    }
}
