use std::sync::Arc;

use actix_web::http::header::{AUTHORIZATION, LOCATION};
use actix_web::web::Data;
use actix_web::{Error, HttpRequest, HttpResponse};
use paperclip::actix::{
    api_v2_operation,
    web::{self},
    Apiv2Schema,
};
use serde::Deserialize;
use serde_json::json;

use crate::api::{
    BotReply, GetAllRecipesResponse, McpAuth, McpManifest, McpTool, RecipeDetails,
    RecipeDetailsPatch, RecipeId, ValidateResponse,
};
use crate::auth::{phone_from_authorization_header, AuthError};
use crate::formatter;
use crate::places_client::PlacesClient;
use crate::recipe_search::{extract_entities, rank_candidates};
use crate::recipes_repository::{RecipeRepository, RecipeRepositoryError};
use crate::recommendations::DEFAULT_TOP_N;
use crate::recommendations_updater::RecommendationsProvider;
use crate::user_sessions::{UserSession, UserSessions};

const SERVICE_NAME: &str = "Desi Food MCP";

#[derive(Debug, Deserialize, Apiv2Schema)]
pub struct AskRecipeQuery {
    pub user_id: String,
    pub dish: String,
}

#[derive(Debug, Deserialize, Apiv2Schema)]
pub struct LocalityQuery {
    pub dish: String,
    pub city: String,
}

#[derive(Debug, Deserialize, Apiv2Schema)]
pub struct RecommendQuery {
    pub dish: String,
    pub top_n: Option<usize>,
}

#[api_v2_operation]
pub async fn health() -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().finish())
}

#[api_v2_operation]
pub async fn add_recipe(
    recipes_repository: Data<Arc<dyn RecipeRepository + Send + Sync>>,
    details: web::Json<RecipeDetails>,
) -> Result<HttpResponse, Error> {
    Ok(
        match recipes_repository.add_recipe(details.into_inner()).await {
            Ok(recipe_id) => HttpResponse::Ok()
                .append_header((LOCATION, format!("/api/recipe/{}", recipe_id)))
                .finish(),
            Err(err) => {
                tracing::error!("Add recipe failed {}", err);
                HttpResponse::InternalServerError().finish()
            }
        },
    )
}

#[api_v2_operation]
pub async fn get_recipe(
    recipes_repository: Data<Arc<dyn RecipeRepository + Send + Sync>>,
    recipe_id: web::Path<RecipeId>,
) -> Result<HttpResponse, Error> {
    Ok(
        match recipes_repository.get_recipe(recipe_id.into_inner()).await {
            Ok(recipe_details) => HttpResponse::Ok().json(recipe_details),
            Err(RecipeRepositoryError::NotFound(_)) => HttpResponse::NotFound().finish(),
            Err(err) => {
                tracing::error!("Get recipe failed {}", err);
                HttpResponse::InternalServerError().finish()
            }
        },
    )
}

#[api_v2_operation]
pub async fn update_recipe(
    recipes_repository: Data<Arc<dyn RecipeRepository + Send + Sync>>,
    recipe_id: web::Path<RecipeId>,
    patch: web::Json<RecipeDetailsPatch>,
) -> Result<HttpResponse, Error> {
    Ok(
        match recipes_repository
            .update_recipe(recipe_id.into_inner(), patch.into_inner())
            .await
        {
            Ok(true) => HttpResponse::Ok().finish(),
            Ok(false) => HttpResponse::NotFound().finish(),
            Err(err) => {
                tracing::error!("Update recipe failed {}", err);
                HttpResponse::InternalServerError().finish()
            }
        },
    )
}

#[api_v2_operation]
pub async fn get_all_recipes(
    recipes_repository: Data<Arc<dyn RecipeRepository + Send + Sync>>,
) -> Result<HttpResponse, Error> {
    Ok(match recipes_repository.list_recipes().await {
        Ok(recipes) => HttpResponse::Ok().json(GetAllRecipesResponse { recipes }),
        Err(err) => {
            tracing::error!("Get all recipes failed {}", err);
            HttpResponse::InternalServerError().finish()
        }
    })
}

/// The conversational recipe endpoint. Interprets the `dish` parameter as
/// the next message in a chat: a fresh search, a numeric pick from the
/// previously offered options, a "show more" request, or a name from the
/// previous suggestion list.
#[api_v2_operation]
pub async fn ask_recipe(
    recipes_repository: Data<Arc<dyn RecipeRepository + Send + Sync>>,
    sessions: Data<UserSessions>,
    recommendations: Data<RecommendationsProvider>,
    query: web::Query<AskRecipeQuery>,
) -> Result<HttpResponse, Error> {
    let user_id = query.user_id.as_str();
    let dish_clean = query.dish.trim().to_lowercase();

    if !dish_clean.is_empty() && dish_clean.chars().all(|c| c.is_ascii_digit()) {
        return Ok(reply(
            numeric_choice(&recipes_repository, &sessions, user_id, &dish_clean).await,
        ));
    }

    if ["show more", "showmore", "more"].contains(&dish_clean.as_str()) {
        return Ok(reply(
            show_more(&recipes_repository, &sessions, user_id).await,
        ));
    }

    // A message matching one of the previous suggestions selects that dish
    if let Some(session) = sessions.get(user_id) {
        let candidates = session
            .options
            .iter()
            .chain(session.recommendations.iter());
        for name in candidates {
            if name.to_lowercase().contains(&dish_clean) {
                sessions.clear(user_id);
                if let Some((_, details)) = find_recipe(&recipes_repository, name).await? {
                    return Ok(reply(formatter::format_recipe_response(&details)));
                }
                break;
            }
        }
    }

    let mut extracted = extract_entities(&dish_clean);
    if extracted.dish.is_none() {
        if let Some(session) = sessions.get(user_id) {
            extracted.dish = session.last_dish.clone();
            extracted.diet = extracted.diet.or(session.diet);
            extracted.course = extracted.course.or(session.course);
        }
    }
    let dish_entity = extracted.dish.unwrap_or_else(|| dish_clean.clone());

    // Exact hit, else ranked candidates from the full name list
    let exact = find_recipe(&recipes_repository, &dish_entity).await?;
    let options = if exact.is_some() {
        vec![]
    } else {
        let names: Vec<String> = match recipes_repository.list_recipes().await {
            Ok(recipes) => recipes.into_iter().map(|r| r.name).collect(),
            Err(err) => {
                tracing::error!("List recipes failed {}", err);
                return Ok(HttpResponse::InternalServerError().finish());
            }
        };
        rank_candidates(&dish_entity, &names)
    };

    if exact.is_none() && options.is_empty() {
        return Ok(reply(format!(
            "❌ Sorry, I couldn't find anything for '{}'.",
            dish_entity
        )));
    }

    let recommended = recommendations.recommend_filtered(
        &dish_entity,
        extracted.diet.as_deref(),
        extracted.course.as_deref(),
        DEFAULT_TOP_N,
    );
    let recommended_names: Vec<String> =
        recommended.iter().map(|(name, _)| name.clone()).collect();

    sessions.set(
        user_id,
        UserSession {
            last_dish: Some(dish_entity.clone()),
            diet: extracted.diet.clone(),
            course: extracted.course.clone(),
            options: options.clone(),
            recommendations: recommended_names,
        },
    );

    let mut base_response = match (&exact, options.len()) {
        (Some((_, details)), _) => formatter::format_recipe_response(details),
        (None, 1) => formatter::format_guess_with_options(&options[0], &options),
        (None, _) => formatter::format_options_response(&options),
    };

    if !recommended.is_empty() {
        let preview_lines = recommended
            .iter()
            .enumerate()
            .map(|(i, (name, course))| {
                if course.is_empty() {
                    format!("{}. {}", i + 1, name)
                } else {
                    format!("{}. {} ({})", i + 1, name, course)
                }
            })
            .collect::<Vec<_>>()
            .join("\n");
        base_response += &format!(
            "\n\n💡 You might also like:\n{}\n(Reply with the name or number to see details!)",
            preview_lines
        );
    }

    Ok(reply(base_response))
}

#[api_v2_operation]
pub async fn locality(
    places_client: Data<Arc<PlacesClient>>,
    query: web::Query<LocalityQuery>,
) -> Result<HttpResponse, Error> {
    Ok(
        match places_client.nearby_places(&query.dish, &query.city).await {
            Ok(places) if places.is_empty() => {
                HttpResponse::Ok().json(json!({"error": "No nearby places found."}))
            }
            Ok(places) => HttpResponse::Ok().json(BotReply::new(
                formatter::format_locality_response(&query.dish, &query.city, &places),
            )),
            Err(err) => {
                tracing::error!("Places lookup failed {}", err);
                HttpResponse::BadGateway().finish()
            }
        },
    )
}

#[api_v2_operation]
pub async fn recommend(
    recommendations: Data<RecommendationsProvider>,
    query: web::Query<RecommendQuery>,
) -> Result<HttpResponse, Error> {
    let top_n = query.top_n.unwrap_or(DEFAULT_TOP_N);
    let recommended = recommendations.recommend(&query.dish, top_n);
    Ok(if recommended.is_empty() {
        HttpResponse::Ok().json(json!({"error": "No recommendations found."}))
    } else {
        HttpResponse::Ok().json(BotReply::new(formatter::format_recommendation_response(
            &query.dish,
            &recommended,
        )))
    })
}

/// MCP discovery handshake. Always 200; a valid bearer token only enriches
/// the auth descriptor with the caller's phone.
#[api_v2_operation]
pub async fn mcp_manifest(request: HttpRequest) -> Result<HttpResponse, Error> {
    let phone = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| phone_from_authorization_header(value).ok());

    let manifest = McpManifest {
        name: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "ok".to_string(),
        tools: vec![
            McpTool {
                name: "get_recipe".to_string(),
                method: "GET".to_string(),
                path: "/api/recipe".to_string(),
                params: vec!["user_id".to_string(), "dish".to_string()],
                auth: None,
            },
            McpTool {
                name: "locality".to_string(),
                method: "GET".to_string(),
                path: "/api/locality".to_string(),
                params: vec!["dish".to_string(), "city".to_string()],
                auth: None,
            },
            McpTool {
                name: "recommend".to_string(),
                method: "GET".to_string(),
                path: "/api/recommend".to_string(),
                params: vec!["dish".to_string(), "top_n".to_string()],
                auth: None,
            },
            McpTool {
                name: "validate".to_string(),
                method: "GET".to_string(),
                path: "/validate".to_string(),
                params: vec![],
                auth: Some("Bearer Base64(phone)".to_string()),
            },
        ],
        auth: McpAuth {
            auth_type: "bearer_base64_phone".to_string(),
            validate_path: "/validate".to_string(),
            phone,
        },
    };
    Ok(HttpResponse::Ok().json(manifest))
}

#[api_v2_operation]
pub async fn validate(request: HttpRequest) -> Result<HttpResponse, Error> {
    let Some(header_value) = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
    else {
        return Ok(
            HttpResponse::Unauthorized().json(json!({"detail": AuthError::MissingBearer.to_string()}))
        );
    };

    Ok(match phone_from_authorization_header(header_value) {
        Ok(phone) => HttpResponse::Ok().json(ValidateResponse { phone }),
        Err(err) => HttpResponse::Unauthorized().json(json!({"detail": err.to_string()})),
    })
}

fn reply(text: impl Into<String>) -> HttpResponse {
    HttpResponse::Ok().json(BotReply::new(text))
}

async fn find_recipe(
    recipes_repository: &Data<Arc<dyn RecipeRepository + Send + Sync>>,
    name: &str,
) -> Result<Option<(RecipeId, RecipeDetails)>, Error> {
    match recipes_repository.find_by_name(name).await {
        Ok(found) => Ok(found),
        Err(err) => {
            tracing::error!("Find recipe failed {}", err);
            Ok(None)
        }
    }
}

async fn numeric_choice(
    recipes_repository: &Data<Arc<dyn RecipeRepository + Send + Sync>>,
    sessions: &Data<UserSessions>,
    user_id: &str,
    choice: &str,
) -> String {
    let Some(session) = sessions.get(user_id) else {
        return "⚠ No list to choose from right now. Try searching again.".to_string();
    };

    // Prefer explicit options, fall back to the recommendation preview
    let options = if !session.options.is_empty() {
        session.options
    } else {
        session.recommendations
    };
    if options.is_empty() {
        return "⚠ No list to choose from right now. Try searching again.".to_string();
    }

    let choice_no: usize = match choice.parse() {
        Ok(n) => n,
        Err(_) => 0,
    };
    if choice_no == 0 || choice_no > options.len() {
        return format!(
            "⚠ Invalid choice. Please reply with a number between 1 and {}.",
            options.len()
        );
    }

    let chosen_dish = &options[choice_no - 1];
    sessions.clear(user_id);
    match recipes_repository.find_by_name(chosen_dish).await {
        Ok(Some((_, details))) => formatter::format_recipe_response(&details),
        Ok(None) => format!("❌ Sorry, I couldn't fetch details for '{}'.", chosen_dish),
        Err(err) => {
            tracing::error!("Find recipe failed {}", err);
            format!("❌ Sorry, I couldn't fetch details for '{}'.", chosen_dish)
        }
    }
}

async fn show_more(
    recipes_repository: &Data<Arc<dyn RecipeRepository + Send + Sync>>,
    sessions: &Data<UserSessions>,
    user_id: &str,
) -> String {
    let Some(session) = sessions.get(user_id) else {
        return "⚠ No saved recommendations. Please search for a dish first.".to_string();
    };
    if session.recommendations.is_empty() {
        return "⚠ No saved recommendations. Please search for a dish first.".to_string();
    }

    let mut full_recipes = vec![];
    for name in &session.recommendations {
        if let Ok(Some((_, details))) = recipes_repository.find_by_name(name).await {
            full_recipes.push(details);
        }
    }
    sessions.clear(user_id);

    if full_recipes.is_empty() {
        return "❌ Sorry, no recipes found for those recommendations.".to_string();
    }

    full_recipes
        .iter()
        .map(formatter::format_recipe_response)
        .collect::<Vec<_>>()
        .join("\n\n")
}
