use std::time::UNIX_EPOCH;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use foodservice::api::{RecipeDetails, RecipeDetailsPatch};
use foodservice::client::FoodServiceClient;

fn foodservice_url() -> String {
    std::env::var("FOODSERVICE_URL").unwrap_or("http://127.0.0.1:5000".to_string())
}

fn unique_name(prefix: &str) -> String {
    format!(
        "{} {}",
        prefix,
        std::time::SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
    )
}

fn sample_recipe(name: &str) -> RecipeDetails {
    RecipeDetails {
        name: name.to_string(),
        description: "Fragrant layered rice".to_string(),
        cuisine: "hyderabadi".to_string(),
        course: "main course".to_string(),
        diet: "vegetarian".to_string(),
        prep_time: "60 mins".to_string(),
        ingredients: vec![
            "basmati rice".to_string(),
            "saffron".to_string(),
            "yogurt".to_string(),
            "onion".to_string(),
        ],
        instructions: "Layer parboiled rice with the gravy and steam.".to_string(),
    }
}

#[tokio::test]
/// Simple test for the recipe repository surface
/// Creates a recipe
/// Gets the recipe
/// Patches the recipe
/// Gets list of recipes and checks if the recipe is there
async fn foodservice_recipe_e2e_test() {
    let client = FoodServiceClient::new(&foodservice_url()).expect("Failed to create client");

    let name = unique_name("test biryani");
    let recipe_details = sample_recipe(&name);

    let recipe_id = client
        .add_recipe(recipe_details.clone())
        .await
        .expect("Failed to add recipe");

    let returned_details = client
        .get_recipe(recipe_id)
        .await
        .expect("Failed to get recipe")
        .expect("Recipe not found");
    assert_eq!(returned_details, recipe_details);

    let updated_prep_time = "75 mins".to_string();
    let patch = RecipeDetailsPatch {
        prep_time: Some(updated_prep_time.clone()),
        ..RecipeDetailsPatch::default()
    };
    let patched = client
        .update_recipe(recipe_id, patch)
        .await
        .expect("Failed to patch recipe");
    assert!(patched);

    let returned_details = client
        .get_recipe(recipe_id)
        .await
        .expect("Failed to get recipe")
        .expect("Recipe not found");
    let expected_details = RecipeDetails {
        prep_time: updated_prep_time,
        ..recipe_details
    };
    assert_eq!(returned_details, expected_details);

    let recipes = client.list_recipes().await.expect("Failed to list recipes");
    assert!(recipes
        .iter()
        .any(|entry| entry.recipe_id == recipe_id && entry.name == name));
}

#[tokio::test]
/// Chat flow test
/// Creates two recipes with overlapping ingredients
/// Asks for one by exact name and expects the recipe card
/// Asks with a typo and expects a guess, then picks option 1
/// Asks for recommendations for the dish
async fn foodservice_chat_e2e_test() {
    let client = FoodServiceClient::new(&foodservice_url()).expect("Failed to create client");

    let dish = unique_name("chat biryani");
    let similar_dish = format!("{} pulao", dish);
    client
        .add_recipe(sample_recipe(&dish))
        .await
        .expect("Failed to add recipe");
    client
        .add_recipe(sample_recipe(&similar_dish))
        .await
        .expect("Failed to add recipe");

    let user_id = unique_name("user");

    let reply = client
        .ask_recipe(&user_id, &dish)
        .await
        .expect("Failed to ask for recipe");
    assert!(reply.response.contains(&dish));
    assert!(reply.response.contains("🍽 Dish:"));

    // Same name with a typo in the last word still finds the dish family
    let typo_dish = format!("{}x", dish);
    let reply = client
        .ask_recipe(&user_id, &typo_dish)
        .await
        .expect("Failed to ask for recipe");
    assert!(reply.response.contains("1. "));

    let reply = client
        .ask_recipe(&user_id, "1")
        .await
        .expect("Failed to pick option");
    assert!(reply.response.contains("🍽 Dish:"));

    // The recommendation index refreshes on an interval; wait out one tick
    let mut recommended = serde_json::Value::Null;
    for _ in 0..15 {
        recommended = client
            .recommend(&dish, Some(3))
            .await
            .expect("Failed to get recommendations");
        if recommended.get("response").is_some() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_secs(1)).await;
    }
    let response = recommended
        .get("response")
        .and_then(|v| v.as_str())
        .expect("No recommendations for dish");
    assert!(response.contains(&similar_dish));
}

#[tokio::test]
/// Locality flow test
/// The places upstream may be unreachable or keyless in the test
/// environment; when the server does answer, the body must be one of the
/// two documented shapes
async fn foodservice_locality_e2e_test() {
    let client = FoodServiceClient::new(&foodservice_url()).expect("Failed to create client");

    if let Ok(body) = client.locality("biryani", "Hyderabad").await {
        assert!(body.get("response").is_some() || body.get("error").is_some());
    }
}

#[tokio::test]
/// MCP handshake and token validation test
async fn foodservice_mcp_and_validate_e2e_test() {
    let client = FoodServiceClient::new(&foodservice_url()).expect("Failed to create client");

    let manifest = client
        .mcp_manifest(None)
        .await
        .expect("Failed to get manifest");
    assert_eq!(manifest.status, "ok");
    assert!(manifest.tools.iter().any(|tool| tool.name == "get_recipe"));
    assert_eq!(manifest.auth.phone, None);

    let token = STANDARD.encode("919876543210");
    let manifest = client
        .mcp_manifest(Some(&token))
        .await
        .expect("Failed to get manifest");
    assert_eq!(manifest.auth.phone, Some("919876543210".to_string()));

    let phone = client.validate(&token).await.expect("Failed to validate");
    assert_eq!(phone, Some("919876543210".to_string()));

    let bad_token = STANDARD.encode("not-a-phone");
    let phone = client
        .validate(&bad_token)
        .await
        .expect("Failed to validate");
    assert_eq!(phone, None);
}
