//! Chat reply formatting. The bot client renders these strings verbatim,
//! so the shapes (emoji labels, numbering, markdown links) are part of the
//! wire contract.

use crate::api::{Place, RecipeDetails};

pub fn format_recipe_response(details: &RecipeDetails) -> String {
    format!(
        "🍽 Dish: {}\n\
         📖 Description: {}\n\
         🍲 Cuisine: {}\n\
         📚 Course: {}\n\
         🥗 Diet: {}\n\
         ⏱ Prep Time: {}\n\
         🛒 Ingredients: {}\n\
         📝 Instructions: {}",
        details.name,
        details.description,
        details.cuisine,
        details.course,
        details.diet,
        details.prep_time,
        details.ingredients.join(", "),
        details.instructions,
    )
}

pub fn format_options_response(options: &[String]) -> String {
    let numbered = options
        .iter()
        .enumerate()
        .map(|(i, option)| format!("{}. {}", i + 1, option))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "I found several matching dishes:\n{}\n\nPlease reply with the exact name or number.",
        numbered
    )
}

pub fn format_guess_with_options(guess: &str, options: &[String]) -> String {
    let numbered = options
        .iter()
        .enumerate()
        .map(|(i, option)| format!("{}. {}", i + 1, option))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "🤔 Did you mean '{}'?\nHere are similar dishes:\n{}\n\nPlease reply with the name or number.",
        guess, numbered
    )
}

pub fn format_locality_response(dish: &str, city: &str, places: &[Place]) -> String {
    let mut response = format!("📍 Where to find *{}* in {}:\n", dish, city);
    for place in places {
        let rating = place
            .rating
            .map(|r| r.to_string())
            .unwrap_or_else(|| "N/A".to_string());
        response += &format!("🍴 {} (⭐ {})\n", place.name, rating);
        response += &format!("📍 {}\n", place.address);
        response += &format!("🔗 [View on Maps]({})\n\n", place.maps_url);
    }
    response.trim_end().to_string()
}

pub fn format_recommendation_response(dish: &str, recommendations: &[String]) -> String {
    let mut response = format!("🍽 If you like *{}*, you might also enjoy:\n", dish);
    for name in recommendations {
        response += &format!("- {}\n", name);
    }
    response.trim_end().to_string()
}

#[cfg(test)]
mod formatter_tests {
    use super::*;
    use crate::api::{Place, RecipeDetails};

    #[test]
    fn recipe_card_lists_every_field() {
        let details = RecipeDetails {
            name: "rajma masala".to_string(),
            description: "slow cooked".to_string(),
            cuisine: "punjabi".to_string(),
            course: "main course".to_string(),
            diet: "vegetarian".to_string(),
            prep_time: "45 mins".to_string(),
            ingredients: vec!["kidney beans".to_string(), "onion".to_string()],
            instructions: "Pressure cook, then simmer.".to_string(),
        };
        let card = format_recipe_response(&details);
        assert!(card.starts_with("🍽 Dish: rajma masala\n"));
        assert!(card.contains("🛒 Ingredients: kidney beans, onion\n"));
        assert!(card.ends_with("📝 Instructions: Pressure cook, then simmer."));
    }

    #[test]
    fn options_are_numbered_from_one() {
        let options = vec!["veg biryani".to_string(), "egg biryani".to_string()];
        let text = format_options_response(&options);
        assert!(text.contains("1. veg biryani\n2. egg biryani"));
        assert!(text.ends_with("Please reply with the exact name or number."));
    }

    #[test]
    fn guess_names_the_best_match() {
        let text =
            format_guess_with_options("biryani", &["hyderabadi biryani".to_string()]);
        assert!(text.starts_with("🤔 Did you mean 'biryani'?"));
        assert!(text.contains("1. hyderabadi biryani"));
    }

    #[test]
    fn locality_listing_handles_missing_rating() {
        let places = vec![Place {
            name: "Biryani House".to_string(),
            address: "Address not available".to_string(),
            rating: None,
            maps_url: "https://www.google.com/maps/place/?q=place_id:abc".to_string(),
        }];
        let text = format_locality_response("biryani", "Pune", &places);
        assert!(text.starts_with("📍 Where to find *biryani* in Pune:\n"));
        assert!(text.contains("🍴 Biryani House (⭐ N/A)"));
        assert!(!text.ends_with('\n'));
    }

    #[test]
    fn recommendation_listing_is_dashed() {
        let text = format_recommendation_response(
            "biryani",
            &["pulao".to_string(), "jeera rice".to_string()],
        );
        assert_eq!(
            text,
            "🍽 If you like *biryani*, you might also enjoy:\n- pulao\n- jeera rice"
        );
    }
}
