use std::collections::HashMap;

use itertools::Itertools;

use crate::api::{RecipeDetails, RecipeId};

pub const DEFAULT_TOP_N: usize = 3;
pub const MAX_TOP_N: usize = 10;

/// English tokens that dominate ingredient lists without telling dishes
/// apart ("2 cups of fresh...").
const STOP_WORDS: [&str; 24] = [
    "a", "an", "and", "as", "chopped", "cup", "cups", "finely", "for", "fresh", "grams", "in",
    "into", "of", "or", "per", "sliced", "small", "tablespoon", "taste", "teaspoon", "the", "to",
    "with",
];

struct IndexedDish {
    name: String,
    name_lower: String,
    diet: String,
    course: String,
    /// TF-IDF weight per ingredient token
    weights: HashMap<String, f64>,
    norm: f64,
}

/// Ingredient-similarity index over all known recipes. Rebuilt from the
/// repository by the updater; queries are read-only.
#[derive(Default)]
pub struct RecommendationsEngine {
    dishes: Vec<IndexedDish>,
}

impl RecommendationsEngine {
    pub fn build(recipes: &[(RecipeId, RecipeDetails)]) -> Self {
        let tokenized: Vec<(&RecipeDetails, Vec<String>)> = recipes
            .iter()
            .map(|(_, details)| (details, tokenize_ingredients(details)))
            .collect();

        let total_dishes = tokenized.len() as f64;
        let mut document_frequency: HashMap<&str, usize> = HashMap::new();
        for (_, tokens) in tokenized.iter() {
            for token in tokens.iter().unique() {
                *document_frequency.entry(token.as_str()).or_default() += 1;
            }
        }

        let dishes = tokenized
            .iter()
            .map(|(details, tokens)| {
                let token_count = tokens.len().max(1) as f64;
                let mut term_frequency: HashMap<String, f64> = HashMap::new();
                for token in tokens {
                    *term_frequency.entry(token.clone()).or_default() += 1.0 / token_count;
                }
                let weights: HashMap<String, f64> = term_frequency
                    .into_iter()
                    .map(|(token, tf)| {
                        let df = document_frequency.get(token.as_str()).copied().unwrap_or(1);
                        let idf = ((1.0 + total_dishes) / (1.0 + df as f64)).ln() + 1.0;
                        (token, tf * idf)
                    })
                    .collect();
                let norm = weights.values().map(|w| w * w).sum::<f64>().sqrt();
                IndexedDish {
                    name: details.name.clone(),
                    name_lower: details.name.to_lowercase(),
                    diet: details.diet.to_lowercase(),
                    course: details.course.to_lowercase(),
                    weights,
                    norm,
                }
            })
            .collect();

        Self { dishes }
    }

    /// Dishes most similar to the named one by ingredient overlap,
    /// best first, the query dish excluded.
    pub fn recommend(&self, dish_name: &str, top_n: usize) -> Vec<String> {
        self.recommend_filtered(dish_name, None, None, top_n)
            .into_iter()
            .map(|(name, _)| name)
            .collect()
    }

    /// As [`recommend`](Self::recommend) but restricted to dishes matching
    /// the diet/course filters; returns `(name, course)` pairs for the
    /// chat preview.
    pub fn recommend_filtered(
        &self,
        dish_name: &str,
        diet: Option<&str>,
        course: Option<&str>,
        top_n: usize,
    ) -> Vec<(String, String)> {
        let top_n = top_n.clamp(1, MAX_TOP_N);
        let dish_lower = dish_name.to_lowercase();
        let Some(query) = self
            .dishes
            .iter()
            .find(|dish| dish.name_lower == dish_lower)
        else {
            return vec![];
        };

        self.dishes
            .iter()
            .filter(|candidate| candidate.name_lower != query.name_lower)
            // Equality, not substring: "non vegetarian" contains "vegetarian"
            .filter(|candidate| diet.map_or(true, |diet| candidate.diet == diet.to_lowercase()))
            .filter(|candidate| {
                course.map_or(true, |course| candidate.course.contains(&course.to_lowercase()))
            })
            .filter_map(|candidate| {
                let similarity = cosine_similarity(query, candidate);
                (similarity > 0.0).then_some((candidate, similarity))
            })
            .sorted_by(|(dish_a, sim_a), (dish_b, sim_b)| {
                sim_b
                    .total_cmp(sim_a)
                    .then_with(|| dish_a.name.cmp(&dish_b.name))
            })
            .take(top_n)
            .map(|(candidate, _)| (candidate.name.clone(), candidate.course.clone()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.dishes.is_empty()
    }
}

fn tokenize_ingredients(details: &RecipeDetails) -> Vec<String> {
    details
        .ingredients
        .iter()
        .flat_map(|ingredient| ingredient.split(|c: char| !c.is_alphanumeric()))
        .map(|token| token.to_lowercase())
        .filter(|token| token.len() > 1 && !STOP_WORDS.contains(&token.as_str()))
        .collect()
}

fn cosine_similarity(a: &IndexedDish, b: &IndexedDish) -> f64 {
    if a.norm == 0.0 || b.norm == 0.0 {
        return 0.0;
    }
    let shorter = if a.weights.len() <= b.weights.len() { a } else { b };
    let longer = if a.weights.len() <= b.weights.len() { b } else { a };
    let dot: f64 = shorter
        .weights
        .iter()
        .filter_map(|(token, weight)| longer.weights.get(token).map(|other| weight * other))
        .sum();
    dot / (a.norm * b.norm)
}
