use std::sync::Arc;

use futures_util::stream::StreamExt;
use opentelemetry_sdk::util::tokio_interval_stream;
use parking_lot::RwLock;

use crate::recipes_repository::RecipeRepository;
use crate::recommendations::RecommendationsEngine;

const INTERVAL_SECONDS: u64 = 10;

/// Read handle to the current recommendation index. Cheap to clone,
/// handed to HTTP handlers as app data.
#[derive(Clone)]
pub struct RecommendationsProvider {
    recommendations_engine: Arc<RwLock<RecommendationsEngine>>,
}

impl RecommendationsProvider {
    pub fn recommend(&self, dish_name: &str, top_n: usize) -> Vec<String> {
        self.recommendations_engine
            .read()
            .recommend(dish_name, top_n)
    }

    pub fn recommend_filtered(
        &self,
        dish_name: &str,
        diet: Option<&str>,
        course: Option<&str>,
        top_n: usize,
    ) -> Vec<(String, String)> {
        self.recommendations_engine
            .read()
            .recommend_filtered(dish_name, diet, course, top_n)
    }
}

/// Rebuilds the ingredient-similarity index from the repository on a fixed
/// interval, so recipes added at runtime become recommendable without a
/// restart.
pub struct RecommendationsUpdater {
    recommendations_engine: Arc<RwLock<RecommendationsEngine>>,
    repository: Arc<dyn RecipeRepository + Send + Sync>,
}

impl RecommendationsUpdater {
    pub fn new(repository: Arc<dyn RecipeRepository + Send + Sync>) -> Self {
        Self {
            recommendations_engine: Arc::new(Default::default()),
            repository,
        }
    }

    pub fn provider(&self) -> RecommendationsProvider {
        RecommendationsProvider {
            recommendations_engine: self.recommendations_engine.clone(),
        }
    }

    /// One rebuild from the current repository contents. Called by the
    /// interval loop, and once at startup so the index is warm before the
    /// first request.
    pub async fn refresh_once(&self) -> anyhow::Result<()> {
        let recipes = self.repository.all_recipes().await?;
        let engine = RecommendationsEngine::build(&recipes);

        tracing::info!("Rebuilt recommendation index over {} recipes", recipes.len());
        *self.recommendations_engine.write() = engine;
        Ok(())
    }

    pub async fn start(self) -> anyhow::Result<()> {
        let mut periodic_updater =
            tokio_interval_stream(std::time::Duration::from_secs(INTERVAL_SECONDS));

        while periodic_updater.next().await.is_some() {
            self.refresh_once().await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod recommendations_updater_tests {
    use std::sync::Arc;

    use crate::api::RecipeDetails;
    use crate::recipes_repository::{InMemoryRecipeRepository, RecipeRepository};
    use crate::recommendations_updater::RecommendationsUpdater;

    #[tokio::test]
    async fn provider_sees_rebuilt_index() {
        let repository = Arc::new(InMemoryRecipeRepository::default());
        for (name, ingredients) in [
            ("veg biryani", vec!["basmati rice", "saffron", "yogurt"]),
            ("pulao", vec!["basmati rice", "peas"]),
        ] {
            repository
                .add_recipe(RecipeDetails {
                    name: name.to_string(),
                    ingredients: ingredients.iter().map(|s| s.to_string()).collect(),
                    ..RecipeDetails::default()
                })
                .await
                .expect("Failed to add recipe");
        }

        let updater = RecommendationsUpdater::new(repository.clone());
        let provider = updater.provider();
        assert!(provider.recommend("veg biryani", 3).is_empty());

        // Rebuild directly instead of waiting out the interval
        updater.refresh_once().await.expect("Failed to refresh");

        assert_eq!(
            provider.recommend("veg biryani", 3),
            vec!["pulao".to_string()]
        );
    }
}
