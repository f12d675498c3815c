use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};

use serde_json::json;

use crate::api;
use crate::api::{RecipeDetails, RecipeId, RecipeNameAndId};
use crate::recipes_repository::{RecipeRepository, RecipeRepositoryError};

#[derive(Default)]
pub struct InMemoryRecipeRepository {
    recipe_sequence_generator: AtomicI32,
    recipes: parking_lot::RwLock<HashMap<RecipeId, RecipeDetails>>,
}

#[async_trait::async_trait]
impl RecipeRepository for InMemoryRecipeRepository {
    async fn add_recipe(
        &self,
        details: api::RecipeDetails,
    ) -> Result<RecipeId, RecipeRepositoryError> {
        let id = self.recipe_sequence_generator.fetch_add(1, Ordering::Relaxed);
        self.recipes.write().insert(id, details);
        Ok(id)
    }

    async fn update_recipe(
        &self,
        recipe_id: RecipeId,
        patch: api::RecipeDetailsPatch,
    ) -> Result<bool, RecipeRepositoryError> {
        let mut locked_recipes = self.recipes.write();
        if let Some(recipe) = locked_recipes.get_mut(&recipe_id) {
            let mut result_recipe = json!(recipe);
            json_patch::merge(&mut result_recipe, &json!(patch));
            let result_recipe: RecipeDetails = serde_json::from_value(result_recipe)?;
            *recipe = result_recipe;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn get_recipe(
        &self,
        recipe_id: RecipeId,
    ) -> Result<RecipeDetails, RecipeRepositoryError> {
        self.recipes
            .read()
            .get(&recipe_id)
            .cloned()
            .ok_or(RecipeRepositoryError::NotFound(recipe_id))
    }

    async fn find_by_name(
        &self,
        name: &str,
    ) -> Result<Option<(RecipeId, RecipeDetails)>, RecipeRepositoryError> {
        Ok(self
            .recipes
            .read()
            .iter()
            .find(|(_, details)| details.name.eq_ignore_ascii_case(name))
            .map(|(&recipe_id, details)| (recipe_id, details.clone())))
    }

    async fn list_recipes(&self) -> Result<Vec<RecipeNameAndId>, RecipeRepositoryError> {
        Ok(self
            .recipes
            .read()
            .iter()
            .map(|(&recipe_id, details)| RecipeNameAndId {
                recipe_id,
                name: details.name.clone(),
            })
            .collect())
    }

    async fn all_recipes(&self) -> Result<Vec<(RecipeId, RecipeDetails)>, RecipeRepositoryError> {
        Ok(self
            .recipes
            .read()
            .iter()
            .map(|(&recipe_id, details)| (recipe_id, details.clone()))
            .collect())
    }
}
