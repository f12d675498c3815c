pub use in_memory_recipes_repository::InMemoryRecipeRepository;
pub use postgres_recipes_repository::{PostgresRecipeRepository, PostgresRecipeRepositoryConfig};

use crate::api;
use crate::api::{RecipeDetails, RecipeId, RecipeNameAndId};

mod in_memory_recipes_repository;
mod postgres_recipes_repository;

#[derive(thiserror::Error, Debug)]
pub enum RecipeRepositoryError {
    #[error("Recipe {0} not found")]
    NotFound(RecipeId),

    #[error("Failed to deserialize recipe: {0}")]
    DeserializationError(#[from] serde_json::Error),

    #[error("DatabaseFailure failure {0}")]
    DatabaseFailure(#[from] tokio_postgres::Error),

    #[error("Other error {0}")]
    Other(String),
}

#[async_trait::async_trait]
pub trait RecipeRepository {
    /// Adds recipe to repository, returns an id assigned to the recipe
    async fn add_recipe(&self, details: RecipeDetails) -> Result<RecipeId, RecipeRepositoryError>;
    /// Updates recipe in the repository, returns true if recipe was updated and false if it was not found
    async fn update_recipe(
        &self,
        recipe_id: RecipeId,
        patch: api::RecipeDetailsPatch,
    ) -> Result<bool, RecipeRepositoryError>;
    /// Retrieves details of the recipe from repository
    async fn get_recipe(&self, recipe_id: RecipeId) -> Result<RecipeDetails, RecipeRepositoryError>;
    /// Case-insensitive lookup by dish name
    async fn find_by_name(
        &self,
        name: &str,
    ) -> Result<Option<(RecipeId, RecipeDetails)>, RecipeRepositoryError>;
    /// Lists ids and names of all recipes in the repository
    async fn list_recipes(&self) -> Result<Vec<RecipeNameAndId>, RecipeRepositoryError>;
    /// Full dump, used to rebuild the recommendation index
    async fn all_recipes(&self) -> Result<Vec<(RecipeId, RecipeDetails)>, RecipeRepositoryError>;
}
