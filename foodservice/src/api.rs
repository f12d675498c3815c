use paperclip::actix::Apiv2Schema;
use serde::{Deserialize, Serialize};

pub type RecipeId = i32;

/// One dish as stored in the repository.
/// Field set follows the cleaned Kaggle dataset used to seed the service.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Apiv2Schema)]
pub struct RecipeDetails {
    pub name: String,
    pub description: String,
    pub cuisine: String,
    pub course: String,
    pub diet: String,
    pub prep_time: String,
    pub ingredients: Vec<String>,
    pub instructions: String,
}

/// Merge-patch mirror of [`RecipeDetails`].
/// `None` fields must not serialize, otherwise the JSONB merge would erase them.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Apiv2Schema)]
pub struct RecipeDetailsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prep_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
pub struct RecipeNameAndId {
    pub recipe_id: RecipeId,
    pub name: String,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
pub struct GetAllRecipesResponse {
    pub recipes: Vec<RecipeNameAndId>,
}

/// Envelope for the conversational endpoints; the bot client renders
/// `response` verbatim in the chat.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
pub struct BotReply {
    pub response: String,
}

impl BotReply {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }
}

/// A restaurant serving the requested dish, shaped from one Places result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Apiv2Schema)]
pub struct Place {
    pub name: String,
    pub address: String,
    pub rating: Option<f64>,
    pub maps_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
pub struct McpTool {
    pub name: String,
    pub method: String,
    pub path: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub params: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
pub struct McpAuth {
    #[serde(rename = "type")]
    pub auth_type: String,
    pub validate_path: String,
    /// Phone of the caller when a valid bearer token accompanied the
    /// discovery request, otherwise null.
    pub phone: Option<String>,
}

/// Discovery document returned by `GET /mcp`.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
pub struct McpManifest {
    pub name: String,
    pub version: String,
    pub status: String,
    pub tools: Vec<McpTool>,
    pub auth: McpAuth,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
pub struct ValidateResponse {
    pub phone: String,
}
