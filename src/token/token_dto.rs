use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterTokenRequest {
    #[validate(required, length(min = 1))]
    pub user_id: Option<String>,
    #[validate(required, length(min = 1))]
    pub fcm_token: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterTokenResponse {
    pub success: bool,
    pub message: String,
}
