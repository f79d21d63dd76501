use crate::models::user::User;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct UserResponse {
    pub status: String,
    pub data: Option<User>,
    pub error: Option<String>,
}
