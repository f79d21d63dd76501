use crate::db::MealStats;
use crate::models::claim::{ClaimDetails, ClaimWithFood, FoodClaim};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct GeneralResponse {
    pub status: String,
    pub error: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct StatsResponse {
    pub status: String,
    pub data: MealStats,
    pub error: Option<String>,
}

// ---------- CLAIMS ---------- //

fn default_quantity() -> i32 {
    1
}

#[derive(Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ReserveRequest {
    pub food_id: i32,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

#[derive(Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct VerifyRequest {
    pub claim_code: String,
}

#[derive(Serialize, ToSchema)]
pub struct ClaimResponse {
    pub status: String,
    pub data: Option<FoodClaim>,
    pub error: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ClaimDetailsResponse {
    pub status: String,
    pub data: Option<ClaimDetails>,
    pub error: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ClaimsResponse {
    pub status: String,
    pub data: Vec<ClaimWithFood>,
    pub error: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ActiveClaimsResponse {
    pub status: String,
    pub data: Vec<ClaimDetails>,
    pub error: Option<String>,
}
