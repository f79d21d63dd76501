use crate::models::donation::{DonationWithFood, FoodDonation};
use crate::models::food::{FoodItem, FoodItemWithCreator};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct FoodItemResponse {
    pub status: String,
    pub data: Option<FoodItem>,
    pub error: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct FoodItemsResponse {
    pub status: String,
    pub data: Vec<FoodItemWithCreator>,
    pub error: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct OwnFoodItemsResponse {
    pub status: String,
    pub data: Vec<FoodItem>,
    pub error: Option<String>,
}

// ---------- DONATIONS ---------- //

#[derive(Serialize, ToSchema)]
pub struct DonationResponse {
    pub status: String,
    pub data: Option<FoodDonation>,
    pub error: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct DonationsResponse {
    pub status: String,
    pub data: Vec<DonationWithFood>,
    pub error: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct TransferResponse {
    pub status: String,
    pub transferred: usize,
    pub error: Option<String>,
}
