use crate::models::common::ClaimStatus;
use crate::models::food::FoodItem;
use crate::models::user::UserContact;
use crate::traits::Expiring;
use chrono::{DateTime, Utc};
use diesel::{Identifiable, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema,
)]
#[diesel(table_name = crate::db::schema::food_claims)]
#[diesel(primary_key(claim_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct FoodClaim {
    pub claim_id: i32,
    pub user_id: i32,
    pub food_id: i32,
    pub quantity_claimed: i32,
    pub claim_code: String,
    pub status: ClaimStatus,
    pub expires_at: DateTime<Utc>,
    pub claimed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Expiring for FoodClaim {
    fn deadline(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::db::schema::food_claims)]
pub struct NewFoodClaim {
    pub user_id: i32,
    pub food_id: i32,
    pub quantity_claimed: i32,
    pub claim_code: String,
    pub status: ClaimStatus,
    pub expires_at: DateTime<Utc>,
}

/// A claim together with the item it reserves, as listed for its student.
#[derive(Serialize, Debug, Clone, ToSchema)]
pub struct ClaimWithFood {
    #[serde(flatten)]
    pub claim: FoodClaim,
    pub food: FoodItem,
}

/// A claim with the student and item details staff need at the counter.
#[derive(Serialize, Debug, Clone, ToSchema)]
pub struct ClaimDetails {
    #[serde(flatten)]
    pub claim: FoodClaim,
    pub student: UserContact,
    pub food: FoodItem,
}
