use crate::models::user::UserContact;
use chrono::{DateTime, Utc};
use diesel::{AsChangeset, Identifiable, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema,
)]
#[diesel(table_name = crate::db::schema::food_items)]
#[diesel(primary_key(food_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct FoodItem {
    pub food_id: i32,
    pub created_by: i32,
    pub name: String,
    pub description: Option<String>,
    pub canteen_name: String,
    pub canteen_location: Option<String>,
    pub quantity_available: i32,
    pub original_price: f64,
    pub discounted_price: f64,
    pub image_url: Option<String>,
    pub available_until: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FoodItem {
    /// Whether students may still see and reserve the item, regardless of
    /// how many portions remain.
    pub fn is_offered_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.available_until > now
    }
}

#[derive(Serialize, Debug, Clone, ToSchema)]
pub struct FoodItemWithCreator {
    #[serde(flatten)]
    pub item: FoodItem,
    pub creator: UserContact,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::db::schema::food_items)]
pub struct NewFoodItem {
    pub created_by: i32,
    pub name: String,
    pub description: Option<String>,
    pub canteen_name: String,
    pub canteen_location: Option<String>,
    pub quantity_available: i32,
    pub original_price: f64,
    pub discounted_price: f64,
    pub image_url: Option<String>,
    pub available_until: DateTime<Utc>,
    pub is_active: bool,
}

/// Body of a create request. The owner is taken from the caller's identity.
#[derive(Deserialize, Debug, Clone, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateFoodItem {
    pub name: String,
    pub description: Option<String>,
    pub canteen_name: String,
    pub canteen_location: Option<String>,
    pub quantity_available: i32,
    pub original_price: f64,
    pub discounted_price: f64,
    pub image_url: Option<String>,
    pub available_until: DateTime<Utc>,
}

impl CreateFoodItem {
    pub fn into_new_item(self, staff_id: i32) -> NewFoodItem {
        NewFoodItem {
            created_by: staff_id,
            name: self.name.trim().to_string(),
            description: self.description,
            canteen_name: self.canteen_name.trim().to_string(),
            canteen_location: self.canteen_location,
            quantity_available: self.quantity_available,
            original_price: self.original_price,
            discounted_price: self.discounted_price,
            image_url: self.image_url,
            available_until: self.available_until,
            is_active: true,
        }
    }
}

#[derive(AsChangeset, Deserialize, Debug, Clone, Default, ToSchema)]
#[diesel(table_name = crate::db::schema::food_items)]
#[serde(deny_unknown_fields)]
pub struct UpdateFoodItem {
    pub name: Option<String>,
    pub description: Option<String>,
    pub canteen_name: Option<String>,
    pub canteen_location: Option<String>,
    pub quantity_available: Option<i32>,
    pub original_price: Option<f64>,
    pub discounted_price: Option<f64>,
    pub image_url: Option<String>,
    pub available_until: Option<DateTime<Utc>>,
}
