use crate::db::common::sweeper::{reconcile_item_status, SweepOutcome};
use crate::db::{DbConnection, DbPool, RepositoryError};
use crate::models::food::{CreateFoodItem, FoodItem, FoodItemWithCreator, UpdateFoodItem};
use crate::models::user::UserContact;
use chrono::Utc;
use diesel::prelude::*;
use diesel::result::Error;
use log::{debug, error};

pub const DEFAULT_MIN_ITEM_QUANTITY: i32 = 1;

#[derive(Clone)]
pub struct FoodOperations {
    pool: DbPool,
    min_quantity: i32,
}

impl FoodOperations {
    pub fn new(pool: DbPool, min_quantity: i32) -> Self {
        Self { pool, min_quantity }
    }

    pub fn create_food_item(
        &self,
        staff_id: i32,
        request: CreateFoodItem,
    ) -> Result<FoodItem, RepositoryError> {
        validate_new_item(&request, self.min_quantity)?;

        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!("create_food_item: failed to acquire DB connection: {}", e);
            e
        })?;

        let new_item = request.into_new_item(staff_id);
        use crate::db::schema::food_items::dsl::*;
        let item = diesel::insert_into(food_items)
            .values(&new_item)
            .returning(FoodItem::as_returning())
            .get_result(conn.connection())
            .map_err(|e| {
                error!(
                    "create_food_item: error inserting food item '{}' for staff {}: {}",
                    new_item.name, staff_id, e
                );
                RepositoryError::DatabaseError(e)
            })?;

        debug!(
            "create_food_item: staff {} listed item {} ({} portions until {})",
            staff_id, item.food_id, item.quantity_available, item.available_until
        );
        Ok(item)
    }

    /// Merges the given fields into the item. Ownership is checked by the caller.
    pub fn update_food_item(
        &self,
        search_food_id: i32,
        changes: UpdateFoodItem,
    ) -> Result<FoodItem, RepositoryError> {
        validate_item_update(&changes)?;

        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!(
                "update_food_item: failed to acquire DB connection for id {}: {}",
                search_food_id, e
            );
            e
        })?;

        use crate::db::schema::food_items::dsl::*;
        diesel::update(food_items.filter(food_id.eq(search_food_id)))
            .set((&changes, updated_at.eq(Utc::now())))
            .returning(FoodItem::as_returning())
            .get_result(conn.connection())
            .map_err(|e| {
                error!(
                    "update_food_item: error updating food item {}: {}",
                    search_food_id, e
                );
                match e {
                    Error::NotFound => {
                        RepositoryError::NotFound(format!("food_items: {search_food_id}"))
                    }
                    other => RepositoryError::DatabaseError(other),
                }
            })
    }

    /// Removes the item together with its donation row and every claim on it.
    pub fn delete_food_item(&self, search_food_id: i32) -> Result<FoodItem, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!(
                "delete_food_item: failed to acquire DB connection for id {}: {}",
                search_food_id, e
            );
            e
        })?;

        conn.connection().transaction(|conn| {
            use crate::db::schema::{food_claims, food_donations, food_items};

            let donations_removed = diesel::delete(
                food_donations::table.filter(food_donations::food_id.eq(search_food_id)),
            )
            .execute(conn)
            .map_err(RepositoryError::DatabaseError)?;

            let claims_removed =
                diesel::delete(food_claims::table.filter(food_claims::food_id.eq(search_food_id)))
                    .execute(conn)
                    .map_err(RepositoryError::DatabaseError)?;

            let item = diesel::delete(food_items::table.filter(food_items::food_id.eq(search_food_id)))
                .returning(FoodItem::as_returning())
                .get_result(conn)
                .map_err(|e| {
                    error!(
                        "delete_food_item: error deleting food item {}: {}",
                        search_food_id, e
                    );
                    match e {
                        Error::NotFound => {
                            RepositoryError::NotFound(format!("food_items: {search_food_id}"))
                        }
                        other => RepositoryError::DatabaseError(other),
                    }
                })?;

            debug!(
                "delete_food_item: removed item {} with {} claims and {} donations",
                search_food_id, claims_removed, donations_removed
            );
            Ok(item)
        })
    }

    pub fn get_food_item(&self, search_food_id: i32) -> Result<FoodItem, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!(
                "get_food_item: failed to acquire DB connection for id {}: {}",
                search_food_id, e
            );
            e
        })?;

        use crate::db::schema::food_items::dsl::*;
        food_items
            .filter(food_id.eq(search_food_id))
            .select(FoodItem::as_select())
            .first::<FoodItem>(conn.connection())
            .map_err(|e| match e {
                Error::NotFound => RepositoryError::NotFound(format!("food_items: {search_food_id}")),
                other => {
                    error!(
                        "get_food_item: error fetching food item {}: {}",
                        search_food_id, other
                    );
                    RepositoryError::DatabaseError(other)
                }
            })
    }

    /// Items a student can claim right now, newest first, with their lister.
    pub fn list_active_items(&self) -> Result<Vec<FoodItemWithCreator>, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!("list_active_items: failed to acquire DB connection: {}", e);
            e
        })?;

        let now = Utc::now();
        reconcile_item_status(conn.connection(), now)?;

        use crate::db::schema::{food_items, users};
        let rows = food_items::table
            .inner_join(users::table)
            .filter(food_items::is_active.eq(true))
            .filter(food_items::available_until.gt(now))
            .filter(food_items::quantity_available.ge(1))
            .order(food_items::created_at.desc())
            .select((FoodItem::as_select(), UserContact::as_select()))
            .load::<(FoodItem, UserContact)>(conn.connection())
            .map_err(|e| {
                error!("list_active_items: error loading active items: {}", e);
                RepositoryError::DatabaseError(e)
            })?;

        Ok(rows
            .into_iter()
            .map(|(item, creator)| FoodItemWithCreator { item, creator })
            .collect())
    }

    pub fn list_items_by_creator(&self, staff_id: i32) -> Result<Vec<FoodItem>, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!(
                "list_items_by_creator: failed to acquire DB connection for staff {}: {}",
                staff_id, e
            );
            e
        })?;

        reconcile_item_status(conn.connection(), Utc::now())?;

        use crate::db::schema::food_items::dsl::*;
        food_items
            .filter(created_by.eq(staff_id))
            .order(created_at.desc())
            .select(FoodItem::as_select())
            .load::<FoodItem>(conn.connection())
            .map_err(|e| {
                error!(
                    "list_items_by_creator: error loading items of staff {}: {}",
                    staff_id, e
                );
                RepositoryError::DatabaseError(e)
            })
    }

    /// Runs the status sweep on its own, outside of a read.
    pub fn reconcile(&self) -> Result<SweepOutcome, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!("reconcile: failed to acquire DB connection: {}", e);
            e
        })?;
        reconcile_item_status(conn.connection(), Utc::now())
    }
}

fn validate_new_item(request: &CreateFoodItem, min_quantity: i32) -> Result<(), RepositoryError> {
    if request.name.trim().is_empty() {
        return Err(RepositoryError::ValidationError(
            "name must not be empty".to_string(),
        ));
    }
    if request.canteen_name.trim().is_empty() {
        return Err(RepositoryError::ValidationError(
            "canteen_name must not be empty".to_string(),
        ));
    }
    if request.quantity_available < min_quantity {
        return Err(RepositoryError::ValidationError(format!(
            "quantity_available must be at least {}, got {}",
            min_quantity, request.quantity_available
        )));
    }
    validate_price("original_price", request.original_price)?;
    validate_price("discounted_price", request.discounted_price)
}

fn validate_item_update(changes: &UpdateFoodItem) -> Result<(), RepositoryError> {
    if let Some(new_name) = &changes.name {
        if new_name.trim().is_empty() {
            return Err(RepositoryError::ValidationError(
                "name must not be empty".to_string(),
            ));
        }
    }
    if let Some(new_canteen) = &changes.canteen_name {
        if new_canteen.trim().is_empty() {
            return Err(RepositoryError::ValidationError(
                "canteen_name must not be empty".to_string(),
            ));
        }
    }
    if let Some(qty) = changes.quantity_available {
        if qty < 0 {
            return Err(RepositoryError::ValidationError(format!(
                "quantity_available must not be negative, got {qty}"
            )));
        }
    }
    if let Some(price) = changes.original_price {
        validate_price("original_price", price)?;
    }
    if let Some(price) = changes.discounted_price {
        validate_price("discounted_price", price)?;
    }
    Ok(())
}

fn validate_price(field: &str, value: f64) -> Result<(), RepositoryError> {
    if !value.is_finite() || value < 0.0 {
        return Err(RepositoryError::ValidationError(format!(
            "{field} must be a non-negative amount, got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn request(quantity: i32) -> CreateFoodItem {
        CreateFoodItem {
            name: "Paneer Roll".to_string(),
            description: None,
            canteen_name: "Main Canteen".to_string(),
            canteen_location: Some("Block C".to_string()),
            quantity_available: quantity,
            original_price: 60.0,
            discounted_price: 30.0,
            image_url: None,
            available_until: Utc::now() + Duration::hours(2),
        }
    }

    #[test]
    fn minimum_quantity_is_configurable() {
        assert!(validate_new_item(&request(1), DEFAULT_MIN_ITEM_QUANTITY).is_ok());
        assert!(matches!(
            validate_new_item(&request(0), DEFAULT_MIN_ITEM_QUANTITY),
            Err(RepositoryError::ValidationError(_))
        ));
        assert!(validate_new_item(&request(0), 0).is_ok());
    }

    #[test]
    fn blank_names_and_negative_prices_are_rejected() {
        let mut req = request(2);
        req.canteen_name = "  ".to_string();
        assert!(validate_new_item(&req, 1).is_err());

        let mut req = request(2);
        req.discounted_price = -1.0;
        assert!(validate_new_item(&req, 1).is_err());

        let mut req = request(2);
        req.original_price = f64::NAN;
        assert!(validate_new_item(&req, 1).is_err());
    }

    #[test]
    fn update_allows_zero_but_not_negative_quantity() {
        let changes = UpdateFoodItem {
            quantity_available: Some(0),
            ..Default::default()
        };
        assert!(validate_item_update(&changes).is_ok());

        let changes = UpdateFoodItem {
            quantity_available: Some(-2),
            ..Default::default()
        };
        assert!(validate_item_update(&changes).is_err());
    }
}
