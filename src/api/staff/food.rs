use crate::api::repository_status;
use crate::auth::{Identity, StaffPrincipal};
use crate::db::{FoodOperations, RepositoryError};
use crate::enums::staff::{FoodItemResponse, FoodItemsResponse, OwnFoodItemsResponse};
use crate::models::food::{CreateFoodItem, FoodItem, UpdateFoodItem};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};

fn item_error(e: &RepositoryError) -> HttpResponse {
    HttpResponse::build(repository_status(e)).json(FoodItemResponse {
        status: "error".to_string(),
        data: None,
        error: Some(e.to_string()),
    })
}

fn forbidden_item(food_id: i32) -> HttpResponse {
    HttpResponse::Forbidden().json(FoodItemResponse {
        status: "error".to_string(),
        data: None,
        error: Some(format!("Food item {} belongs to another staff member", food_id)),
    })
}

/// Loads an item and checks that the caller may modify it.
async fn owned_item(
    food_ops: &web::Data<FoodOperations>,
    staff: &StaffPrincipal,
    food_id: i32,
) -> actix_web::Result<Result<FoodItem, HttpResponse>> {
    let ops = food_ops.clone();
    let item = match web::block(move || ops.get_food_item(food_id)).await? {
        Ok(item) => item,
        Err(e) => {
            debug!("FOOD: owned_item(): {}", e);
            return Ok(Err(item_error(&e)));
        }
    };
    if item.created_by != staff.user_id() && !staff.is_admin() {
        debug!(
            "FOOD: staff {} tried to modify item {} owned by {}",
            staff.user_id(),
            food_id,
            item.created_by
        );
        return Ok(Err(forbidden_item(food_id)));
    }
    Ok(Ok(item))
}

#[utoipa::path(
    tag = "Food",
    request_body = CreateFoodItem,
    responses(
        (status = 200, description = "Food item listed", body = FoodItemResponse),
        (status = 400, description = "Invalid item data", body = FoodItemResponse),
        (status = 403, description = "Caller is not staff")
    ),
    summary = "List a new surplus food item"
)]
#[post("")]
pub(super) async fn create_food_item(
    food_ops: web::Data<FoodOperations>,
    staff: StaffPrincipal,
    req_data: web::Json<CreateFoodItem>,
) -> actix_web::Result<impl Responder> {
    let staff_id = staff.user_id();
    let req_data = req_data.into_inner();
    let result = web::block(move || food_ops.create_food_item(staff_id, req_data)).await?;

    Ok(match result {
        Ok(item) => {
            info!("Food item {} listed by staff {}", item.food_id, staff_id);
            HttpResponse::Ok().json(FoodItemResponse {
                status: "ok".to_string(),
                data: Some(item),
                error: None,
            })
        }
        Err(e) => {
            error!("FOOD: create_food_item(): {}", e);
            item_error(&e)
        }
    })
}

#[utoipa::path(
    tag = "Food",
    params(
        ("id", description = "Food item to update"),
    ),
    request_body = UpdateFoodItem,
    responses(
        (status = 200, description = "Food item updated", body = FoodItemResponse),
        (status = 400, description = "Invalid change set", body = FoodItemResponse),
        (status = 403, description = "Item belongs to another staff member", body = FoodItemResponse),
        (status = 404, description = "Item not found", body = FoodItemResponse)
    ),
    summary = "Update a food item"
)]
#[put("/{id}")]
pub(super) async fn update_food_item(
    food_ops: web::Data<FoodOperations>,
    staff: StaffPrincipal,
    path: web::Path<(i32,)>,
    req_data: web::Json<UpdateFoodItem>,
) -> actix_web::Result<impl Responder> {
    let food_id = path.into_inner().0;
    if let Err(resp) = owned_item(&food_ops, &staff, food_id).await? {
        return Ok(resp);
    }

    let changes = req_data.into_inner();
    let result = web::block(move || food_ops.update_food_item(food_id, changes)).await?;
    Ok(match result {
        Ok(item) => {
            debug!("Food item {} updated by staff {}", food_id, staff.user_id());
            HttpResponse::Ok().json(FoodItemResponse {
                status: "ok".to_string(),
                data: Some(item),
                error: None,
            })
        }
        Err(e) => {
            error!("FOOD: update_food_item({}): {}", food_id, e);
            item_error(&e)
        }
    })
}

#[utoipa::path(
    tag = "Food",
    params(
        ("id", description = "Food item to delete"),
    ),
    responses(
        (status = 200, description = "Food item deleted with its claims and donation", body = FoodItemResponse),
        (status = 403, description = "Item belongs to another staff member", body = FoodItemResponse),
        (status = 404, description = "Item not found", body = FoodItemResponse)
    ),
    summary = "Delete a food item"
)]
#[delete("/{id}")]
pub(super) async fn delete_food_item(
    food_ops: web::Data<FoodOperations>,
    staff: StaffPrincipal,
    path: web::Path<(i32,)>,
) -> actix_web::Result<impl Responder> {
    let food_id = path.into_inner().0;
    if let Err(resp) = owned_item(&food_ops, &staff, food_id).await? {
        return Ok(resp);
    }

    let result = web::block(move || food_ops.delete_food_item(food_id)).await?;
    Ok(match result {
        Ok(item) => {
            info!("Food item {} ({}) deleted", item.food_id, item.name);
            HttpResponse::Ok().json(FoodItemResponse {
                status: "ok".to_string(),
                data: Some(item),
                error: None,
            })
        }
        Err(e) => {
            error!("FOOD: delete_food_item({}): {}", food_id, e);
            item_error(&e)
        }
    })
}

#[utoipa::path(
    tag = "Food",
    responses(
        (status = 200, description = "Claimable items, newest first", body = FoodItemsResponse)
    ),
    summary = "Browse currently claimable food"
)]
#[get("")]
pub(super) async fn list_active_food(
    food_ops: web::Data<FoodOperations>,
    _caller: Identity,
) -> actix_web::Result<impl Responder> {
    let result = web::block(move || food_ops.list_active_items()).await?;
    Ok(match result {
        Ok(items) => HttpResponse::Ok().json(FoodItemsResponse {
            status: "ok".to_string(),
            data: items,
            error: None,
        }),
        Err(e) => {
            error!("FOOD: list_active_food(): {}", e);
            HttpResponse::build(repository_status(&e)).json(FoodItemsResponse {
                status: "error".to_string(),
                data: Vec::new(),
                error: Some(e.to_string()),
            })
        }
    })
}

#[utoipa::path(
    tag = "Food",
    responses(
        (status = 200, description = "Items listed by the caller", body = OwnFoodItemsResponse),
        (status = 403, description = "Caller is not staff")
    ),
    summary = "List the caller's own food items"
)]
#[get("/mine")]
pub(super) async fn list_my_food(
    food_ops: web::Data<FoodOperations>,
    staff: StaffPrincipal,
) -> actix_web::Result<impl Responder> {
    let staff_id = staff.user_id();
    let result = web::block(move || food_ops.list_items_by_creator(staff_id)).await?;
    Ok(match result {
        Ok(items) => HttpResponse::Ok().json(OwnFoodItemsResponse {
            status: "ok".to_string(),
            data: items,
            error: None,
        }),
        Err(e) => {
            error!("FOOD: list_my_food({}): {}", staff_id, e);
            HttpResponse::build(repository_status(&e)).json(OwnFoodItemsResponse {
                status: "error".to_string(),
                data: Vec::new(),
                error: Some(e.to_string()),
            })
        }
    })
}

#[utoipa::path(
    tag = "Food",
    params(
        ("id", description = "Food item to fetch"),
    ),
    responses(
        (status = 200, description = "Food item fetched", body = FoodItemResponse),
        (status = 404, description = "Item not found", body = FoodItemResponse)
    ),
    summary = "Fetch a single food item"
)]
#[get("/{id}")]
pub(super) async fn get_food_item(
    food_ops: web::Data<FoodOperations>,
    _caller: Identity,
    path: web::Path<(i32,)>,
) -> actix_web::Result<impl Responder> {
    let food_id = path.into_inner().0;
    let result = web::block(move || food_ops.get_food_item(food_id)).await?;
    Ok(match result {
        Ok(item) => HttpResponse::Ok().json(FoodItemResponse {
            status: "ok".to_string(),
            data: Some(item),
            error: None,
        }),
        Err(e) => {
            debug!("FOOD: get_food_item({}): {}", food_id, e);
            item_error(&e)
        }
    })
}
