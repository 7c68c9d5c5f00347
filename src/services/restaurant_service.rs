use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    db::DbPool,
    dto::restaurants::{CreateRestaurantRequest, RestaurantList, UpdateRestaurantRequest},
    entity::restaurants::{
        ActiveModel as RestaurantActive, Column as RestaurantCol, Entity as Restaurants,
        Model as RestaurantModel,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_owner_role, ensure_restaurant_access},
    models::Restaurant,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

/// Owner lookup used by every management gate; NotFound doubles as the
/// "restaurant does not exist" answer so nothing leaks before the check.
pub async fn owner_of(pool: &DbPool, restaurant_id: Uuid) -> AppResult<Uuid> {
    let row: Option<(Uuid,)> = sqlx::query_as("SELECT owner_id FROM restaurants WHERE id = $1")
        .bind(restaurant_id)
        .fetch_optional(pool)
        .await?;
    row.map(|(owner_id,)| owner_id).ok_or(AppError::NotFound)
}

pub async fn list_active(
    state: &AppState,
    pagination: Pagination,
) -> AppResult<ApiResponse<RestaurantList>> {
    let (page, limit, offset) = pagination.normalize();

    let finder = Restaurants::find()
        .filter(RestaurantCol::IsActive.eq(true))
        .order_by_desc(RestaurantCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(restaurant_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Restaurants",
        RestaurantList { items },
        Some(meta),
    ))
}

pub async fn get_restaurant(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Restaurant>> {
    let restaurant = Restaurants::find_by_id(id).one(&state.orm).await?;
    let restaurant = match restaurant {
        Some(r) => r,
        None => return Err(AppError::NotFound),
    };

    Ok(ApiResponse::success(
        "Restaurant",
        restaurant_from_entity(restaurant),
        Some(Meta::empty()),
    ))
}

/// Dashboard listing: everything the caller owns.
pub async fn list_owned(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<RestaurantList>> {
    let items = Restaurants::find()
        .filter(RestaurantCol::OwnerId.eq(user.user_id))
        .order_by_asc(RestaurantCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(restaurant_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Restaurants",
        RestaurantList { items },
        Some(Meta::empty()),
    ))
}

pub async fn create_restaurant(
    state: &AppState,
    user: &AuthUser,
    payload: CreateRestaurantRequest,
) -> AppResult<ApiResponse<Restaurant>> {
    ensure_owner_role(user)?;

    let restaurant = RestaurantActive {
        id: Set(Uuid::new_v4()),
        owner_id: Set(user.user_id),
        name: Set(payload.name),
        description: Set(payload.description.unwrap_or_default()),
        address: Set(payload.address.unwrap_or_default()),
        phone: Set(payload.phone.unwrap_or_default()),
        is_active: Set(true),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "restaurant_create",
        Some("restaurants"),
        Some(serde_json::json!({ "restaurant_id": restaurant.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Restaurant created",
        restaurant_from_entity(restaurant),
        Some(Meta::empty()),
    ))
}

pub async fn update_restaurant(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateRestaurantRequest,
) -> AppResult<ApiResponse<Restaurant>> {
    let existing = Restaurants::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(r) => r,
        None => return Err(AppError::NotFound),
    };

    ensure_restaurant_access(user, existing.owner_id)?;

    let mut active: RestaurantActive = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(address) = payload.address {
        active.address = Set(address);
    }
    if let Some(phone) = payload.phone {
        active.phone = Set(phone);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    active.updated_at = Set(Utc::now().into());
    let restaurant = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "restaurant_update",
        Some("restaurants"),
        Some(serde_json::json!({ "restaurant_id": restaurant.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Restaurant updated",
        restaurant_from_entity(restaurant),
        Some(Meta::empty()),
    ))
}

fn restaurant_from_entity(model: RestaurantModel) -> Restaurant {
    Restaurant {
        id: model.id,
        owner_id: model.owner_id,
        name: model.name,
        description: model.description,
        address: model.address,
        phone: model.phone,
        is_active: model.is_active,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
