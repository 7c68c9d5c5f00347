use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    db::DbPool,
    dto::restaurants::{CreateTableRequest, TableList, UpdateTableRequest},
    entity::tables::{
        ActiveModel as TableActive, Column as TableCol, Entity as Tables, Model as TableModel,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_restaurant_access},
    models::DiningTable,
    response::{ApiResponse, Meta},
    services::restaurant_service,
    state::AppState,
};

/// Table directory: token -> table, or NotFound.
pub async fn resolve_token(pool: &DbPool, token: Uuid) -> AppResult<DiningTable> {
    let table: Option<DiningTable> = sqlx::query_as("SELECT * FROM tables WHERE token = $1")
        .bind(token)
        .fetch_optional(pool)
        .await?;
    table.ok_or(AppError::NotFound)
}

/// Remember the table a user last scanned; one row per user.
pub async fn set_current_table(pool: &DbPool, user_id: Uuid, table_id: Uuid) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO table_sessions (user_id, table_id)
        VALUES ($1, $2)
        ON CONFLICT (user_id) DO UPDATE SET table_id = EXCLUDED.table_id, updated_at = now()
        "#,
    )
    .bind(user_id)
    .bind(table_id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn current_table(pool: &DbPool, user_id: Uuid) -> AppResult<Option<DiningTable>> {
    let table = sqlx::query_as::<_, DiningTable>(
        "SELECT t.* FROM table_sessions s JOIN tables t ON t.id = s.table_id WHERE s.user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(table)
}

/// Table context for cart and checkout: an explicit token wins, otherwise the
/// table remembered from a previous scan.
pub async fn table_from_token_or_session(
    pool: &DbPool,
    user_id: Uuid,
    token: Option<Uuid>,
) -> AppResult<DiningTable> {
    match token {
        Some(token) => resolve_token(pool, token).await,
        None => current_table(pool, user_id)
            .await?
            .ok_or_else(|| AppError::BadRequest("No table specified".into())),
    }
}

pub async fn list_tables(
    state: &AppState,
    user: &AuthUser,
    restaurant_id: Uuid,
) -> AppResult<ApiResponse<TableList>> {
    let owner_id = restaurant_service::owner_of(&state.pool, restaurant_id).await?;
    ensure_restaurant_access(user, owner_id)?;

    let items = Tables::find()
        .filter(TableCol::RestaurantId.eq(restaurant_id))
        .order_by_asc(TableCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(table_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Tables",
        TableList { items },
        Some(Meta::empty()),
    ))
}

pub async fn create_table(
    state: &AppState,
    user: &AuthUser,
    restaurant_id: Uuid,
    payload: CreateTableRequest,
) -> AppResult<ApiResponse<DiningTable>> {
    let owner_id = restaurant_service::owner_of(&state.pool, restaurant_id).await?;
    ensure_restaurant_access(user, owner_id)?;

    let table = TableActive {
        id: Set(Uuid::new_v4()),
        restaurant_id: Set(restaurant_id),
        name: Set(payload.name),
        seats: Set(payload.seats.unwrap_or(4)),
        // Minted once; updates never touch it.
        token: Set(Uuid::new_v4()),
        is_active: Set(true),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "table_create",
        Some("tables"),
        Some(serde_json::json!({ "table_id": table.id, "restaurant_id": restaurant_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Table created",
        table_from_entity(table),
        Some(Meta::empty()),
    ))
}

pub async fn update_table(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateTableRequest,
) -> AppResult<ApiResponse<DiningTable>> {
    let existing = Tables::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(t) => t,
        None => return Err(AppError::NotFound),
    };

    let owner_id = restaurant_service::owner_of(&state.pool, existing.restaurant_id).await?;
    ensure_restaurant_access(user, owner_id)?;

    let mut active: TableActive = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(seats) = payload.seats {
        active.seats = Set(seats);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    let table = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Table updated",
        table_from_entity(table),
        Some(Meta::empty()),
    ))
}

pub async fn delete_table(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let existing = Tables::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(t) => t,
        None => return Err(AppError::NotFound),
    };

    let owner_id = restaurant_service::owner_of(&state.pool, existing.restaurant_id).await?;
    ensure_restaurant_access(user, owner_id)?;

    Tables::delete_by_id(id).exec(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "table_delete",
        Some("tables"),
        Some(serde_json::json!({ "table_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Table deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

fn table_from_entity(model: TableModel) -> DiningTable {
    DiningTable {
        id: model.id,
        restaurant_id: model.restaurant_id,
        name: model.name,
        seats: model.seats,
        token: model.token,
        is_active: model.is_active,
        created_at: model.created_at.with_timezone(&chrono::Utc),
    }
}
