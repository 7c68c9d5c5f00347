use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    db::DbPool,
    dto::cart::{AddCartItemRequest, CartLine, CartSummary, CartView, UpdateCartItemRequest},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Cart, CartItem, MenuItem, Restaurant},
    response::{ApiResponse, Meta},
    services::table_service,
    state::AppState,
};

#[derive(FromRow)]
struct ItemForSale {
    id: Uuid,
    name: String,
    price: Decimal,
    is_available: bool,
    restaurant_id: Uuid,
}

/// A menu item together with the restaurant it is sold by; the cart is scoped
/// to that restaurant, not to the table's.
async fn item_for_sale(pool: &DbPool, menu_item_id: Uuid) -> AppResult<ItemForSale> {
    let row: Option<ItemForSale> = sqlx::query_as(
        r#"
        SELECT mi.id, mi.name, mi.price, mi.is_available, m.restaurant_id
        FROM menu_items mi
        JOIN categories c ON c.id = mi.category_id
        JOIN menus m ON m.id = c.menu_id
        WHERE mi.id = $1
        "#,
    )
    .bind(menu_item_id)
    .fetch_optional(pool)
    .await?;
    row.ok_or(AppError::NotFound)
}

/// Live totals: quantity times the item's price as it is right now.
async fn cart_totals(pool: &DbPool, cart_id: Uuid) -> AppResult<(Decimal, i64)> {
    let row: (Decimal, i64) = sqlx::query_as(
        r#"
        SELECT COALESCE(SUM(ci.quantity * mi.price), 0), COUNT(*)
        FROM cart_items ci
        JOIN menu_items mi ON mi.id = ci.menu_item_id
        WHERE ci.cart_id = $1
        "#,
    )
    .bind(cart_id)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn add_item(
    state: &AppState,
    user: &AuthUser,
    payload: AddCartItemRequest,
) -> AppResult<ApiResponse<CartSummary>> {
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    let table = table_service::table_from_token_or_session(
        &state.pool,
        user.user_id,
        payload.table_token,
    )
    .await?;

    let item = item_for_sale(&state.pool, payload.menu_item_id).await?;
    if !item.is_available {
        return Err(AppError::BadRequest(format!(
            "{} is currently not available",
            item.name
        )));
    }

    // One cart per (user, restaurant); switching tables rebinds instead of
    // forking a second cart. The unique key serializes racing creates.
    let cart: Cart = sqlx::query_as(
        r#"
        INSERT INTO carts (id, user_id, restaurant_id, table_id)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (user_id, restaurant_id)
        DO UPDATE SET table_id = EXCLUDED.table_id, updated_at = now()
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user.user_id)
    .bind(item.restaurant_id)
    .bind(table.id)
    .fetch_one(&state.pool)
    .await?;

    // Repeated adds accumulate into the existing line.
    let line: CartItem = sqlx::query_as(
        r#"
        INSERT INTO cart_items (id, cart_id, menu_item_id, quantity)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (cart_id, menu_item_id)
        DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(cart.id)
    .bind(item.id)
    .bind(payload.quantity)
    .fetch_one(&state.pool)
    .await?;

    let (cart_total, items_count) = cart_totals(&state.pool, cart.id).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "cart_add",
        Some("cart_items"),
        Some(serde_json::json!({ "menu_item_id": item.id, "quantity": payload.quantity })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let data = CartSummary {
        success: true,
        item_subtotal: Some(Decimal::from(line.quantity) * item.price),
        cart_total,
        items_count,
    };
    Ok(ApiResponse::success("Added to cart", data, None))
}

#[derive(FromRow)]
struct CartLineRow {
    line_id: Uuid,
    quantity: i32,
    item_id: Uuid,
    category_id: Uuid,
    name: String,
    description: String,
    price: Decimal,
    is_available: bool,
    is_featured: bool,
    position: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

pub async fn view_cart(
    state: &AppState,
    user: &AuthUser,
    table_token: Option<Uuid>,
) -> AppResult<ApiResponse<CartView>> {
    let table =
        table_service::table_from_token_or_session(&state.pool, user.user_id, table_token).await?;
    table_service::set_current_table(&state.pool, user.user_id, table.id).await?;

    let restaurant: Option<Restaurant> = sqlx::query_as("SELECT * FROM restaurants WHERE id = $1")
        .bind(table.restaurant_id)
        .fetch_optional(&state.pool)
        .await?;
    let restaurant = restaurant.ok_or(AppError::NotFound)?;

    let cart: Option<Cart> =
        sqlx::query_as("SELECT * FROM carts WHERE user_id = $1 AND restaurant_id = $2")
            .bind(user.user_id)
            .bind(restaurant.id)
            .fetch_optional(&state.pool)
            .await?;

    let (cart, items, cart_total, items_count) = match cart {
        Some(cart) => {
            // The viewed table becomes the cart's table if the user moved.
            let cart = if cart.table_id != Some(table.id) {
                sqlx::query_as::<_, Cart>(
                    "UPDATE carts SET table_id = $2, updated_at = now() WHERE id = $1 RETURNING *",
                )
                .bind(cart.id)
                .bind(table.id)
                .fetch_one(&state.pool)
                .await?
            } else {
                cart
            };

            let rows = sqlx::query_as::<_, CartLineRow>(
                r#"
                SELECT ci.id AS line_id, ci.quantity,
                       mi.id AS item_id, mi.category_id, mi.name, mi.description, mi.price,
                       mi.is_available, mi.is_featured, mi.position, mi.created_at, mi.updated_at
                FROM cart_items ci
                JOIN menu_items mi ON mi.id = ci.menu_item_id
                WHERE ci.cart_id = $1
                ORDER BY ci.created_at
                "#,
            )
            .bind(cart.id)
            .fetch_all(&state.pool)
            .await?;

            let items = rows
                .into_iter()
                .map(|row| CartLine {
                    id: row.line_id,
                    subtotal: Decimal::from(row.quantity) * row.price,
                    quantity: row.quantity,
                    menu_item: MenuItem {
                        id: row.item_id,
                        category_id: row.category_id,
                        name: row.name,
                        description: row.description,
                        price: row.price,
                        is_available: row.is_available,
                        is_featured: row.is_featured,
                        position: row.position,
                        created_at: row.created_at,
                        updated_at: row.updated_at,
                    },
                })
                .collect();

            let (cart_total, items_count) = cart_totals(&state.pool, cart.id).await?;
            (Some(cart), items, cart_total, items_count)
        }
        None => (None, Vec::new(), Decimal::ZERO, 0),
    };

    Ok(ApiResponse::success(
        "Cart",
        CartView {
            restaurant,
            table,
            cart,
            items,
            cart_total,
            items_count,
        },
        Some(Meta::empty()),
    ))
}

pub async fn update_item(
    state: &AppState,
    user: &AuthUser,
    line_id: Uuid,
    payload: UpdateCartItemRequest,
) -> AppResult<ApiResponse<CartSummary>> {
    // Zero or negative quantity means removal, not an error.
    if payload.quantity <= 0 {
        return remove_line(state, user, line_id, "cart_update").await;
    }

    let updated: Option<CartItem> = sqlx::query_as(
        r#"
        UPDATE cart_items ci
        SET quantity = $3
        FROM carts c
        WHERE ci.id = $1 AND ci.cart_id = c.id AND c.user_id = $2
        RETURNING ci.*
        "#,
    )
    .bind(line_id)
    .bind(user.user_id)
    .bind(payload.quantity)
    .fetch_optional(&state.pool)
    .await?;

    // Another user's line is indistinguishable from a missing one.
    let line = updated.ok_or(AppError::NotFound)?;

    let subtotal: (Decimal,) = sqlx::query_as(
        r#"
        SELECT ci.quantity * mi.price
        FROM cart_items ci
        JOIN menu_items mi ON mi.id = ci.menu_item_id
        WHERE ci.id = $1
        "#,
    )
    .bind(line.id)
    .fetch_one(&state.pool)
    .await?;

    let (cart_total, items_count) = cart_totals(&state.pool, line.cart_id).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "cart_update",
        Some("cart_items"),
        Some(serde_json::json!({ "line_id": line.id, "quantity": line.quantity })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let data = CartSummary {
        success: true,
        item_subtotal: Some(subtotal.0),
        cart_total,
        items_count,
    };
    Ok(ApiResponse::success("Cart updated", data, None))
}

pub async fn remove_item(
    state: &AppState,
    user: &AuthUser,
    line_id: Uuid,
) -> AppResult<ApiResponse<CartSummary>> {
    remove_line(state, user, line_id, "cart_remove").await
}

async fn remove_line(
    state: &AppState,
    user: &AuthUser,
    line_id: Uuid,
    action: &str,
) -> AppResult<ApiResponse<CartSummary>> {
    let removed: Option<(Uuid,)> = sqlx::query_as(
        r#"
        DELETE FROM cart_items ci
        USING carts c
        WHERE ci.id = $1 AND ci.cart_id = c.id AND c.user_id = $2
        RETURNING ci.cart_id
        "#,
    )
    .bind(line_id)
    .bind(user.user_id)
    .fetch_optional(&state.pool)
    .await?;

    let (cart_id,) = removed.ok_or(AppError::NotFound)?;

    let (cart_total, items_count) = cart_totals(&state.pool, cart_id).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        action,
        Some("cart_items"),
        Some(serde_json::json!({ "line_id": line_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let data = CartSummary {
        success: true,
        item_subtotal: None,
        cart_total,
        items_count,
    };
    Ok(ApiResponse::success("Removed from cart", data, None))
}
