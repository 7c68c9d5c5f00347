use axum_restaurant_api::{
    db::{create_orm_conn, create_pool},
    dto::{
        cart::{AddCartItemRequest, UpdateCartItemRequest},
        menus::UpdateMenuItemRequest,
        orders::{CheckoutRequest, UpdateOrderStatusRequest},
    },
    entity::{
        categories::ActiveModel as CategoryActive, menu_items::ActiveModel as MenuItemActive,
        menus::ActiveModel as MenuActive, restaurants::ActiveModel as RestaurantActive,
        tables::ActiveModel as TableActive, users::ActiveModel as UserActive,
    },
    error::AppError,
    middleware::auth::{AuthUser, MaybeAuthUser},
    services::{cart_service, menu_service, order_service},
    state::AppState,
};
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

// Each test seeds its own users and restaurant, so tests can run in parallel
// against one database without stepping on each other.

async fn setup_state() -> anyhow::Result<Option<AppState>> {
    // Allow skipping when no DB is configured in the environment.
    let database_url =
        match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
            Ok(url) => url,
            Err(_) => {
                eprintln!(
                    "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
                );
                return Ok(None);
            }
        };

    let pool = create_pool(&database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    let orm = create_orm_conn(&database_url).await?;

    Ok(Some(AppState { pool, orm }))
}

struct Scenario {
    owner: AuthUser,
    customer: AuthUser,
    restaurant_id: Uuid,
    table_id: Uuid,
    table_token: Uuid,
    item_a: Uuid,
    item_b: Uuid,
}

async fn create_user(state: &AppState, role: &str) -> anyhow::Result<AuthUser> {
    let id = Uuid::new_v4();
    UserActive {
        id: Set(id),
        email: Set(format!("{id}@example.com")),
        password_hash: Set("dummy".into()),
        role: Set(role.into()),
        phone: Set(None),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(AuthUser {
        user_id: id,
        role: role.into(),
    })
}

async fn seed_item(
    state: &AppState,
    category_id: Uuid,
    name: &str,
    price: Decimal,
) -> anyhow::Result<Uuid> {
    let item = MenuItemActive {
        id: Set(Uuid::new_v4()),
        category_id: Set(category_id),
        name: Set(name.into()),
        description: Set(String::new()),
        price: Set(price),
        is_available: Set(true),
        is_featured: Set(false),
        position: Set(0),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(item.id)
}

async fn seed_table(state: &AppState, restaurant_id: Uuid, name: &str) -> anyhow::Result<(Uuid, Uuid)> {
    let table = TableActive {
        id: Set(Uuid::new_v4()),
        restaurant_id: Set(restaurant_id),
        name: Set(name.into()),
        seats: Set(4),
        token: Set(Uuid::new_v4()),
        is_active: Set(true),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok((table.id, table.token))
}

// A restaurant with one table and a two-item menu: A at 5.00, B at 3.00.
async fn seed_scenario(state: &AppState) -> anyhow::Result<Scenario> {
    let owner = create_user(state, "owner").await?;
    let customer = create_user(state, "customer").await?;

    let restaurant = RestaurantActive {
        id: Set(Uuid::new_v4()),
        owner_id: Set(owner.user_id),
        name: Set("Test Bistro".into()),
        description: Set(String::new()),
        address: Set(String::new()),
        phone: Set(String::new()),
        is_active: Set(true),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    let (table_id, table_token) = seed_table(state, restaurant.id, "T1").await?;

    let menu = MenuActive {
        id: Set(Uuid::new_v4()),
        restaurant_id: Set(restaurant.id),
        name: Set("All Day".into()),
        description: Set(String::new()),
        is_active: Set(true),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    let category = CategoryActive {
        id: Set(Uuid::new_v4()),
        menu_id: Set(menu.id),
        name: Set("Mains".into()),
        description: Set(String::new()),
        position: Set(0),
        is_active: Set(true),
    }
    .insert(&state.orm)
    .await?;

    let item_a = seed_item(state, category.id, "Item A", Decimal::new(500, 2)).await?;
    let item_b = seed_item(state, category.id, "Item B", Decimal::new(300, 2)).await?;

    Ok(Scenario {
        owner,
        customer,
        restaurant_id: restaurant.id,
        table_id,
        table_token,
        item_a,
        item_b,
    })
}

fn add_request(item: Uuid, quantity: i32, token: Option<Uuid>) -> AddCartItemRequest {
    AddCartItemRequest {
        menu_item_id: item,
        quantity,
        table_token: token,
    }
}

fn set_price(price: Decimal) -> UpdateMenuItemRequest {
    UpdateMenuItemRequest {
        name: None,
        description: None,
        price: Some(price),
        is_available: None,
        is_featured: None,
        position: None,
    }
}

async fn order_count(state: &AppState, restaurant_id: Uuid) -> anyhow::Result<i64> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders WHERE restaurant_id = $1")
        .bind(restaurant_id)
        .fetch_one(&state.pool)
        .await?;
    Ok(row.0)
}

// The end-to-end path: 2 x 5.00 + 1 x 3.00 -> cart total 13.00 -> checkout
// freezes unit prices and empties the cart; later price changes do not touch
// the order.
#[tokio::test]
async fn checkout_freezes_prices_and_clears_cart() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let s = seed_scenario(&state).await?;

    let resp = cart_service::add_item(
        &state,
        &s.customer,
        add_request(s.item_a, 2, Some(s.table_token)),
    )
    .await?;
    let summary = resp.data.unwrap();
    assert!(summary.success);
    assert_eq!(summary.items_count, 1);
    assert_eq!(summary.cart_total, Decimal::new(1000, 2));

    let resp = cart_service::add_item(
        &state,
        &s.customer,
        add_request(s.item_b, 1, Some(s.table_token)),
    )
    .await?;
    let summary = resp.data.unwrap();
    assert_eq!(summary.items_count, 2);
    assert_eq!(summary.cart_total, Decimal::new(1300, 2));

    let resp = order_service::checkout(
        &state,
        &s.customer,
        CheckoutRequest {
            table_token: Some(s.table_token),
            special_instructions: Some("no onions".into()),
        },
    )
    .await?;
    let placed = resp.data.unwrap();
    assert_eq!(placed.order.status, "pending");
    assert_eq!(placed.order.total_price, Decimal::new(1300, 2));
    assert_eq!(placed.order.table_id, Some(s.table_id));
    assert_eq!(placed.items.len(), 2);

    let unit_a = placed
        .items
        .iter()
        .find(|i| i.menu_item_id == s.item_a)
        .unwrap()
        .unit_price;
    let unit_b = placed
        .items
        .iter()
        .find(|i| i.menu_item_id == s.item_b)
        .unwrap()
        .unit_price;
    assert_eq!(unit_a, Decimal::new(500, 2));
    assert_eq!(unit_b, Decimal::new(300, 2));

    // The cart is emptied but the cart row survives for reuse.
    let resp = cart_service::view_cart(&state, &s.customer, Some(s.table_token)).await?;
    let view = resp.data.unwrap();
    assert!(view.cart.is_some());
    assert_eq!(view.items_count, 0);
    assert_eq!(view.cart_total, Decimal::ZERO);

    // A later catalog price change must not reach the captured order.
    menu_service::update_item(&state, &s.owner, s.item_a, set_price(Decimal::new(999, 2))).await?;

    let resp = order_service::get_order(&state, &s.customer, placed.order.id).await?;
    let fetched = resp.data.unwrap();
    assert_eq!(fetched.order.total_price, Decimal::new(1300, 2));
    let unit_a = fetched
        .items
        .iter()
        .find(|i| i.menu_item_id == s.item_a)
        .unwrap()
        .unit_price;
    assert_eq!(unit_a, Decimal::new(500, 2));

    // Checking out the now-empty cart is the recoverable empty-cart outcome.
    let err = order_service::checkout(
        &state,
        &s.customer,
        CheckoutRequest {
            table_token: Some(s.table_token),
            special_instructions: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::EmptyCart));
    assert_eq!(order_count(&state, s.restaurant_id).await?, 1);

    Ok(())
}

#[tokio::test]
async fn repeated_adds_accumulate_into_one_line() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let s = seed_scenario(&state).await?;

    cart_service::add_item(
        &state,
        &s.customer,
        add_request(s.item_a, 2, Some(s.table_token)),
    )
    .await?;
    let resp = cart_service::add_item(
        &state,
        &s.customer,
        add_request(s.item_a, 3, Some(s.table_token)),
    )
    .await?;
    let summary = resp.data.unwrap();
    assert_eq!(summary.items_count, 1);
    assert_eq!(summary.cart_total, Decimal::new(2500, 2));

    let resp = cart_service::view_cart(&state, &s.customer, Some(s.table_token)).await?;
    let view = resp.data.unwrap();
    assert_eq!(view.items.len(), 1);
    assert_eq!(view.items[0].quantity, 5);

    Ok(())
}

#[tokio::test]
async fn cart_total_tracks_live_catalog_prices() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let s = seed_scenario(&state).await?;

    cart_service::add_item(
        &state,
        &s.customer,
        add_request(s.item_a, 2, Some(s.table_token)),
    )
    .await?;

    menu_service::update_item(&state, &s.owner, s.item_a, set_price(Decimal::new(725, 2))).await?;

    let resp = cart_service::view_cart(&state, &s.customer, Some(s.table_token)).await?;
    let view = resp.data.unwrap();
    assert_eq!(view.cart_total, Decimal::new(1450, 2));
    assert_eq!(view.items[0].subtotal, Decimal::new(1450, 2));

    Ok(())
}

#[tokio::test]
async fn zero_quantity_update_removes_the_line() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let s = seed_scenario(&state).await?;

    cart_service::add_item(
        &state,
        &s.customer,
        add_request(s.item_a, 2, Some(s.table_token)),
    )
    .await?;
    cart_service::add_item(
        &state,
        &s.customer,
        add_request(s.item_b, 1, Some(s.table_token)),
    )
    .await?;

    let resp = cart_service::view_cart(&state, &s.customer, Some(s.table_token)).await?;
    let view = resp.data.unwrap();
    let line_a = view
        .items
        .iter()
        .find(|l| l.menu_item.id == s.item_a)
        .unwrap()
        .id;

    let resp = cart_service::update_item(
        &state,
        &s.customer,
        line_a,
        UpdateCartItemRequest { quantity: 0 },
    )
    .await?;
    let summary = resp.data.unwrap();
    assert_eq!(summary.items_count, 1);
    assert_eq!(summary.item_subtotal, None);
    assert_eq!(summary.cart_total, Decimal::new(300, 2));

    Ok(())
}

#[tokio::test]
async fn another_users_cart_line_reads_as_missing() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let s = seed_scenario(&state).await?;
    let other = create_user(&state, "customer").await?;

    cart_service::add_item(
        &state,
        &s.customer,
        add_request(s.item_a, 1, Some(s.table_token)),
    )
    .await?;
    let resp = cart_service::view_cart(&state, &s.customer, Some(s.table_token)).await?;
    let line = resp.data.unwrap().items[0].id;

    let err = cart_service::update_item(
        &state,
        &other,
        line,
        UpdateCartItemRequest { quantity: 4 },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    let err = cart_service::remove_item(&state, &other, line).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    // The owner of the line still sees it untouched.
    let resp = cart_service::view_cart(&state, &s.customer, Some(s.table_token)).await?;
    assert_eq!(resp.data.unwrap().items[0].quantity, 1);

    Ok(())
}

#[tokio::test]
async fn switching_tables_rebinds_the_single_cart() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let s = seed_scenario(&state).await?;
    let (table2_id, table2_token) = seed_table(&state, s.restaurant_id, "T2").await?;

    cart_service::add_item(
        &state,
        &s.customer,
        add_request(s.item_a, 1, Some(s.table_token)),
    )
    .await?;
    cart_service::add_item(
        &state,
        &s.customer,
        add_request(s.item_b, 1, Some(table2_token)),
    )
    .await?;

    let row: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM carts WHERE user_id = $1 AND restaurant_id = $2")
            .bind(s.customer.user_id)
            .bind(s.restaurant_id)
            .fetch_one(&state.pool)
            .await?;
    assert_eq!(row.0, 1);

    let resp = cart_service::view_cart(&state, &s.customer, Some(table2_token)).await?;
    let view = resp.data.unwrap();
    assert_eq!(view.cart.unwrap().table_id, Some(table2_id));
    assert_eq!(view.items_count, 2);

    Ok(())
}

#[tokio::test]
async fn scanning_a_table_sets_the_session_context() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let s = seed_scenario(&state).await?;

    // No scan yet: adding without a token has no table context.
    let err = cart_service::add_item(&state, &s.customer, add_request(s.item_a, 1, None))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // Scanning the QR code records the current table for a logged-in user.
    let resp = menu_service::menu_view(
        &state,
        &MaybeAuthUser(Some(s.customer.clone())),
        s.table_token,
    )
    .await?;
    let view = resp.data.unwrap();
    assert_eq!(view.table.id, s.table_id);
    assert!(view.menu.is_some());
    assert_eq!(view.categories.len(), 1);
    assert_eq!(view.categories[0].items.len(), 2);

    // Now the token can be omitted.
    let resp = cart_service::add_item(&state, &s.customer, add_request(s.item_a, 1, None)).await?;
    assert_eq!(resp.data.unwrap().items_count, 1);

    // An unknown token is NotFound, not a fallback to the session.
    let err = cart_service::add_item(
        &state,
        &s.customer,
        add_request(s.item_a, 1, Some(Uuid::new_v4())),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    Ok(())
}

#[tokio::test]
async fn checkout_rolls_back_when_an_item_goes_unavailable() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let s = seed_scenario(&state).await?;

    cart_service::add_item(
        &state,
        &s.customer,
        add_request(s.item_a, 1, Some(s.table_token)),
    )
    .await?;
    cart_service::add_item(
        &state,
        &s.customer,
        add_request(s.item_b, 2, Some(s.table_token)),
    )
    .await?;

    // Item B disappears from the menu between add and checkout.
    menu_service::update_item(
        &state,
        &s.owner,
        s.item_b,
        UpdateMenuItemRequest {
            name: None,
            description: None,
            price: None,
            is_available: Some(false),
            is_featured: None,
            position: None,
        },
    )
    .await?;

    let err = order_service::checkout(
        &state,
        &s.customer,
        CheckoutRequest {
            table_token: Some(s.table_token),
            special_instructions: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // Nothing was committed: no order, no order items, cart intact.
    assert_eq!(order_count(&state, s.restaurant_id).await?, 0);
    let resp = cart_service::view_cart(&state, &s.customer, Some(s.table_token)).await?;
    assert_eq!(resp.data.unwrap().items_count, 2);

    Ok(())
}

#[tokio::test]
async fn status_updates_are_gated_and_validated() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let s = seed_scenario(&state).await?;
    let stranger = create_user(&state, "customer").await?;

    cart_service::add_item(
        &state,
        &s.customer,
        add_request(s.item_a, 1, Some(s.table_token)),
    )
    .await?;
    let resp = order_service::checkout(
        &state,
        &s.customer,
        CheckoutRequest {
            table_token: Some(s.table_token),
            special_instructions: None,
        },
    )
    .await?;
    let order_id = resp.data.unwrap().order.id;

    // Not the owner, not an admin.
    let err = order_service::update_order_status(
        &state,
        &stranger,
        order_id,
        UpdateOrderStatusRequest {
            status: "preparing".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    // Unknown status value is rejected and the order stays pending.
    let err = order_service::update_order_status(
        &state,
        &s.owner,
        order_id,
        UpdateOrderStatusRequest {
            status: "delivered".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let resp = order_service::get_order(&state, &s.owner, order_id).await?;
    assert_eq!(resp.data.unwrap().order.status, "pending");

    // Forward transitions pass, backward ones do not.
    let resp = order_service::update_order_status(
        &state,
        &s.owner,
        order_id,
        UpdateOrderStatusRequest {
            status: "preparing".into(),
        },
    )
    .await?;
    assert_eq!(resp.data.unwrap().status, "preparing");

    let err = order_service::update_order_status(
        &state,
        &s.owner,
        order_id,
        UpdateOrderStatusRequest {
            status: "pending".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // The customer who placed the order may read it, a stranger may not.
    let err = order_service::get_order(&state, &stranger, order_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
    let resp = order_service::get_order(&state, &s.customer, order_id).await?;
    assert_eq!(resp.data.unwrap().order.customer_id, Some(s.customer.user_id));

    Ok(())
}
