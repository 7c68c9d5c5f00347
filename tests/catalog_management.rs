use axum_restaurant_api::{
    db::{create_orm_conn, create_pool},
    dto::{
        auth::RegisterRequest,
        menus::{CreateCategoryRequest, CreateMenuItemRequest, CreateMenuRequest},
        restaurants::{CreateRestaurantRequest, CreateTableRequest, UpdateRestaurantRequest, UpdateTableRequest},
    },
    entity::users::ActiveModel as UserActive,
    error::AppError,
    middleware::auth::AuthUser,
    services::{auth_service, menu_service, restaurant_service, table_service},
    state::AppState,
};
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

async fn setup_state() -> anyhow::Result<Option<AppState>> {
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

#[tokio::test]
async fn registration_checks_email_and_role() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let email = format!("{}@example.com", Uuid::new_v4());
    let resp = auth_service::register_user(
        &state.pool,
        RegisterRequest {
            email: email.clone(),
            password: "hunter22".into(),
            role: None,
            phone: None,
        },
    )
    .await?;
    assert_eq!(resp.data.unwrap().role, "customer");

    let err = auth_service::register_user(
        &state.pool,
        RegisterRequest {
            email,
            password: "hunter22".into(),
            role: None,
            phone: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // Self-registering as admin is not a thing.
    let err = auth_service::register_user(
        &state.pool,
        RegisterRequest {
            email: format!("{}@example.com", Uuid::new_v4()),
            password: "hunter22".into(),
            role: Some("admin".into()),
            phone: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    Ok(())
}

#[tokio::test]
async fn management_is_owner_or_admin_only() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let owner = create_user(&state, "owner").await?;
    let customer = create_user(&state, "customer").await?;
    let admin = create_user(&state, "admin").await?;

    // Customers cannot open a restaurant at all.
    let err = restaurant_service::create_restaurant(
        &state,
        &customer,
        CreateRestaurantRequest {
            name: "Nope".into(),
            description: None,
            address: None,
            phone: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    let resp = restaurant_service::create_restaurant(
        &state,
        &owner,
        CreateRestaurantRequest {
            name: "Gated Garden".into(),
            description: None,
            address: None,
            phone: None,
        },
    )
    .await?;
    let restaurant = resp.data.unwrap();

    // The gate fires before anything is revealed or mutated.
    let err = menu_service::list_menus(&state, &customer, restaurant.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    let err = restaurant_service::update_restaurant(
        &state,
        &customer,
        restaurant.id,
        UpdateRestaurantRequest {
            name: Some("Hijacked".into()),
            description: None,
            address: None,
            phone: None,
            is_active: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    // Admins pass the same predicate.
    let resp = restaurant_service::update_restaurant(
        &state,
        &admin,
        restaurant.id,
        UpdateRestaurantRequest {
            name: None,
            description: Some("admin touched this".into()),
            address: None,
            phone: None,
            is_active: None,
        },
    )
    .await?;
    assert_eq!(resp.data.unwrap().description, "admin touched this");

    // Owner builds the catalog; a negative price never gets in.
    let resp = menu_service::create_menu(
        &state,
        &owner,
        restaurant.id,
        CreateMenuRequest {
            name: "Dinner".into(),
            description: None,
            is_active: None,
        },
    )
    .await?;
    let menu = resp.data.unwrap();

    let resp = menu_service::create_category(
        &state,
        &owner,
        menu.id,
        CreateCategoryRequest {
            name: "Desserts".into(),
            description: None,
            position: Some(1),
            is_active: None,
        },
    )
    .await?;
    let category = resp.data.unwrap();

    let err = menu_service::create_item(
        &state,
        &owner,
        category.id,
        CreateMenuItemRequest {
            name: "Free Lunch".into(),
            description: None,
            price: Decimal::new(-100, 2),
            is_available: None,
            is_featured: None,
            position: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let resp = menu_service::create_item(
        &state,
        &owner,
        category.id,
        CreateMenuItemRequest {
            name: "Tiramisu".into(),
            description: None,
            price: Decimal::new(650, 2),
            is_available: None,
            is_featured: None,
            position: None,
        },
    )
    .await?;
    assert_eq!(resp.data.unwrap().price, Decimal::new(650, 2));

    // Unknown parents resolve to NotFound before the gate can leak anything.
    let err = menu_service::create_category(
        &state,
        &owner,
        Uuid::new_v4(),
        CreateCategoryRequest {
            name: "Orphan".into(),
            description: None,
            position: None,
            is_active: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    Ok(())
}

#[tokio::test]
async fn table_tokens_are_minted_once() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let owner = create_user(&state, "owner").await?;

    let resp = restaurant_service::create_restaurant(
        &state,
        &owner,
        CreateRestaurantRequest {
            name: "Token Tavern".into(),
            description: None,
            address: None,
            phone: None,
        },
    )
    .await?;
    let restaurant = resp.data.unwrap();

    let resp = table_service::create_table(
        &state,
        &owner,
        restaurant.id,
        CreateTableRequest {
            name: "Window".into(),
            seats: Some(2),
        },
    )
    .await?;
    let table = resp.data.unwrap();

    let resolved = table_service::resolve_token(&state.pool, table.token).await?;
    assert_eq!(resolved.id, table.id);

    // Renaming the table must not rotate its token.
    let resp = table_service::update_table(
        &state,
        &owner,
        table.id,
        UpdateTableRequest {
            name: Some("Window 2".into()),
            seats: None,
            is_active: Some(false),
        },
    )
    .await?;
    let updated = resp.data.unwrap();
    assert_eq!(updated.token, table.token);
    assert_eq!(updated.name, "Window 2");
    assert!(!updated.is_active);

    table_service::delete_table(&state, &owner, table.id).await?;
    let err = table_service::resolve_token(&state.pool, table.token)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    Ok(())
}
