use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::menus::{
        CategoryList, CategoryWithItems, CreateCategoryRequest, CreateMenuItemRequest,
        CreateMenuRequest, MenuItemList, MenuList, MenuView, UpdateCategoryRequest,
        UpdateMenuItemRequest, UpdateMenuRequest,
    },
    entity::{
        categories::{
            ActiveModel as CategoryActive, Column as CategoryCol, Entity as Categories,
            Model as CategoryModel,
        },
        menu_items::{
            ActiveModel as MenuItemActive, Column as MenuItemCol, Entity as MenuItems,
            Model as MenuItemModel,
        },
        menus::{ActiveModel as MenuActive, Column as MenuCol, Entity as Menus, Model as MenuModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, MaybeAuthUser, ensure_restaurant_access},
    models::{Category, Menu, MenuItem, Restaurant},
    response::{ApiResponse, Meta},
    services::{restaurant_service, table_service},
    state::AppState,
};

/// Owner of the restaurant a menu belongs to.
async fn menu_owner(pool: &DbPool, menu_id: Uuid) -> AppResult<Uuid> {
    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        SELECT r.owner_id
        FROM menus m
        JOIN restaurants r ON r.id = m.restaurant_id
        WHERE m.id = $1
        "#,
    )
    .bind(menu_id)
    .fetch_optional(pool)
    .await?;
    row.map(|(owner_id,)| owner_id).ok_or(AppError::NotFound)
}

/// Owner of the restaurant a category belongs to, through its menu.
async fn category_owner(pool: &DbPool, category_id: Uuid) -> AppResult<Uuid> {
    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        SELECT r.owner_id
        FROM categories c
        JOIN menus m ON m.id = c.menu_id
        JOIN restaurants r ON r.id = m.restaurant_id
        WHERE c.id = $1
        "#,
    )
    .bind(category_id)
    .fetch_optional(pool)
    .await?;
    row.map(|(owner_id,)| owner_id).ok_or(AppError::NotFound)
}

/// Public menu view behind a table's QR code. Resolving the token also makes
/// that table the caller's current one when they are logged in.
pub async fn menu_view(
    state: &AppState,
    user: &MaybeAuthUser,
    token: Uuid,
) -> AppResult<ApiResponse<MenuView>> {
    let table = table_service::resolve_token(&state.pool, token).await?;

    let restaurant: Option<Restaurant> =
        sqlx::query_as("SELECT * FROM restaurants WHERE id = $1")
            .bind(table.restaurant_id)
            .fetch_optional(&state.pool)
            .await?;
    let restaurant = restaurant.ok_or(AppError::NotFound)?;

    if let Some(user) = &user.0 {
        table_service::set_current_table(&state.pool, user.user_id, table.id).await?;
    }

    let menu: Option<Menu> = sqlx::query_as(
        "SELECT * FROM menus WHERE restaurant_id = $1 AND is_active ORDER BY created_at LIMIT 1",
    )
    .bind(restaurant.id)
    .fetch_optional(&state.pool)
    .await?;

    let menu = match menu {
        Some(menu) => menu,
        None => {
            return Ok(ApiResponse::success(
                "No active menu",
                MenuView {
                    restaurant,
                    table,
                    menu: None,
                    categories: Vec::new(),
                },
                Some(Meta::empty()),
            ));
        }
    };

    let categories: Vec<Category> = sqlx::query_as(
        "SELECT * FROM categories WHERE menu_id = $1 AND is_active ORDER BY position, id",
    )
    .bind(menu.id)
    .fetch_all(&state.pool)
    .await?;

    let items: Vec<MenuItem> = sqlx::query_as(
        r#"
        SELECT mi.*
        FROM menu_items mi
        JOIN categories c ON c.id = mi.category_id
        WHERE c.menu_id = $1 AND c.is_active
        ORDER BY mi.position, mi.id
        "#,
    )
    .bind(menu.id)
    .fetch_all(&state.pool)
    .await?;

    let categories = categories
        .into_iter()
        .map(|category| CategoryWithItems {
            items: items
                .iter()
                .filter(|item| item.category_id == category.id)
                .cloned()
                .collect(),
            category,
        })
        .collect();

    Ok(ApiResponse::success(
        "Menu",
        MenuView {
            restaurant,
            table,
            menu: Some(menu),
            categories,
        },
        Some(Meta::empty()),
    ))
}

pub async fn list_menus(
    state: &AppState,
    user: &AuthUser,
    restaurant_id: Uuid,
) -> AppResult<ApiResponse<MenuList>> {
    let owner_id = restaurant_service::owner_of(&state.pool, restaurant_id).await?;
    ensure_restaurant_access(user, owner_id)?;

    let items = Menus::find()
        .filter(MenuCol::RestaurantId.eq(restaurant_id))
        .order_by_asc(MenuCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(menu_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Menus",
        MenuList { items },
        Some(Meta::empty()),
    ))
}

pub async fn create_menu(
    state: &AppState,
    user: &AuthUser,
    restaurant_id: Uuid,
    payload: CreateMenuRequest,
) -> AppResult<ApiResponse<Menu>> {
    let owner_id = restaurant_service::owner_of(&state.pool, restaurant_id).await?;
    ensure_restaurant_access(user, owner_id)?;

    let menu = MenuActive {
        id: Set(Uuid::new_v4()),
        restaurant_id: Set(restaurant_id),
        name: Set(payload.name),
        description: Set(payload.description.unwrap_or_default()),
        is_active: Set(payload.is_active.unwrap_or(true)),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success(
        "Menu created",
        menu_from_entity(menu),
        Some(Meta::empty()),
    ))
}

pub async fn update_menu(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateMenuRequest,
) -> AppResult<ApiResponse<Menu>> {
    let existing = Menus::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(m) => m,
        None => return Err(AppError::NotFound),
    };

    let owner_id = restaurant_service::owner_of(&state.pool, existing.restaurant_id).await?;
    ensure_restaurant_access(user, owner_id)?;

    let mut active: MenuActive = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    active.updated_at = Set(Utc::now().into());
    let menu = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Menu updated",
        menu_from_entity(menu),
        Some(Meta::empty()),
    ))
}

pub async fn delete_menu(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let owner_id = menu_owner(&state.pool, id).await?;
    ensure_restaurant_access(user, owner_id)?;

    Menus::delete_by_id(id).exec(&state.orm).await?;

    Ok(ApiResponse::success(
        "Menu deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn list_categories(
    state: &AppState,
    user: &AuthUser,
    menu_id: Uuid,
) -> AppResult<ApiResponse<CategoryList>> {
    let owner_id = menu_owner(&state.pool, menu_id).await?;
    ensure_restaurant_access(user, owner_id)?;

    let items = Categories::find()
        .filter(CategoryCol::MenuId.eq(menu_id))
        .order_by_asc(CategoryCol::Position)
        .order_by_asc(CategoryCol::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(category_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Categories",
        CategoryList { items },
        Some(Meta::empty()),
    ))
}

pub async fn create_category(
    state: &AppState,
    user: &AuthUser,
    menu_id: Uuid,
    payload: CreateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    let owner_id = menu_owner(&state.pool, menu_id).await?;
    ensure_restaurant_access(user, owner_id)?;

    let category = CategoryActive {
        id: Set(Uuid::new_v4()),
        menu_id: Set(menu_id),
        name: Set(payload.name),
        description: Set(payload.description.unwrap_or_default()),
        position: Set(payload.position.unwrap_or(0)),
        is_active: Set(payload.is_active.unwrap_or(true)),
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success(
        "Category created",
        category_from_entity(category),
        Some(Meta::empty()),
    ))
}

pub async fn update_category(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    let existing = Categories::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(c) => c,
        None => return Err(AppError::NotFound),
    };

    let owner_id = menu_owner(&state.pool, existing.menu_id).await?;
    ensure_restaurant_access(user, owner_id)?;

    let mut active: CategoryActive = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(position) = payload.position {
        active.position = Set(position);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    let category = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Category updated",
        category_from_entity(category),
        Some(Meta::empty()),
    ))
}

pub async fn delete_category(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let owner_id = category_owner(&state.pool, id).await?;
    ensure_restaurant_access(user, owner_id)?;

    Categories::delete_by_id(id).exec(&state.orm).await?;

    Ok(ApiResponse::success(
        "Category deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn list_items(
    state: &AppState,
    user: &AuthUser,
    category_id: Uuid,
) -> AppResult<ApiResponse<MenuItemList>> {
    let owner_id = category_owner(&state.pool, category_id).await?;
    ensure_restaurant_access(user, owner_id)?;

    let items = MenuItems::find()
        .filter(MenuItemCol::CategoryId.eq(category_id))
        .order_by_asc(MenuItemCol::Position)
        .order_by_asc(MenuItemCol::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(menu_item_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Menu items",
        MenuItemList { items },
        Some(Meta::empty()),
    ))
}

pub async fn create_item(
    state: &AppState,
    user: &AuthUser,
    category_id: Uuid,
    payload: CreateMenuItemRequest,
) -> AppResult<ApiResponse<MenuItem>> {
    let owner_id = category_owner(&state.pool, category_id).await?;
    ensure_restaurant_access(user, owner_id)?;

    if payload.price < Decimal::ZERO {
        return Err(AppError::BadRequest("price must not be negative".into()));
    }

    let item = MenuItemActive {
        id: Set(Uuid::new_v4()),
        category_id: Set(category_id),
        name: Set(payload.name),
        description: Set(payload.description.unwrap_or_default()),
        price: Set(payload.price),
        is_available: Set(payload.is_available.unwrap_or(true)),
        is_featured: Set(payload.is_featured.unwrap_or(false)),
        position: Set(payload.position.unwrap_or(0)),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success(
        "Menu item created",
        menu_item_from_entity(item),
        Some(Meta::empty()),
    ))
}

pub async fn update_item(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateMenuItemRequest,
) -> AppResult<ApiResponse<MenuItem>> {
    let existing = MenuItems::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(i) => i,
        None => return Err(AppError::NotFound),
    };

    let owner_id = category_owner(&state.pool, existing.category_id).await?;
    ensure_restaurant_access(user, owner_id)?;

    if let Some(price) = payload.price {
        if price < Decimal::ZERO {
            return Err(AppError::BadRequest("price must not be negative".into()));
        }
    }

    let mut active: MenuItemActive = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(is_available) = payload.is_available {
        active.is_available = Set(is_available);
    }
    if let Some(is_featured) = payload.is_featured {
        active.is_featured = Set(is_featured);
    }
    if let Some(position) = payload.position {
        active.position = Set(position);
    }
    active.updated_at = Set(Utc::now().into());
    let item = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Menu item updated",
        menu_item_from_entity(item),
        Some(Meta::empty()),
    ))
}

pub async fn delete_item(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let existing = MenuItems::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(i) => i,
        None => return Err(AppError::NotFound),
    };

    let owner_id = category_owner(&state.pool, existing.category_id).await?;
    ensure_restaurant_access(user, owner_id)?;

    MenuItems::delete_by_id(id).exec(&state.orm).await?;

    Ok(ApiResponse::success(
        "Menu item deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

fn menu_from_entity(model: MenuModel) -> Menu {
    Menu {
        id: model.id,
        restaurant_id: model.restaurant_id,
        name: model.name,
        description: model.description,
        is_active: model.is_active,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

fn category_from_entity(model: CategoryModel) -> Category {
    Category {
        id: model.id,
        menu_id: model.menu_id,
        name: model.name,
        description: model.description,
        position: model.position,
        is_active: model.is_active,
    }
}

fn menu_item_from_entity(model: MenuItemModel) -> MenuItem {
    MenuItem {
        id: model.id,
        category_id: model.category_id,
        name: model.name,
        description: model.description,
        price: model.price,
        is_available: model.is_available,
        is_featured: model.is_featured,
        position: model.position,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
