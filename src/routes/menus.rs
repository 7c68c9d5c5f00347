use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, put},
};
use uuid::Uuid;

use crate::{
    dto::menus::{CategoryList, CreateCategoryRequest, MenuView, UpdateMenuRequest},
    error::AppResult,
    middleware::auth::{AuthUser, MaybeAuthUser},
    models::{Category, Menu},
    response::ApiResponse,
    services::menu_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", put(update_menu).delete(delete_menu))
        .route("/{id}/categories", get(list_categories).post(create_category))
}

/// Public router mounted at /api/menu: what a QR scan lands on.
pub fn browse_router() -> Router<AppState> {
    Router::new().route("/{token}", get(menu_view))
}

#[utoipa::path(
    get,
    path = "/api/menu/{token}",
    params(("token" = Uuid, Path, description = "Table token from the QR code")),
    responses(
        (status = 200, description = "Menu for the scanned table", body = ApiResponse<MenuView>),
        (status = 404, description = "Unknown table token")
    ),
    tag = "Browse"
)]
pub async fn menu_view(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Path(token): Path<Uuid>,
) -> AppResult<Json<ApiResponse<MenuView>>> {
    let resp = menu_service::menu_view(&state, &user, token).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/menus/{id}",
    params(("id" = Uuid, Path, description = "Menu ID")),
    request_body = UpdateMenuRequest,
    responses(
        (status = 200, description = "Update menu", body = ApiResponse<Menu>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Menus"
)]
pub async fn update_menu(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMenuRequest>,
) -> AppResult<Json<ApiResponse<Menu>>> {
    let resp = menu_service::update_menu(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/menus/{id}",
    params(("id" = Uuid, Path, description = "Menu ID")),
    responses(
        (status = 200, description = "Delete menu", body = ApiResponse<serde_json::Value>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Menus"
)]
pub async fn delete_menu(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = menu_service::delete_menu(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/menus/{id}/categories",
    params(("id" = Uuid, Path, description = "Menu ID")),
    responses(
        (status = 200, description = "Categories for a menu", body = ApiResponse<CategoryList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Menus"
)]
pub async fn list_categories(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<CategoryList>>> {
    let resp = menu_service::list_categories(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/menus/{id}/categories",
    params(("id" = Uuid, Path, description = "Menu ID")),
    request_body = CreateCategoryRequest,
    responses(
        (status = 200, description = "Create category", body = ApiResponse<Category>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Menus"
)]
pub async fn create_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateCategoryRequest>,
) -> AppResult<Json<ApiResponse<Category>>> {
    let resp = menu_service::create_category(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
