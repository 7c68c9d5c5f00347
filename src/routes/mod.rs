use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod cart;
pub mod categories;
pub mod doc;
pub mod health;
pub mod items;
pub mod menus;
pub mod orders;
pub mod params;
pub mod restaurants;
pub mod tables;

// Build the API router without binding state; it is provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/restaurants", restaurants::router())
        .nest("/tables", tables::router())
        .nest("/menus", menus::router())
        .nest("/menu", menus::browse_router())
        .nest("/categories", categories::router())
        .nest("/items", items::router())
        .nest("/cart", cart::router())
        .nest("/orders", orders::router())
}
