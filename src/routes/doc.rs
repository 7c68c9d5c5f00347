use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        cart::{CartLine, CartSummary, CartView},
        menus::{CategoryList, CategoryWithItems, MenuItemList, MenuList, MenuView},
        orders::{OrderList, OrderWithItems},
        restaurants::{RestaurantList, TableList},
    },
    models::{Cart, CartItem, Category, DiningTable, Menu, MenuItem, Order, OrderItem, Restaurant, User},
    response::{ApiResponse, Meta},
    routes::{auth, cart, categories, health, items, menus, orders, params, restaurants, tables},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::register,
        restaurants::list_restaurants,
        restaurants::my_restaurants,
        restaurants::get_restaurant,
        restaurants::create_restaurant,
        restaurants::update_restaurant,
        restaurants::list_tables,
        restaurants::create_table,
        restaurants::list_menus,
        restaurants::create_menu,
        restaurants::restaurant_orders,
        tables::update_table,
        tables::delete_table,
        menus::menu_view,
        menus::update_menu,
        menus::delete_menu,
        menus::list_categories,
        menus::create_category,
        categories::update_category,
        categories::delete_category,
        categories::list_items,
        categories::create_item,
        items::update_menu_item,
        items::delete_menu_item,
        cart::view_cart,
        cart::add_item,
        cart::update_item,
        cart::remove_item,
        orders::list_orders,
        orders::checkout,
        orders::get_order,
        orders::update_order_status
    ),
    components(
        schemas(
            User,
            Restaurant,
            DiningTable,
            Menu,
            Category,
            MenuItem,
            Cart,
            CartItem,
            Order,
            OrderItem,
            RestaurantList,
            TableList,
            MenuList,
            CategoryList,
            MenuItemList,
            MenuView,
            CategoryWithItems,
            CartView,
            CartLine,
            CartSummary,
            OrderList,
            OrderWithItems,
            params::Pagination,
            params::OrderListQuery,
            Meta,
            ApiResponse<Restaurant>,
            ApiResponse<MenuView>,
            ApiResponse<CartSummary>,
            ApiResponse<CartView>,
            ApiResponse<OrderList>,
            ApiResponse<OrderWithItems>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Restaurants", description = "Restaurant management"),
        (name = "Tables", description = "Table management"),
        (name = "Menus", description = "Menu, category and item management"),
        (name = "Browse", description = "Public QR-code menu view"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Orders", description = "Checkout and order endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
