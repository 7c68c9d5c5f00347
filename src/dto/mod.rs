pub mod auth;
pub mod cart;
pub mod menus;
pub mod orders;
pub mod restaurants;
