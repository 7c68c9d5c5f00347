pub mod audit_logs;
pub mod cart_items;
pub mod carts;
pub mod categories;
pub mod menu_items;
pub mod menus;
pub mod order_items;
pub mod orders;
pub mod restaurants;
pub mod table_sessions;
pub mod tables;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use cart_items::Entity as CartItems;
pub use carts::Entity as Carts;
pub use categories::Entity as Categories;
pub use menu_items::Entity as MenuItems;
pub use menus::Entity as Menus;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use restaurants::Entity as Restaurants;
pub use table_sessions::Entity as TableSessions;
pub use tables::Entity as Tables;
pub use users::Entity as Users;
