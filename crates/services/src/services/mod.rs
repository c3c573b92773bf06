pub mod admin_auth;
pub mod catalog;
pub mod catalog_query;
pub mod config;
pub mod image_store;
pub mod order_link;
pub mod slug;
