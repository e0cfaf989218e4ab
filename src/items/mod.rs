pub mod catalog;
pub mod inventory;
pub mod types;
