pub mod open;
pub mod pools;
pub mod types;
