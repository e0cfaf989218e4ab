pub mod logic;
pub mod opponents;
pub mod types;
