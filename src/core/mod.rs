pub mod constants;
pub mod game_state;
pub mod save;
pub mod tick;
