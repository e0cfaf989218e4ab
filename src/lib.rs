//! Hoard - a terminal idle game of crates, coin flips, tavern brawls
//! and rebirth.
//!
//! This module exposes the game logic for testing and external use.

// Allow dead code in library - some functions are only used by the binary
#![allow(dead_code)]

pub mod brawl;
pub mod core;
pub mod gamble;
pub mod items;
pub mod loot;
pub mod rebirth;

// UI module is not exposed as it's tightly coupled to the terminal
mod ui;
