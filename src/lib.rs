//! Ship Eater: a top-down shooter where the ship grows by docking the debris it collects.
//!
//! Integration tests in `tests/` are compiled as separate crates.
//! A `lib.rs` gives them a stable public API surface to import.

pub mod common;
pub mod game;
pub mod hex;
pub mod plugins;
