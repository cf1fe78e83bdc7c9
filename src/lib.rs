//! Sproutvale library crate — re-exports all modules for integration
//! testing.
//!
//! The binary crate (`main.rs`) is the actual game entry point. This
//! library crate exposes the same modules so that `tests/` integration
//! tests can import simulation types, systems, and resources without
//! needing a window or GPU.

pub mod shared;
pub mod input;
pub mod player;
pub mod farming;
pub mod trees;
pub mod sky;
pub mod level;
pub mod world;
pub mod missions;
pub mod shop;
pub mod audio;
pub mod store;
pub mod save;
pub mod data;
