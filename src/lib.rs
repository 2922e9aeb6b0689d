//! Grid generation library
//!
//! Re-exports modules for use by the CLI and other tools.

pub mod ascii;
pub mod config;
pub mod error;
pub mod generation;
pub mod grid;
pub mod map_export;
pub mod seeds;
pub mod tilemap;
pub mod tileset;
