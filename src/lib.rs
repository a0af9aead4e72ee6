//! libris application library
//!
//! Book catalogue modules plus the bootstrap that wires settings, database,
//! module registry, and HTTP server together.

pub mod app;
pub mod modules;
pub mod utils;

pub use app::{migrate, serve};
