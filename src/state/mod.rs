//! State management module
//!
//! This module handles all persisted application state:
//! - Shared data structures (data.rs)
//! - User settings and their JSON file (settings.rs)

pub mod data;
pub mod settings;
