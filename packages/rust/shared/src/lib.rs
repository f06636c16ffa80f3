//! Shared types, error model, and configuration for the compendium converter.
//!
//! This crate is the foundation depended on by all other compendium crates.
//! It provides:
//! - [`CompendiumError`]: the unified error type
//! - Domain types ([`Category`], [`Entry`], [`CategoryKind`])
//! - Configuration ([`AppConfig`], [`ConvertConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ConvertConfig, DefaultsConfig, config_dir, config_file_path,
    init_config, init_config_in, load_config, load_config_from,
};
pub use error::{CompendiumError, Result};
pub use types::{BLACKLISTED_SHORT_ID, Category, CategoryKind, Entry};
