//! Configuration loading, parsing, and validation for BITE.
//!
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//! - Deep merging in [`merger`]
//!
//! # Example
//!
//! ```
//! use bite::config::{load_from_paths, ConfigPaths};
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! let home = TempDir::new().unwrap();
//! let bite_dir = temp.path().join(".bite");
//! fs::create_dir_all(&bite_dir).unwrap();
//! fs::write(bite_dir.join("config.yml"), "app_name: test").unwrap();
//!
//! let paths = ConfigPaths::discover_with_home(temp.path(), home.path());
//! let config = load_from_paths(&paths).unwrap();
//! assert_eq!(config.app_name, Some("test".to_string()));
//! ```
//!
//! # Configuration File Locations
//!
//! BITE discovers and merges configuration in this order:
//! 1. User global config (`~/.bite/config.yml`, or `$BITE_HOME/config.yml`)
//! 2. Project config (`.bite/config.yml`)
//! 3. Local overrides (`.bite/config.local.yml`)

pub mod loader;
pub mod merger;
pub mod schema;

pub use loader::{
    find_project_root, load_config, load_config_file, load_config_value, load_from_paths,
    load_merged_config, parse_config, ConfigPaths, PROJECT_DIR,
};
pub use merger::{deep_merge, merge_configs};
pub use schema::{BiteConfig, OutputMode, PlaybackConfig, Settings};
