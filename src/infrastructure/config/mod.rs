//! Configuration management
//!
//! Hierarchical configuration loading using figment:
//! defaults, project YAML files, then `CELLVEC_*` environment variables.

pub mod loader;

pub use loader::ConfigLoader;
