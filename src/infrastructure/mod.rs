// Infrastructure layer - Configuration and flat-file persistence
pub mod config;
pub mod file_repositories;
pub mod json_file_store;
