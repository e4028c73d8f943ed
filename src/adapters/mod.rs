pub mod clock;
pub mod file_config_adapter;
pub mod memory_store;
pub mod sqlite_store;
pub mod web;
