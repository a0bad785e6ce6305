pub mod action;
pub mod config;
pub mod coords;
pub mod error;
pub mod format;
pub mod query;
pub mod store;
pub mod teleport;
pub mod update;
