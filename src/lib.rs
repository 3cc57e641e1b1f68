pub mod assistant;
pub mod config;
pub mod error;
pub mod language;
pub mod profile;
pub mod quiz;
