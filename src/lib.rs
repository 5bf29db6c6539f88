pub mod api;
pub mod bootstrap;
pub mod config;
pub mod models;
pub mod services;

pub use api::middleware::*;
pub use config::*;
pub use models::*;
