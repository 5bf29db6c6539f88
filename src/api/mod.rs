pub mod middleware;
pub mod admin;
pub mod flows;
pub mod payments;
pub mod profile;
pub mod rooms;
pub mod router;

pub use middleware::*;
pub use router::build_router;
