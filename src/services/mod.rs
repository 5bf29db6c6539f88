pub mod availability;
pub mod booking_api;
pub mod catalog;
pub mod checkout;
pub mod flow;
pub mod payments;
pub mod pricing;
pub mod slots;

pub use availability::*;
pub use booking_api::*;
pub use catalog::*;
pub use checkout::*;
pub use flow::*;
