pub mod block;
pub mod booking;
pub mod flow;
pub mod quote;
pub mod reservation;
pub mod room;
pub mod schedule;
pub mod slot;
pub mod visitor;

pub use block::*;
pub use booking::*;
pub use flow::*;
pub use quote::*;
pub use reservation::*;
pub use room::*;
pub use schedule::*;
pub use slot::*;
pub use visitor::*;
