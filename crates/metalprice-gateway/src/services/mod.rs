//! Services behind the HTTP layer.

pub mod prices;

pub use prices::{PriceService, Served};
