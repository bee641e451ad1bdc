//! Top-level facade crate for metalprice.
//!
//! Re-exports core types and the gateway library so users can depend on a single crate.

pub mod core {
    pub use metalprice_core::*;
}

pub mod gateway {
    pub use metalprice_gateway::*;
}
