//! Top-level facade crate for ordergate.
//!
//! Re-exports the wire vocabulary and the broadcast server library so users can
//! depend on a single crate.

pub mod core {
    pub use ordergate_core::*;
}

pub mod server {
    pub use ordergate_server::*;
}
