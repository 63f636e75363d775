//! # Adapters Module
//!
//! Infrastructure adapters implementing the ports.

pub mod hmac_authority;
pub mod system;
pub mod transport;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;
