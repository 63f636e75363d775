//! # Ports Layer
//!
//! Trait definitions for the hexagonal architecture.
//! - **Inbound (Driving)**: API the daemon's connection handler calls
//! - **Outbound (Driven)**: Collaborators this crate needs

pub mod inbound;
pub mod outbound;
