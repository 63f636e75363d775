//! # mrsh-auth Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/          # Criterion benchmarks of the full authentication path
//! └── src/
//!     └── integration/  # End-to-end flows through real adapters
//!         ├── scenarios.rs  # Acceptance scenarios A-F
//!         └── flows.rs      # Transport -> authority -> authenticator
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p mrsh-tests
//!
//! # By category
//! cargo test -p mrsh-tests integration::scenarios::
//!
//! # Benchmarks
//! cargo bench -p mrsh-tests
//! ```

pub mod fixtures;
