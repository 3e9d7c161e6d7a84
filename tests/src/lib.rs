//! # Weighbridge Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Facility builder and session drivers
//! └── integration/
//!     ├── scenarios.rs  # End-to-end weighing scenarios
//!     └── properties.rs # Concurrency and idempotence properties
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p wb-tests
//! cargo test -p wb-tests integration::scenarios::
//! cargo bench -p wb-tests
//! ```

pub mod fixtures;
pub mod integration;
