//! Common test utilities and fixtures for integration tests

#![allow(dead_code, unreachable_pub, clippy::expect_used, clippy::missing_panics_doc)]

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
