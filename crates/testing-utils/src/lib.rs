//! # Watcher Testing Utils
//!
//! Shared testing utilities for the watcher workspace: in-memory test doubles
//! for the capability traits and builders for test data.
//!
//! ```toml
//! [dev-dependencies]
//! watcher-testing-utils = { path = "../testing-utils" }
//! ```

pub mod builders;
pub mod helpers;
pub mod mocks;

pub use builders::*;
pub use helpers::*;
pub use mocks::*;
