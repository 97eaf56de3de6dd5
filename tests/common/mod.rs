//! Shared test utilities for snatch integration harnesses.
//!
//! Import everything you need via `mod common; use common::*;` at the top of
//! each harness file. Everything here is deterministic: fixed timestamps,
//! fixed corpora, and `tokio::time::pause()`-friendly stores.

#![allow(unused)]

#[macro_use]
pub mod assertions;
pub mod builders;
pub mod fake_record_api;
pub mod fixtures;

pub use builders::*;
pub use fixtures::*;
