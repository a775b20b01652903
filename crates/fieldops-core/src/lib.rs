//! Core types and trait definitions for the fieldops personnel registry.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends implement [`store::PersonnelStore`]; the services in
//! [`assignment`] and [`proximity`] work against any of them.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod assignment;
pub mod error;
pub mod geo;
pub mod lifecycle;
pub mod personnel;
pub mod proximity;
pub mod store;

pub use error::{Error, PersonnelRef, Result};
