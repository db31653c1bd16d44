//! BenchLab Core - Shared types library.
//!
//! This crate provides common types used across all BenchLab components:
//! - `server` - The VIN report HTTP service
//! - `integration-tests` - Cross-module scenario tests
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no persistence, no HTTP
//! clients. Token generation, storage, and expiry enforcement all live in
//! the server crate; this crate defines what an [`Order`] and its token
//! sub-state look like.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for order IDs, VINs, download tokens, and
//!   the order record itself

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
