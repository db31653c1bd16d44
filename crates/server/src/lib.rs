//! BenchLab server library.
//!
//! This crate provides the VIN report service as a library, allowing it to
//! be tested and reused (the `integration-tests` crate drives the store and
//! gate directly).

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod gate;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
