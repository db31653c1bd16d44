//! Core domain types.
//!
//! Newtype wrappers keep the order pipeline type-safe: an [`OrderId`] cannot
//! be confused with a raw UUID string, a [`Vin`] is always validated before
//! it reaches the decoder, and a [`DownloadToken`] never appears in debug
//! output or API responses by accident.

mod id;
mod order;
mod status;
mod token;
mod vin;

pub use id::OrderId;
pub use order::Order;
pub use status::OrderStatus;
pub use token::DownloadToken;
pub use vin::{Vin, VinParseError};
