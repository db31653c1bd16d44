//! External collaborators: the NHTSA vPIC decoder and the report generator.

pub mod report;
pub mod vin;

pub use report::{ReportArtifact, ReportError, ReportGenerator};
pub use vin::{DecodeError, DecodedVehicle, VinDecoder};
