//! Ambient HTTP plumbing shared by GCMN services.

pub mod error;
pub mod health;
pub mod middleware;
pub mod sea_ext;
pub mod serde;
pub mod tracing;
