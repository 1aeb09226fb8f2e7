//! Domain types shared across GCMN library services.
//!
//! This crate contains only pure types with no framework dependencies.
//! Vocabularies and derivation rules; no I/O.

pub mod card;
pub mod id;
pub mod role;
pub mod status;
