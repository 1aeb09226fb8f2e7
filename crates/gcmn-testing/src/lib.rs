//! Test utilities for GCMN services.
//!
//! Provides `MockSession` and the temporary data-directory fixture.
//! Dev-dependency only.

pub mod auth;
pub mod fixture;
