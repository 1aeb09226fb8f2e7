//! Session types shared across GCMN services.
//!
//! Provides session-token issue/validation, the session cookie builders, and the
//! `Session` / `MaybeSession` extractors.

pub mod cookie;
pub mod session;
pub mod token;
