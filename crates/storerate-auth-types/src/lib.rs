//! Access-control types shared across Storerate crates.
//!
//! Provides JWT encoding/validation and the bearer-token `Identity` extractor.

pub mod identity;
pub mod token;
