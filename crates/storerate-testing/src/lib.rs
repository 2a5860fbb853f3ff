//! Test utilities for Storerate services.
//!
//! Dev-dependency only.

pub mod auth;
