//! sea-orm entities for the ratings service.

pub mod ratings;
pub mod stores;
pub mod users;
