pub mod account;
pub mod rating;
pub mod report;
pub mod store;
pub mod user;
