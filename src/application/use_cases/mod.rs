pub mod auth;
pub mod payment;
pub mod plans;
pub mod user;
