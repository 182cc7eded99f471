//! Test utilities shared by the unit and HTTP-level tests.
//!
//! - Factories for valid fixtures, overridable through a closure
//! - In-memory implementations of the storage traits
//! - A recording notifier and a stub payment gateway
//! - `TestAppStateBuilder` wiring all of the above into an `AppState`

mod app_state_builder;
mod auth_mocks;
mod billing_mocks;
mod factories;

pub use app_state_builder::*;
pub use auth_mocks::*;
pub use billing_mocks::*;
pub use factories::*;
