pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod flutterwave_client;
pub mod http_client;
pub mod password;
pub mod setup;
