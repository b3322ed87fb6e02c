pub mod auth;
pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod ledger;
pub mod req;
pub mod server;
pub mod user;
pub mod utils;
