pub mod cleanup;
pub mod config;
pub mod server;
pub mod service;
pub mod store;
