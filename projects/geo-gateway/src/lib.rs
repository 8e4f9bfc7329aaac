//! HTTP gateway library: auth, address lookup and reverse proxy.
//! The binary in src/main.rs wires it to configuration and a listener.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod geo;
