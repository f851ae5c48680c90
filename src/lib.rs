//! Ember - TLS-terminating origin server
//!
//! Core library for static file serving and the application gateway.

pub mod config;
pub mod gateway;
pub mod http;
pub mod server;
pub mod statics;
