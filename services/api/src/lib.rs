//! services/api/src/lib.rs
//!
//! The `api` service: adapters, configuration and the web layer that exposes
//! the wellness plan session controller over REST and WebSocket.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
