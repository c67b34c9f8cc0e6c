//! tms server library entry.
//!
//! This crate wires configuration, the SQLite store, the repositories, the
//! role gate and the HTTP handlers into one service. It is consumed by the
//! binary (`main.rs`) and by integration tests.

pub mod api;
pub mod app_state;
pub mod auth;
pub mod config;
pub mod ops;
pub mod policy;
pub mod repo;
pub mod router;
pub mod runner;
pub mod store;
