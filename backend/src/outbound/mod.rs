//! Outbound adapters implementing the domain's driven ports.
//!
//! - **persistence**: PostgreSQL repositories using Diesel
//! - **memory**: a process-local store for development and tests
//! - **security**: password hashing and signed session tokens

pub mod memory;
pub mod persistence;
pub mod security;
