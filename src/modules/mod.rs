//! Modules layer - Infrastructure components for external integrations
//!
//! Contains the clients for the two remote services the relay forwards to.

pub mod document_store;
pub mod storage;
