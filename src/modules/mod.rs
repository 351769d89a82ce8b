//! Modules layer - Infrastructure components for external integrations
//!
//! Contains the adapters for the remote chunked file backend.

pub mod storage;
