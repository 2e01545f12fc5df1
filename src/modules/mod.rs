//! Modules layer - Infrastructure components for external integrations
//!
//! Contains adapters for external services the catalogue depends on.

pub mod storage;
