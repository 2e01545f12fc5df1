//! Features layer - one module per API area
//!
//! Each feature owns its models, DTOs, repositories, services, handlers and routes.

pub mod auth;
pub mod categories;
pub mod media;
pub mod products;
