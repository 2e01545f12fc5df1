//! Category management with a referential guard on deletion.
//!
//! A category cannot be deleted while any product is assigned to it; the
//! request fails with 409 and reports how many products block it.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/categories` | No | Flat list or tree (`?tree=true`), `?active=true` hides inactive |
//! | GET | `/api/categories/{id}` | No | Single category |
//! | GET | `/api/categories/slug/{slug}` | No | Single category by slug |
//! | POST | `/api/categories` | Yes | Create category |
//! | PUT | `/api/categories/{id}` | Yes | Partial update |
//! | DELETE | `/api/categories/{id}` | Yes | Delete if no product references it |
//! | GET | `/api/categories/{id}/deletion-check` | Yes | Would a delete succeed? |
//! | GET | `/api/categories/overview` | Yes | Categories with products and statistics |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use repositories::PgCategoryRepository;
pub use services::CategoryService;
