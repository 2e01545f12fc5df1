//! Product catalogue.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/products` | No | Paginated list, optional `category_id` filter |
//! | GET | `/api/products/{id}` | No | Single product |
//! | POST | `/api/products` | Yes | Create product |
//! | PUT | `/api/products/{id}` | Yes | Update product, replacing its images |
//! | DELETE | `/api/products/{id}` | Yes | Delete product and its images |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use repositories::PgProductRepository;
pub use services::ProductService;
