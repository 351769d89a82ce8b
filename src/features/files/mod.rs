//! Access records for files served from the storage channel.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | POST | `/api/admin/files` | Basic | Register a channel message |
//! | GET | `/api/admin/files` | Basic | List records |
//! | GET | `/api/admin/files/{id}` | Basic | Get one record |
//! | POST | `/api/admin/files/{id}/revoke` | Basic | Revoke all links |
//! | DELETE | `/api/admin/files/{id}` | Basic | Delete the record |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::FileService;
