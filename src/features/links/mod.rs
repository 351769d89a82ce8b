//! One-shot device binding and link issuance.
//!
//! A file moves `Uploaded -> Requested -> Linked`; revocation disables it
//! from any state and expiry is computed from `link_expiry` at check time.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | POST | `/api/request` | No | Bind device to file |
//! | GET/POST | `/api/postback` | No | Mint tokens, relay to callback |
//! | POST | `/api/links` | No | Re-fetch valid links |
//! | GET | `/api/admin/files/{id}/link-transactions` | Basic | Issuance history |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use routes::{admin_routes, routes};
pub use services::{CallbackClient, LinkBuilder, LinkService};
