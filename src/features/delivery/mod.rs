//! Guarded byte-range delivery from the remote chunked backend.
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/dl/{file_id}?token=` | Download token | File bytes, `Range` aware |
//! | GET | `/stream/{file_id}?token=` | Stream token | HTML player page |

pub mod engine;
pub mod guard;
pub mod handlers;
pub mod range;
pub mod routes;
pub mod services;

pub use guard::AccessGuard;
pub use routes::routes;
pub use services::DeliveryService;
