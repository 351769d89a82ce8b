//! Append-only log of transfer attempts on the delivery endpoints.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::AccessLogger;
