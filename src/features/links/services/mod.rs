mod callback_client;
mod link_service;

pub use callback_client::{CallbackClient, CallbackOutcome, CallbackPayload};
pub use link_service::{LinkBuilder, LinkService};
