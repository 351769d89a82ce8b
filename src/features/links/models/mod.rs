mod link_transaction;

pub use link_transaction::{CallbackMethod, LinkTransaction, NewLinkTransaction};
