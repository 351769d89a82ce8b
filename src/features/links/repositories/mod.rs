mod link_transaction_repository;

pub use link_transaction_repository::{LinkTransactionRepository, PgLinkTransactionRepository};
