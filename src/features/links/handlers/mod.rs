mod link_handler;

pub use link_handler::*;
