mod delivery_handler;

pub use delivery_handler::*;
