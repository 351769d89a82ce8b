mod access_logger;

pub use access_logger::AccessLogger;
