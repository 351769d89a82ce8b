pub mod access_logs;
pub mod delivery;
pub mod files;
pub mod links;
