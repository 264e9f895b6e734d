pub mod cleaning;
pub mod config;
pub mod importers;
pub mod log_sink;
pub mod pipeline;
pub mod schema;
pub mod services;
pub mod table;
