pub mod db;
pub mod server;
pub mod service;
pub mod settings;
pub mod telemetry;
