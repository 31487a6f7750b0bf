pub mod aggregate;
pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod logs;
pub mod sources;
pub mod state;
