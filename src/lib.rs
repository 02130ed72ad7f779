pub mod acquire;
pub mod config;
pub mod errors;
pub mod parse;
pub mod pipeline;
pub mod resolution;
pub mod serialize;
pub mod transport;
pub mod types;
