pub mod cli;
pub mod config;
pub mod entities;
pub mod error;
pub mod fixtures;
pub mod logging;
pub mod sources;
pub mod suite;
pub mod utils;
pub mod validation;
