pub mod cli;
pub mod config;
pub mod error;
pub mod git;
pub mod heat;
pub mod logging;
pub mod model;
pub mod registry;
pub mod repos;
pub mod server;
pub mod store;
pub mod translate;
