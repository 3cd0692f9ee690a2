pub mod api;
pub mod config;
pub mod directory;
pub mod error;
pub mod http_client;
pub mod logging;
pub mod metadata;
pub mod prediction;
pub mod provider;
pub mod scope;
pub mod state;
pub mod suggest;
