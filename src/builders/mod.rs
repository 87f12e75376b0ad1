//! Fluent builders for configuration and client assembly options.

pub mod config;
pub mod options;

pub use config::{oauth2_config, OAuth2ConfigBuilder};
pub use options::{ClientOptions, ClientOptionsBuilder};
