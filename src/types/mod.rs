//! Data types for the token lifecycle subsystem.

pub mod config;
pub mod resource;
pub mod token;

pub use config::{OAuth2Config, DEFAULT_TIMEOUT};
pub use resource::AccessibleResource;
pub use token::Token;
