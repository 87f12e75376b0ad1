//! Authorization server collaborators.

pub mod authorization;

pub use authorization::{
    AuthorizationService, MockAuthorizationService, OAuth2AuthorizationService,
};
