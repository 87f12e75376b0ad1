//! Accessible Resource Types

use serde::{Deserialize, Serialize};

/// Site/resource the authorized token can reach, as reported by the
/// authorization server's accessible-resources endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessibleResource {
    /// Resource identifier (cloud id).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Base URL of the resource.
    pub url: String,
    /// Scopes granted on this resource.
    #[serde(default)]
    pub scopes: Vec<String>,
    /// Avatar URL.
    #[serde(default, rename = "avatarUrl", skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}
