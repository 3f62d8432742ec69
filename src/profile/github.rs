//! GitHub `/user` mapping.

use serde::Deserialize;
use tracing::debug;

use crate::types::{first_non_empty, CanonicalProfile};

pub(super) const ENDPOINT: &str = "https://api.github.com/user";

pub(super) const HEADERS: &[(&str, &str)] = &[
    ("accept", "application/vnd.github+json"),
    ("x-github-api-version", "2022-11-28"),
];

#[derive(Deserialize)]
struct GitHubUser {
    id: i64,
    #[serde(default)]
    login: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    avatar_url: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

pub(super) fn parse(body: &[u8]) -> Result<CanonicalProfile, String> {
    let user: GitHubUser = serde_json::from_slice(body).map_err(|e| e.to_string())?;

    if user.email.as_deref().unwrap_or_default().is_empty() {
        debug!(login = user.login.as_deref().unwrap_or_default(), "GitHub user has a private email");
    }

    Ok(CanonicalProfile {
        external_id: user.id.to_string(),
        display_name: first_non_empty(user.name, user.login),
        email: user.email.unwrap_or_default(),
        photo_url: user.avatar_url.unwrap_or_default(),
    })
}
