//! LinkedIn OpenID Connect `userinfo` mapping.

use serde::Deserialize;

use crate::types::CanonicalProfile;

pub(super) const ENDPOINT: &str = "https://api.linkedin.com/v2/userinfo";

#[derive(Deserialize)]
struct LinkedInUser {
    sub: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    picture: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

pub(super) fn parse(body: &[u8]) -> Result<CanonicalProfile, String> {
    let user: LinkedInUser = serde_json::from_slice(body).map_err(|e| e.to_string())?;
    Ok(CanonicalProfile {
        external_id: user.sub,
        display_name: user.name.unwrap_or_default(),
        email: user.email.unwrap_or_default(),
        photo_url: user.picture.unwrap_or_default(),
    })
}
