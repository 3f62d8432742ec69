//! Instagram basic profile mapping. Only id and username are available.

use serde::Deserialize;

use crate::types::CanonicalProfile;

pub(super) const ENDPOINT: &str = "https://graph.instagram.com/me?fields=id,username";

#[derive(Deserialize)]
struct InstagramUser {
    id: String,
    #[serde(default)]
    username: Option<String>,
}

pub(super) fn parse(body: &[u8]) -> Result<CanonicalProfile, String> {
    let user: InstagramUser = serde_json::from_slice(body).map_err(|e| e.to_string())?;
    Ok(CanonicalProfile::new(user.id).display_name(user.username.unwrap_or_default()))
}
