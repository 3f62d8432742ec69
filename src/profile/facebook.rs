//! Facebook Graph `/me` mapping.

use serde::Deserialize;

use crate::types::CanonicalProfile;

pub(super) const ENDPOINT: &str = "https://graph.facebook.com/me?fields=id,name,email,picture";

#[derive(Deserialize)]
struct FacebookUser {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    picture: Option<Picture>,
}

#[derive(Deserialize)]
struct Picture {
    #[serde(default)]
    data: Option<PictureData>,
}

#[derive(Deserialize)]
struct PictureData {
    #[serde(default)]
    url: Option<String>,
}

pub(super) fn parse(body: &[u8]) -> Result<CanonicalProfile, String> {
    let user: FacebookUser = serde_json::from_slice(body).map_err(|e| e.to_string())?;

    let photo_url = user
        .picture
        .and_then(|p| p.data)
        .and_then(|d| d.url)
        .unwrap_or_default();

    Ok(CanonicalProfile {
        external_id: user.id,
        display_name: user.name.unwrap_or_default(),
        email: user.email.unwrap_or_default(),
        photo_url,
    })
}
