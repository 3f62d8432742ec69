//! X (Twitter) `users/me` mapping.

use serde::Deserialize;

use crate::types::{first_non_empty, CanonicalProfile};

pub(super) const ENDPOINT: &str = "https://api.x.com/2/users/me?user.fields=profile_image_url";

#[derive(Deserialize)]
struct Envelope {
    data: XUser,
}

#[derive(Deserialize)]
struct XUser {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    profile_image_url: Option<String>,
}

pub(super) fn parse(body: &[u8]) -> Result<CanonicalProfile, String> {
    let user = serde_json::from_slice::<Envelope>(body)
        .map_err(|e| e.to_string())?
        .data;
    Ok(CanonicalProfile::new(user.id)
        .display_name(first_non_empty(user.name, user.username))
        .photo_url(user.profile_image_url.unwrap_or_default()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_falls_back_to_username() {
        let profile = parse(
            br#"{"data": {"id": "2244994945", "name": "", "username": "XDevelopers",
                "profile_image_url": "https://pbs.example/x.jpg"}}"#,
        )
        .unwrap();
        assert_eq!(profile.external_id, "2244994945");
        assert_eq!(profile.display_name, "XDevelopers");
        assert_eq!(profile.photo_url, "https://pbs.example/x.jpg");
    }
}
