//! TikTok `user/info` mapping.

use serde::Deserialize;

use crate::types::CanonicalProfile;

pub(super) const ENDPOINT: &str =
    "https://open.tiktokapis.com/v2/user/info/?fields=open_id,avatar_url_100,display_name";

#[derive(Deserialize)]
struct Envelope {
    data: Data,
}

#[derive(Deserialize)]
struct Data {
    user: TikTokUser,
}

#[derive(Deserialize)]
struct TikTokUser {
    open_id: String,
    #[serde(default)]
    avatar_url_100: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
}

pub(super) fn parse(body: &[u8]) -> Result<CanonicalProfile, String> {
    let envelope: Envelope = serde_json::from_slice(body).map_err(|e| e.to_string())?;
    let user = envelope.data.user;
    Ok(CanonicalProfile::new(user.open_id)
        .display_name(user.display_name.unwrap_or_default())
        .photo_url(user.avatar_url_100.unwrap_or_default()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope() {
        let profile = parse(
            br#"{"data": {"user": {"open_id": "723f24d7", "display_name": "Tik",
                "avatar_url_100": "https://p16.example/a.jpeg"}},
                "error": {"code": "ok", "message": ""}}"#,
        )
        .unwrap();
        assert_eq!(profile.external_id, "723f24d7");
        assert_eq!(profile.photo_url, "https://p16.example/a.jpeg");
    }

    #[test]
    fn test_missing_user_rejected() {
        assert!(parse(br#"{"data": {}, "error": {"code": "access_token_invalid"}}"#).is_err());
    }
}
