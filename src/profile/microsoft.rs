//! Microsoft Graph `/me` mapping.

use serde::Deserialize;

use crate::types::{first_non_empty, CanonicalProfile};

pub(super) const ENDPOINT: &str = "https://graph.microsoft.com/v1.0/me";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MicrosoftUser {
    id: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    user_principal_name: Option<String>,
    #[serde(default)]
    mail: Option<String>,
}

pub(super) fn parse(body: &[u8]) -> Result<CanonicalProfile, String> {
    let user: MicrosoftUser = serde_json::from_slice(body).map_err(|e| e.to_string())?;
    Ok(CanonicalProfile::new(user.id)
        .display_name(user.display_name.unwrap_or_default())
        .email(first_non_empty(user.mail, user.user_principal_name)))
}
