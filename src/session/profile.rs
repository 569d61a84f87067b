//! Presentation helpers for the signed-in user.

use super::User;

/// Metadata flag for project email updates.
pub const EMAIL_NOTIFICATIONS_KEY: &str = "email_notifications";
/// Metadata flag for training completion alerts.
pub const TRAINING_ALERTS_KEY: &str = "training_alerts";

const FALLBACK_INITIALS: &str = "US";
const FALLBACK_NAME: &str = "User";

fn metadata_name(user: &User) -> Option<&str> {
    ["full_name", "name"]
        .iter()
        .filter_map(|key| user.metadata.get(*key).and_then(|value| value.as_str()))
        .map(str::trim)
        .find(|value| !value.is_empty())
}

/// Name shown in the header: metadata name, then email, then "User".
pub fn display_name(user: Option<&User>) -> String {
    let Some(user) = user else {
        return FALLBACK_NAME.to_string();
    };
    metadata_name(user)
        .or(user.email.as_deref().filter(|email| !email.is_empty()))
        .unwrap_or(FALLBACK_NAME)
        .to_string()
}

/// Two-letter avatar initials.
pub fn initials(user: Option<&User>) -> String {
    let Some(user) = user else {
        return FALLBACK_INITIALS.to_string();
    };
    if let Some(name) = metadata_name(user) {
        return name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .flat_map(char::to_uppercase)
            .take(2)
            .collect();
    }
    if let Some(local) = user
        .email
        .as_deref()
        .and_then(|email| email.split('@').next())
        .filter(|local| !local.is_empty())
    {
        return local.chars().take(2).flat_map(char::to_uppercase).collect();
    }
    FALLBACK_INITIALS.to_string()
}

/// String metadata value, empty when absent.
pub fn metadata_text(user: &User, key: &str) -> String {
    user.metadata
        .get(key)
        .and_then(|value| value.as_str())
        .unwrap_or_default()
        .to_string()
}

/// Boolean metadata value; absent or non-boolean values read as `default`.
pub fn metadata_flag(user: &User, key: &str, default: bool) -> bool {
    user.metadata
        .get(key)
        .and_then(|value| value.as_bool())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, Value, json};

    fn user(email: Option<&str>, metadata: Value) -> User {
        let metadata: Map<String, Value> = match metadata {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        User {
            id: "u".into(),
            email: email.map(str::to_string),
            metadata,
        }
    }

    #[test]
    fn initials_prefer_full_name() {
        let u = user(Some("grace@navy.mil"), json!({ "full_name": "grace brewster hopper" }));
        assert_eq!(initials(Some(&u)), "GB");
        assert_eq!(display_name(Some(&u)), "grace brewster hopper");
    }

    #[test]
    fn initials_fall_back_to_email_then_default() {
        let u = user(Some("linus@example.com"), json!({}));
        assert_eq!(initials(Some(&u)), "LI");
        assert_eq!(display_name(Some(&u)), "linus@example.com");
        let anonymous = user(None, json!({ "full_name": "  " }));
        assert_eq!(initials(Some(&anonymous)), "US");
        assert_eq!(display_name(Some(&anonymous)), "User");
        assert_eq!(initials(None), "US");
    }

    #[test]
    fn name_key_is_secondary() {
        let u = user(None, json!({ "name": "Ken" }));
        assert_eq!(display_name(Some(&u)), "Ken");
        assert_eq!(initials(Some(&u)), "K");
        assert_eq!(metadata_text(&u, "name"), "Ken");
        assert_eq!(metadata_text(&u, "company"), "");
    }

    #[test]
    fn notification_flags_default_on() {
        let u = user(None, json!({ "training_alerts": false, "email_notifications": "yes" }));
        assert!(!metadata_flag(&u, TRAINING_ALERTS_KEY, true));
        assert!(metadata_flag(&u, EMAIL_NOTIFICATIONS_KEY, true));
        assert!(metadata_flag(&user(None, json!({})), TRAINING_ALERTS_KEY, true));
    }
}
