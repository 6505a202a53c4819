use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A user's profile as held by both the local cache and the remote store.
///
/// `uid` is the join key between the two copies and never changes once created.
/// `last_updated` is milliseconds since the Unix epoch and drives last-write-wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct UserProfile {
    pub uid: String,
    pub name: String,
    pub email: String,
    pub bio: String,
    /// Comma-delimited free text, kept verbatim.
    pub skills: String,
    pub experience: String,
    pub last_updated: i64,
}

impl UserProfile {
    /// An empty profile for a user seen for the first time.
    pub fn blank(uid: impl Into<String>, now_ms: i64) -> Self {
        Self {
            uid: uid.into(),
            name: String::new(),
            email: String::new(),
            bio: String::new(),
            skills: String::new(),
            experience: String::new(),
            last_updated: now_ms,
        }
    }
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_profile_has_empty_fields() {
        let profile = UserProfile::blank("u-1", 42);
        assert_eq!(profile.uid, "u-1");
        assert!(profile.name.is_empty());
        assert!(profile.skills.is_empty());
        assert_eq!(profile.last_updated, 42);
    }

    #[test]
    fn test_profile_json_uses_snake_case_fields() {
        let profile = UserProfile::blank("u-1", 7);
        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(value["last_updated"], 7);
        assert_eq!(value["uid"], "u-1");
    }
}
