use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shared::Gender;

/// Domain model for the child profile a signed-in user logs events for.
/// The email of the signed-in user is the profile's unique key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildProfile {
    pub id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChildProfile {
    pub fn generate_id(timestamp_millis: u64) -> String {
        format!("profile::{}", timestamp_millis)
    }

    /// First and last name joined, if either is set
    pub fn full_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.trim().is_empty())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

/// Who is signed in, persisted across restarts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveSession {
    pub email: String,
    pub display_name: Option<String>,
}

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ProfileValidationError {
    #[error("Email address is not valid: {0}")]
    InvalidEmail(String),
    #[error("Name is too long")]
    NameTooLong,
    #[error("Birthday must be in YYYY-MM-DD format")]
    InvalidBirthday,
    #[error("Birthday cannot be in the future")]
    FutureBirthday,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> ChildProfile {
        let now = Utc::now();
        ChildProfile {
            id: "profile::1".to_string(),
            email: "parent@example.com".to_string(),
            first_name: None,
            middle_name: None,
            last_name: None,
            birthday: None,
            gender: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_full_name() {
        let mut p = profile();
        assert_eq!(p.full_name(), None);

        p.first_name = Some("ada".to_string());
        assert_eq!(p.full_name(), Some("ada".to_string()));

        p.last_name = Some("lovelace".to_string());
        assert_eq!(p.full_name(), Some("ada lovelace".to_string()));
    }
}
