//! Profile service: sign-in, the active profile, and profile edits.
//!
//! A signed-in email owns exactly one child profile. Signing in with an
//! unknown email creates an empty profile for it and marks it active.

use anyhow::Result;
use chrono::{Local, NaiveDate, Utc};
use log::{info, warn};
use std::sync::Arc;

use crate::backend::domain::commands::profiles::{CurrentUser, SignInCommand, UpdateProfileCommand};
use crate::backend::domain::models::profile::{ActiveSession, ChildProfile, ProfileValidationError};
use crate::backend::domain::units::to_title_case;
use crate::backend::storage::{Connection, ProfileStorage};

pub const MAX_NAME_LENGTH: usize = 100;

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ProfileServiceError {
    #[error("No profile is signed in")]
    NotSignedIn,
}

#[derive(Clone)]
pub struct ProfileService<C: Connection> {
    profile_repository: C::ProfileRepository,
}

impl<C: Connection> ProfileService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            profile_repository: connection.create_profile_repository(),
        }
    }

    /// Sign in as an email, creating its profile on first use
    pub async fn sign_in(&self, command: SignInCommand) -> Result<(CurrentUser, ChildProfile)> {
        let email = Self::validate_email(&command.email)?;
        info!("Signing in: {}", email);

        let profile = match self.profile_repository.get_profile_by_email(&email).await? {
            Some(profile) => profile,
            None => {
                let now = Utc::now();
                let profile = ChildProfile {
                    id: ChildProfile::generate_id(now.timestamp_millis() as u64),
                    email: email.clone(),
                    first_name: None,
                    middle_name: None,
                    last_name: None,
                    birthday: None,
                    gender: None,
                    created_at: now,
                    updated_at: now,
                };
                self.profile_repository.store_profile(&profile).await?;
                info!("Created profile {} for {}", profile.id, email);
                profile
            }
        };

        let session = ActiveSession {
            email: profile.email.clone(),
            display_name: command
                .display_name
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty()),
        };
        self.profile_repository.set_active_session(&session).await?;

        Ok((Self::to_current_user(session), profile))
    }

    pub async fn sign_out(&self) -> Result<()> {
        info!("Signing out");
        self.profile_repository.clear_active_session().await
    }

    /// The signed-in user, if any
    pub async fn current_user(&self) -> Result<Option<CurrentUser>> {
        let session = self.profile_repository.get_active_session().await?;
        Ok(session.map(Self::to_current_user))
    }

    pub async fn get_active_profile(&self) -> Result<Option<ChildProfile>> {
        match self.profile_repository.get_active_session().await? {
            Some(session) => self.profile_repository.get_profile_by_email(&session.email).await,
            None => Ok(None),
        }
    }

    /// The active profile, or `ProfileServiceError::NotSignedIn`
    pub async fn require_active_profile(&self) -> Result<ChildProfile> {
        match self.get_active_profile().await? {
            Some(profile) => Ok(profile),
            None => {
                warn!("Request needs a signed-in profile but none is active");
                Err(ProfileServiceError::NotSignedIn.into())
            }
        }
    }

    /// Apply a partial update to the active profile.
    /// An empty string clears a name or the birthday.
    pub async fn update_profile(&self, command: UpdateProfileCommand) -> Result<ChildProfile> {
        let mut profile = self.require_active_profile().await?;
        info!("Updating profile {}", profile.id);

        if let Some(first_name) = command.first_name {
            profile.first_name = Self::validate_name(&first_name)?;
        }
        if let Some(middle_name) = command.middle_name {
            profile.middle_name = Self::validate_name(&middle_name)?;
        }
        if let Some(last_name) = command.last_name {
            profile.last_name = Self::validate_name(&last_name)?;
        }
        if let Some(birthday) = command.birthday {
            profile.birthday = Self::validate_birthday(&birthday, Local::now().date_naive())?;
        }
        if let Some(gender) = command.gender {
            profile.gender = Some(gender);
        }

        profile.updated_at = Utc::now();
        self.profile_repository.update_profile(&profile).await?;

        info!("Updated profile {}", profile.id);
        Ok(profile)
    }

    fn to_current_user(session: ActiveSession) -> CurrentUser {
        CurrentUser {
            email: session.email,
            display_name: session.display_name.map(|name| to_title_case(&name)),
        }
    }

    /// Trim and lowercase an email, rejecting anything that is not
    /// `local@domain.tld`
    pub fn validate_email(email: &str) -> Result<String, ProfileValidationError> {
        let email = email.trim().to_lowercase();
        let invalid = || ProfileValidationError::InvalidEmail(email.clone());

        if email.chars().any(char::is_whitespace) {
            return Err(invalid());
        }

        let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
        let domain_ok = !domain.contains('@')
            && domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.');

        if local.is_empty() || !domain_ok {
            return Err(invalid());
        }

        Ok(email)
    }

    fn validate_name(name: &str) -> Result<Option<String>, ProfileValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(None);
        }
        if name.chars().count() > MAX_NAME_LENGTH {
            return Err(ProfileValidationError::NameTooLong);
        }
        Ok(Some(name.to_string()))
    }

    fn validate_birthday(birthday: &str, today: NaiveDate) -> Result<Option<NaiveDate>, ProfileValidationError> {
        let birthday = birthday.trim();
        if birthday.is_empty() {
            return Ok(None);
        }

        let date = NaiveDate::parse_from_str(birthday, "%Y-%m-%d")
            .map_err(|_| ProfileValidationError::InvalidBirthday)?;
        if date > today {
            return Err(ProfileValidationError::FutureBirthday);
        }

        Ok(Some(date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::storage::csv::test_utils::TestEnvironment;
    use crate::backend::storage::csv::CsvConnection;
    use shared::Gender;

    type Service = ProfileService<CsvConnection>;

    async fn setup() -> (TestEnvironment, Service) {
        let env = TestEnvironment::new().await.unwrap();
        let service = ProfileService::new(Arc::new(env.connection.clone()));
        (env, service)
    }

    fn sign_in_command(email: &str, display_name: Option<&str>) -> SignInCommand {
        SignInCommand {
            email: email.to_string(),
            display_name: display_name.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_sign_in_creates_profile_once() {
        let (_env, service) = setup().await;

        let (user, first) = service
            .sign_in(sign_in_command(" Parent@Example.com ", Some("jamie doe")))
            .await
            .unwrap();
        assert_eq!(user.email, "parent@example.com");
        assert_eq!(user.display_name.as_deref(), Some("Jamie Doe"));

        service.sign_out().await.unwrap();
        let (_, second) = service.sign_in(sign_in_command("parent@example.com", None)).await.unwrap();
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_current_user_follows_session() {
        let (_env, service) = setup().await;
        assert!(service.current_user().await.unwrap().is_none());

        service.sign_in(sign_in_command("parent@example.com", None)).await.unwrap();
        let user = service.current_user().await.unwrap().unwrap();
        assert_eq!(user.email, "parent@example.com");
        assert_eq!(user.display_name, None);

        service.sign_out().await.unwrap();
        assert!(service.current_user().await.unwrap().is_none());
        assert!(service.get_active_profile().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_require_active_profile_when_signed_out() {
        let (_env, service) = setup().await;

        let error = service.require_active_profile().await.unwrap_err();
        assert_eq!(
            error.downcast_ref::<ProfileServiceError>(),
            Some(&ProfileServiceError::NotSignedIn)
        );
    }

    #[tokio::test]
    async fn test_update_profile() {
        let (_env, service) = setup().await;
        service.sign_in(sign_in_command("parent@example.com", None)).await.unwrap();

        let updated = service
            .update_profile(UpdateProfileCommand {
                first_name: Some("  Ada ".to_string()),
                last_name: Some("Lovelace".to_string()),
                birthday: Some("2025-01-15".to_string()),
                gender: Some(Gender::Female),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.first_name.as_deref(), Some("Ada"));
        assert_eq!(updated.birthday, NaiveDate::from_ymd_opt(2025, 1, 15));

        let cleared = service
            .update_profile(UpdateProfileCommand {
                last_name: Some(String::new()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(cleared.first_name.as_deref(), Some("Ada"));
        assert_eq!(cleared.last_name, None);
        assert_eq!(cleared.gender, Some(Gender::Female));

        let stored = service.get_active_profile().await.unwrap().unwrap();
        assert_eq!(stored, cleared);
    }

    #[tokio::test]
    async fn test_update_profile_rejects_bad_input() {
        let (_env, service) = setup().await;
        service.sign_in(sign_in_command("parent@example.com", None)).await.unwrap();

        let error = service
            .update_profile(UpdateProfileCommand {
                birthday: Some("15/01/2025".to_string()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_eq!(
            error.downcast_ref::<ProfileValidationError>(),
            Some(&ProfileValidationError::InvalidBirthday)
        );

        let error = service
            .update_profile(UpdateProfileCommand {
                first_name: Some("x".repeat(MAX_NAME_LENGTH + 1)),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_eq!(
            error.downcast_ref::<ProfileValidationError>(),
            Some(&ProfileValidationError::NameTooLong)
        );
    }

    #[test]
    fn test_validate_email() {
        assert_eq!(Service::validate_email("A@B.co").unwrap(), "a@b.co");
        assert!(Service::validate_email("no-at-sign").is_err());
        assert!(Service::validate_email("@example.com").is_err());
        assert!(Service::validate_email("a@localhost").is_err());
        assert!(Service::validate_email("a@b@c.com").is_err());
        assert!(Service::validate_email("a b@c.com").is_err());
    }

    #[test]
    fn test_validate_birthday() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 13).unwrap();
        assert_eq!(Service::validate_birthday("", today), Ok(None));
        assert_eq!(
            Service::validate_birthday("2025-06-13", today),
            Ok(NaiveDate::from_ymd_opt(2025, 6, 13))
        );
        assert_eq!(
            Service::validate_birthday("2025-06-14", today),
            Err(ProfileValidationError::FutureBirthday)
        );
    }
}
