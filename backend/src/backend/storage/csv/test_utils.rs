//! Test utilities with automatic cleanup
//!
//! `TestEnvironment` owns a temporary directory that is removed when it is
//! dropped, even if the test panics.

use anyhow::Result;
use chrono::Utc;
use std::path::PathBuf;
use tempfile::TempDir;

use super::connection::CsvConnection;
use super::profile_repository::ProfileRepository;
use crate::backend::domain::models::profile::ChildProfile;
use crate::backend::storage::traits::ProfileStorage;

/// RAII test environment backed by a temporary data directory
pub struct TestEnvironment {
    /// Kept alive until drop
    _temp_dir: TempDir,
    pub connection: CsvConnection,
    pub base_path: PathBuf,
}

impl TestEnvironment {
    pub async fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let base_path = temp_dir.path().to_path_buf();
        let connection = CsvConnection::new(&base_path)?;

        Ok(TestEnvironment {
            _temp_dir: temp_dir,
            connection,
            base_path,
        })
    }

    /// Store an empty profile for `email` and return it
    pub async fn create_test_profile(&self, email: &str) -> Result<ChildProfile> {
        let profile = test_profile(email);
        ProfileRepository::new(self.connection.clone())
            .store_profile(&profile)
            .await?;
        Ok(profile)
    }
}

/// An unsaved profile with no optional fields set
pub fn test_profile(email: &str) -> ChildProfile {
    let now = Utc::now();
    ChildProfile {
        id: ChildProfile::generate_id(now.timestamp_millis() as u64),
        email: email.to_string(),
        first_name: None,
        middle_name: None,
        last_name: None,
        birthday: None,
        gender: None,
        created_at: now,
        updated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_environment_cleanup() -> Result<()> {
        let base_path;

        {
            let env = TestEnvironment::new().await?;
            base_path = env.base_path.clone();
            assert!(base_path.exists());

            std::fs::write(base_path.join("test_file.txt"), "test data")?;
        }

        assert!(!base_path.exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_test_profile() -> Result<()> {
        let env = TestEnvironment::new().await?;
        let profile = env.create_test_profile("parent@example.com").await?;

        let stored = ProfileRepository::new(env.connection.clone())
            .get_profile_by_email("parent@example.com")
            .await?;
        assert_eq!(stored, Some(profile));
        Ok(())
    }
}
