use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::connection::{unique_temp_path, CsvConnection};
use crate::backend::domain::models::profile::{ActiveSession, ChildProfile};
use crate::backend::storage::traits::ProfileStorage;

const PROFILE_FILE: &str = "profile.yaml";
const DATA_FORMAT_VERSION: &str = "1.0";

/// Contents of `global_config.yaml`
#[derive(Debug, Default, Serialize, Deserialize)]
struct GlobalConfig {
    #[serde(default)]
    active_profile_directory: Option<String>,
    #[serde(default)]
    active_display_name: Option<String>,
    #[serde(default)]
    data_format_version: Option<String>,
}

/// Profile repository using one directory per profile, discovered by scanning
#[derive(Clone)]
pub struct ProfileRepository {
    connection: CsvConnection,
}

impl ProfileRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    /// Generate a safe filesystem identifier from an email address
    /// Converts "Parent.One@Example.com" -> "parent_one_example_com"
    pub fn generate_safe_directory_name(email: &str) -> String {
        let name = email
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
            .collect::<String>()
            .trim_matches('_')
            .to_string();

        if name.is_empty() {
            "profile".to_string()
        } else {
            name
        }
    }

    fn profile_yaml_path(&self, directory_name: &str) -> PathBuf {
        self.connection.profile_directory(directory_name).join(PROFILE_FILE)
    }

    /// Find the directory holding the profile for `email`
    pub async fn find_directory_by_email(&self, email: &str) -> Result<Option<String>> {
        let found = self
            .discover_profiles()
            .await?
            .into_iter()
            .find(|(_, profile)| profile.email.eq_ignore_ascii_case(email))
            .map(|(directory_name, _)| directory_name);
        Ok(found)
    }

    /// Discover all profiles by scanning directories
    async fn discover_profiles(&self) -> Result<Vec<(String, ChildProfile)>> {
        let base_dir = self.connection.base_directory();

        if !base_dir.exists() {
            debug!("Base directory doesn't exist, returning no profiles");
            return Ok(Vec::new());
        }

        let mut profiles = Vec::new();

        for entry in fs::read_dir(base_dir)? {
            let path = entry?.path();
            if !path.is_dir() {
                continue;
            }

            let dir_name = match path.file_name().and_then(|n| n.to_str()) {
                Some(name) => name.to_string(),
                None => {
                    warn!("Skipping directory with invalid name: {:?}", path);
                    continue;
                }
            };

            match self.load_profile_from_directory(&dir_name).await {
                Ok(Some(profile)) => profiles.push((dir_name, profile)),
                Ok(None) => debug!("Directory {} doesn't contain a profile", dir_name),
                Err(e) => warn!("Error loading profile from directory {}: {}", dir_name, e),
            }
        }

        profiles.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(profiles)
    }

    async fn load_profile_from_directory(&self, directory_name: &str) -> Result<Option<ChildProfile>> {
        let yaml_path = self.profile_yaml_path(directory_name);

        if !yaml_path.exists() {
            return Ok(None);
        }

        let yaml_content = fs::read_to_string(&yaml_path)?;
        let profile: ChildProfile = serde_yaml::from_str(&yaml_content)
            .with_context(|| format!("Failed to parse {}", yaml_path.display()))?;

        Ok(Some(profile))
    }

    async fn save_profile_to_directory(&self, profile: &ChildProfile, directory_name: &str) -> Result<()> {
        self.connection.ensure_profile_directory(directory_name)?;

        let yaml_path = self.profile_yaml_path(directory_name);
        let yaml_content = serde_yaml::to_string(profile)?;
        write_atomically(&yaml_path, &yaml_content)?;

        info!("Saved profile {} to directory: {}", profile.id, directory_name);
        Ok(())
    }

    /// Pick a directory for a new profile. Distinct emails can map to the
    /// same safe name, so a numeric suffix is added until the name is free.
    fn allocate_directory_name(&self, email: &str) -> String {
        let base_name = Self::generate_safe_directory_name(email);
        let mut candidate = base_name.clone();
        let mut suffix = 2;

        while self.connection.profile_directory(&candidate).exists() {
            candidate = format!("{}_{}", base_name, suffix);
            suffix += 1;
        }

        candidate
    }

    fn read_global_config(&self) -> Result<GlobalConfig> {
        let path = self.connection.global_config_path();

        if !path.exists() {
            return Ok(GlobalConfig::default());
        }

        let yaml_content = fs::read_to_string(&path)?;
        serde_yaml::from_str(&yaml_content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    fn write_global_config(&self, mut config: GlobalConfig) -> Result<()> {
        config.data_format_version = Some(DATA_FORMAT_VERSION.to_string());
        let yaml_content = serde_yaml::to_string(&config)?;
        write_atomically(&self.connection.global_config_path(), &yaml_content)
    }
}

/// Write through a temp file and rename it over the target
fn write_atomically(path: &Path, content: &str) -> Result<()> {
    let temp_path = unique_temp_path(path);
    fs::write(&temp_path, content).with_context(|| format!("Failed to write {}", temp_path.display()))?;
    fs::rename(&temp_path, path).with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}

#[async_trait]
impl ProfileStorage for ProfileRepository {
    async fn store_profile(&self, profile: &ChildProfile) -> Result<()> {
        let _guard = self.connection.lock_writes().await;
        if self.find_directory_by_email(&profile.email).await?.is_some() {
            return Err(anyhow!("A profile already exists for {}", profile.email));
        }

        let directory_name = self.allocate_directory_name(&profile.email);
        self.save_profile_to_directory(profile, &directory_name).await
    }

    async fn get_profile_by_email(&self, email: &str) -> Result<Option<ChildProfile>> {
        match self.find_directory_by_email(email).await? {
            Some(directory_name) => self.load_profile_from_directory(&directory_name).await,
            None => Ok(None),
        }
    }

    async fn update_profile(&self, profile: &ChildProfile) -> Result<()> {
        let _guard = self.connection.lock_writes().await;
        let directory_name = self
            .find_directory_by_email(&profile.email)
            .await?
            .ok_or_else(|| anyhow!("Could not find directory for profile: {}", profile.email))?;

        self.save_profile_to_directory(profile, &directory_name).await
    }

    async fn get_active_session(&self) -> Result<Option<ActiveSession>> {
        let config = self.read_global_config()?;

        let directory_name = match config.active_profile_directory {
            Some(dir) => dir,
            None => return Ok(None),
        };

        match self.load_profile_from_directory(&directory_name).await? {
            Some(profile) => Ok(Some(ActiveSession {
                email: profile.email,
                display_name: config.active_display_name,
            })),
            None => {
                warn!("Active profile directory {} no longer holds a profile", directory_name);
                Ok(None)
            }
        }
    }

    async fn set_active_session(&self, session: &ActiveSession) -> Result<()> {
        let _guard = self.connection.lock_writes().await;
        let directory_name = self
            .find_directory_by_email(&session.email)
            .await?
            .ok_or_else(|| anyhow!("Profile not found: {}", session.email))?;

        self.write_global_config(GlobalConfig {
            active_profile_directory: Some(directory_name.clone()),
            active_display_name: session.display_name.clone(),
            data_format_version: None,
        })?;

        info!("Set active profile directory to: {}", directory_name);
        Ok(())
    }

    async fn clear_active_session(&self) -> Result<()> {
        let _guard = self.connection.lock_writes().await;
        self.write_global_config(GlobalConfig::default())?;
        info!("Cleared active profile");
        Ok(())
    }
}
