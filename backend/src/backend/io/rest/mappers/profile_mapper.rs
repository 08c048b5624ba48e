use crate::backend::domain::commands::profiles::{CurrentUser as DomainCurrentUser, UpdateProfileCommand};
use crate::backend::domain::models::profile::ChildProfile;
use shared::{CurrentUser as SharedCurrentUser, Profile as SharedProfile, UpdateProfileRequest};

pub struct ProfileMapper;

impl ProfileMapper {
    pub fn to_dto(domain: ChildProfile) -> SharedProfile {
        SharedProfile {
            id: domain.id,
            email: domain.email,
            first_name: domain.first_name,
            middle_name: domain.middle_name,
            last_name: domain.last_name,
            birthday: domain.birthday.map(|date| date.format("%Y-%m-%d").to_string()),
            gender: domain.gender,
            created_at: domain.created_at.to_rfc3339(),
            updated_at: domain.updated_at.to_rfc3339(),
        }
    }

    pub fn to_update_command(request: UpdateProfileRequest) -> UpdateProfileCommand {
        UpdateProfileCommand {
            first_name: request.first_name,
            middle_name: request.middle_name,
            last_name: request.last_name,
            birthday: request.birthday,
            gender: request.gender,
        }
    }

    pub fn user_to_dto(domain: DomainCurrentUser) -> SharedCurrentUser {
        SharedCurrentUser {
            email: domain.email,
            display_name: domain.display_name,
        }
    }
}
