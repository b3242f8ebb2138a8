use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type UserId = i64;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    /// Site staff; resolves to [`Role::Admin`]
    pub is_staff: bool,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
}

/// Privilege a user can hold. A user may hold several at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    RegularUser,
    Reviewer,
    ContentCreator,
    GoldenUser,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "verification_status")]
pub enum VerificationStatus {
    Pending,
    Verified,
    Rejected,
}

/// Raw role-bearing records for one user, as stored.
///
/// `None` means the user has no such record at all; `Some(false)` means the
/// record exists but has been deactivated.
#[derive(Debug, Clone, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct RoleProfile {
    pub is_staff: bool,
    pub reviewer_active: Option<bool>,
    pub creator_active: Option<bool>,
    pub golden_status: Option<VerificationStatus>,
}

impl RoleProfile {
    /// Roles granted by these records, ascending. Never empty.
    pub fn roles(&self) -> Vec<Role> {
        let mut roles = vec![Role::RegularUser];
        if self.reviewer_active == Some(true) {
            roles.push(Role::Reviewer);
        }
        if self.creator_active == Some(true) {
            roles.push(Role::ContentCreator);
        }
        if self.golden_status == Some(VerificationStatus::Verified) {
            roles.push(Role::GoldenUser);
        }
        if self.is_staff {
            roles.push(Role::Admin);
        }
        roles
    }
}

/// The acting user with roles resolved once per request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Viewer {
    pub user_id: UserId,
    pub roles: Vec<Role>,
}

impl Viewer {
    pub fn has(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_admin(&self) -> bool {
        self.has(Role::Admin)
    }
}

/// Golden-user application and verification state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct GoldenProfile {
    pub user_id: UserId,
    pub profession: String,
    pub years_of_experience: i32,
    pub company: Option<String>,
    pub notable_works: Option<String>,
    pub verification_status: VerificationStatus,
    pub verification_notes: Option<String>,
    pub verified_at: Option<DateTime<Utc>>,
    pub verified_by: Option<UserId>,
    /// Content analytics pages opened by this golden user
    pub total_content_views: i32,
    pub created_at: DateTime<Utc>,
}

/// Admin view of golden applications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GoldenFilter {
    #[default]
    Pending,
    Verified,
    Rejected,
    All,
}

impl GoldenFilter {
    pub fn accepts(self, profile: &GoldenProfile) -> bool {
        match self {
            GoldenFilter::Pending => profile.verification_status == VerificationStatus::Pending,
            GoldenFilter::Verified => profile.verification_status == VerificationStatus::Verified,
            GoldenFilter::Rejected => profile.verification_status == VerificationStatus::Rejected,
            GoldenFilter::All => true,
        }
    }
}

/// Submitted fields of a golden-user application
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GoldenApplication {
    pub profession: String,
    #[serde(default)]
    pub years_of_experience: i32,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub notable_works: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_user_is_regular() {
        assert_eq!(RoleProfile::default().roles(), vec![Role::RegularUser]);
    }

    #[test]
    fn test_inactive_reviewer_grants_nothing() {
        let profile = RoleProfile {
            reviewer_active: Some(false),
            ..RoleProfile::default()
        };
        assert_eq!(profile.roles(), vec![Role::RegularUser]);
    }

    #[test]
    fn test_pending_golden_is_not_golden() {
        let profile = RoleProfile {
            golden_status: Some(VerificationStatus::Pending),
            ..RoleProfile::default()
        };
        assert!(!profile.roles().contains(&Role::GoldenUser));
    }

    #[test]
    fn test_combined_roles() {
        let profile = RoleProfile {
            is_staff: true,
            reviewer_active: Some(true),
            creator_active: None,
            golden_status: Some(VerificationStatus::Verified),
        };
        let viewer = Viewer {
            user_id: 1,
            roles: profile.roles(),
        };
        assert_eq!(
            viewer.roles,
            vec![Role::RegularUser, Role::Reviewer, Role::GoldenUser, Role::Admin]
        );
        assert!(viewer.is_admin());
        assert!(viewer.has(Role::Reviewer));
        assert!(!viewer.has(Role::ContentCreator));
    }

    #[test]
    fn test_golden_filter_defaults_to_pending() {
        let filter: GoldenFilter = serde_json::from_str("\"All\"").unwrap();
        assert_eq!(filter, GoldenFilter::All);
        assert_eq!(GoldenFilter::default(), GoldenFilter::Pending);
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(
            serde_json::to_string(&Role::ContentCreator).unwrap(),
            "\"content_creator\""
        );
    }
}
