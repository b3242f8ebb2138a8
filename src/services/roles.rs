use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{
    db::{CatalogStore, GoldenStatusUpdate},
    error::{AppError, AppResult},
    models::{
        GoldenApplication, GoldenFilter, GoldenProfile, Role, UserId, VerificationStatus, Viewer,
    },
};

/// Admin verdict on a pending golden-user application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoldenDecision {
    Verify,
    Reject,
}

/// Admin review queue of golden applications with counts across all of them
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GoldenApplicationListing {
    pub filter: GoldenFilter,
    pub applications: Vec<GoldenProfile>,
    pub pending_count: usize,
    pub verified_count: usize,
    pub rejected_count: usize,
    pub total_count: usize,
}

/// Looks up the user and resolves every role they currently hold
pub async fn resolve_viewer(store: &dyn CatalogStore, user_id: UserId) -> AppResult<Viewer> {
    store
        .find_user(user_id)
        .await?
        .ok_or(AppError::InvalidUser(user_id))?;
    let profile = store.role_profile(user_id).await?;
    Ok(Viewer {
        user_id,
        roles: profile.roles(),
    })
}

/// Activates the reviewer or content-creator role for a user
pub async fn grant_role(store: &dyn CatalogStore, user_id: UserId, role: Role) -> AppResult<Viewer> {
    if !matches!(role, Role::Reviewer | Role::ContentCreator) {
        return Err(AppError::InvalidInput(format!(
            "Role {:?} cannot be granted directly",
            role
        )));
    }

    let viewer = resolve_viewer(store, user_id).await?;
    if viewer.has(role) {
        return Err(AppError::Conflict(format!(
            "User {} already holds role {:?}",
            user_id, role
        )));
    }

    store.grant_role(user_id, role).await?;
    tracing::info!(user_id, role = ?role, "Role granted");
    resolve_viewer(store, user_id).await
}

pub async fn apply_for_golden(
    store: &dyn CatalogStore,
    user_id: UserId,
    application: &GoldenApplication,
) -> AppResult<GoldenProfile> {
    if application.profession.trim().is_empty() {
        return Err(AppError::InvalidInput("Profession is required".to_string()));
    }
    if application.years_of_experience < 0 {
        return Err(AppError::InvalidInput(
            "Years of experience cannot be negative".to_string(),
        ));
    }

    store
        .find_user(user_id)
        .await?
        .ok_or(AppError::InvalidUser(user_id))?;

    if let Some(existing) = store.golden_profile(user_id).await? {
        match existing.verification_status {
            VerificationStatus::Pending => {
                return Err(AppError::Conflict(
                    "Golden application already pending".to_string(),
                ))
            }
            VerificationStatus::Verified => {
                return Err(AppError::Conflict("User is already verified".to_string()))
            }
            VerificationStatus::Rejected => {}
        }
    }

    let profile = store.save_golden_application(user_id, application).await?;
    tracing::info!(user_id, profession = %profile.profession, "Golden application submitted");
    Ok(profile)
}

pub async fn list_golden_applications(
    store: &dyn CatalogStore,
    filter: GoldenFilter,
) -> AppResult<GoldenApplicationListing> {
    let profiles = store.golden_profiles().await?;
    let count = |status: VerificationStatus| {
        profiles
            .iter()
            .filter(|p| p.verification_status == status)
            .count()
    };
    let pending_count = count(VerificationStatus::Pending);
    let verified_count = count(VerificationStatus::Verified);
    let rejected_count = count(VerificationStatus::Rejected);
    let total_count = profiles.len();

    let applications = profiles
        .into_iter()
        .filter(|p| filter.accepts(p))
        .collect();
    Ok(GoldenApplicationListing {
        filter,
        applications,
        pending_count,
        verified_count,
        rejected_count,
        total_count,
    })
}

/// Decides a pending application. A decided application is final until the
/// user reapplies.
pub async fn review_golden_application(
    store: &dyn CatalogStore,
    admin_id: UserId,
    user_id: UserId,
    decision: GoldenDecision,
    notes: Option<String>,
) -> AppResult<GoldenProfile> {
    let admin = resolve_viewer(store, admin_id).await?;
    if !admin.is_admin() {
        return Err(AppError::Forbidden(
            "Only admins can verify golden users".to_string(),
        ));
    }

    let profile = store
        .golden_profile(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No golden application for user {}", user_id)))?;
    if profile.verification_status != VerificationStatus::Pending {
        return Err(AppError::Conflict(
            "Golden application has already been decided".to_string(),
        ));
    }

    let update = match decision {
        GoldenDecision::Verify => GoldenStatusUpdate {
            status: VerificationStatus::Verified,
            notes,
            verified_at: Some(Utc::now()),
            verified_by: Some(admin_id),
        },
        GoldenDecision::Reject => GoldenStatusUpdate {
            status: VerificationStatus::Rejected,
            notes,
            verified_at: None,
            verified_by: None,
        },
    };

    let updated = store
        .set_golden_status(user_id, &update)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No golden application for user {}", user_id)))?;
    tracing::info!(admin_id, user_id, decision = ?decision, "Golden application reviewed");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    fn application() -> GoldenApplication {
        GoldenApplication {
            profession: "Film critic".to_string(),
            years_of_experience: 12,
            company: Some("Daily Reel".to_string()),
            notable_works: None,
        }
    }

    #[tokio::test]
    async fn test_unknown_user_cannot_be_resolved() {
        let store = MemoryStore::new();
        assert!(matches!(
            resolve_viewer(&store, 7).await,
            Err(AppError::InvalidUser(7))
        ));
    }

    #[tokio::test]
    async fn test_grant_role_once() {
        let store = MemoryStore::new();
        let user = store.insert_user("writer").await;

        let viewer = grant_role(&store, user.id, Role::Reviewer).await.unwrap();
        assert_eq!(viewer.roles, vec![Role::RegularUser, Role::Reviewer]);

        assert!(matches!(
            grant_role(&store, user.id, Role::Reviewer).await,
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            grant_role(&store, user.id, Role::Admin).await,
            Err(AppError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_golden_lifecycle() {
        let store = MemoryStore::new();
        let admin = store.insert_admin("root").await;
        let user = store.insert_user("expert").await;

        apply_for_golden(&store, user.id, &application()).await.unwrap();
        assert!(matches!(
            apply_for_golden(&store, user.id, &application()).await,
            Err(AppError::Conflict(_))
        ));
        assert!(!resolve_viewer(&store, user.id).await.unwrap().has(Role::GoldenUser));

        let verified = review_golden_application(
            &store,
            admin.id,
            user.id,
            GoldenDecision::Verify,
            Some("Checked credits".to_string()),
        )
        .await
        .unwrap();
        assert_eq!(verified.verification_status, VerificationStatus::Verified);
        assert_eq!(verified.verified_by, Some(admin.id));
        assert!(verified.verified_at.is_some());
        assert!(resolve_viewer(&store, user.id).await.unwrap().has(Role::GoldenUser));
    }

    #[tokio::test]
    async fn test_rejected_applicant_may_reapply() {
        let store = MemoryStore::new();
        let admin = store.insert_admin("root").await;
        let user = store.insert_user("hopeful").await;

        apply_for_golden(&store, user.id, &application()).await.unwrap();
        review_golden_application(&store, admin.id, user.id, GoldenDecision::Reject, None)
            .await
            .unwrap();

        let again = apply_for_golden(&store, user.id, &application()).await.unwrap();
        assert_eq!(again.verification_status, VerificationStatus::Pending);
        assert!(again.verified_by.is_none());
    }

    #[tokio::test]
    async fn test_decided_application_cannot_be_redecided() {
        let store = MemoryStore::new();
        let admin = store.insert_admin("root").await;
        let user = store.insert_user("expert").await;
        apply_for_golden(&store, user.id, &application()).await.unwrap();
        review_golden_application(&store, admin.id, user.id, GoldenDecision::Verify, None)
            .await
            .unwrap();

        assert!(matches!(
            review_golden_application(&store, admin.id, user.id, GoldenDecision::Reject, None)
                .await,
            Err(AppError::Conflict(_))
        ));
        let profile = store.golden_profile(user.id).await.unwrap().unwrap();
        assert_eq!(profile.verification_status, VerificationStatus::Verified);
    }

    #[tokio::test]
    async fn test_golden_listing_filters_and_counts() {
        let store = MemoryStore::new();
        let admin = store.insert_admin("root").await;
        let waiting = store.insert_user("waiting").await;
        let approved = store.insert_user("approved").await;
        let declined = store.insert_user("declined").await;
        for user in [&waiting, &approved, &declined] {
            apply_for_golden(&store, user.id, &application()).await.unwrap();
        }
        review_golden_application(&store, admin.id, approved.id, GoldenDecision::Verify, None)
            .await
            .unwrap();
        review_golden_application(&store, admin.id, declined.id, GoldenDecision::Reject, None)
            .await
            .unwrap();

        let pending = list_golden_applications(&store, GoldenFilter::default())
            .await
            .unwrap();
        assert_eq!(pending.filter, GoldenFilter::Pending);
        assert_eq!(
            pending.applications.iter().map(|p| p.user_id).collect::<Vec<_>>(),
            vec![waiting.id]
        );
        assert_eq!(pending.pending_count, 1);
        assert_eq!(pending.verified_count, 1);
        assert_eq!(pending.rejected_count, 1);
        assert_eq!(pending.total_count, 3);

        let rejected = list_golden_applications(&store, GoldenFilter::Rejected)
            .await
            .unwrap();
        assert_eq!(rejected.applications[0].user_id, declined.id);

        let all = list_golden_applications(&store, GoldenFilter::All).await.unwrap();
        let ids: Vec<UserId> = all.applications.iter().map(|p| p.user_id).collect();
        assert_eq!(ids, vec![declined.id, approved.id, waiting.id]);
    }

    #[tokio::test]
    async fn test_only_admins_decide() {
        let store = MemoryStore::new();
        let user = store.insert_user("expert").await;
        let peer = store.insert_user("peer").await;
        apply_for_golden(&store, user.id, &application()).await.unwrap();

        assert!(matches!(
            review_golden_application(&store, peer.id, user.id, GoldenDecision::Verify, None).await,
            Err(AppError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_blank_profession_rejected() {
        let store = MemoryStore::new();
        let user = store.insert_user("expert").await;
        let mut app = application();
        app.profession = "  ".to_string();
        assert!(matches!(
            apply_for_golden(&store, user.id, &app).await,
            Err(AppError::InvalidInput(_))
        ));
    }
}
