use crate::{
    db::CatalogStore,
    error::{AppError, AppResult},
    models::{ContentId, ContentSummary, OttAvailability, OttListing, OttQuery, Role, UserId},
};

use super::roles::resolve_viewer;

/// Items streaming somewhere, optionally narrowed to one platform or to free rows
pub async fn browse(store: &dyn CatalogStore, query: OttQuery) -> AppResult<Vec<ContentSummary>> {
    store.ott_browse(&query).await
}

pub async fn availability(
    store: &dyn CatalogStore,
    content_id: ContentId,
) -> AppResult<Vec<OttAvailability>> {
    store
        .get_content(content_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Content {} not found", content_id)))?;
    store.ott_for_content(content_id).await
}

/// Records where an item streams. Content creators and admins only.
pub async fn set_availability(
    store: &dyn CatalogStore,
    user_id: UserId,
    content_id: ContentId,
    listing: OttListing,
) -> AppResult<OttAvailability> {
    let viewer = resolve_viewer(store, user_id).await?;
    if !viewer.has(Role::ContentCreator) && !viewer.is_admin() {
        return Err(AppError::Forbidden(
            "Only content creators can manage streaming availability".to_string(),
        ));
    }
    store
        .get_content(content_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Content {} not found", content_id)))?;

    let listing = OttListing {
        watch_url: listing
            .watch_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty()),
        ..listing
    };
    let availability = store.set_ott_availability(content_id, &listing).await?;
    tracing::info!(
        user_id,
        content_id,
        platform = ?availability.platform_name,
        is_free = availability.is_free,
        "Streaming availability saved"
    );
    Ok(availability)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{Genre, NewContent, OttPlatform};
    use chrono::NaiveDate;

    fn listing(platform: OttPlatform, is_free: bool) -> OttListing {
        OttListing {
            platform,
            watch_url: None,
            is_free,
        }
    }

    async fn setup() -> (MemoryStore, UserId, [ContentId; 3]) {
        let store = MemoryStore::new();
        let creator = store.insert_user("creator").await.id;
        store.grant_role(creator, Role::ContentCreator).await.unwrap();
        let date = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        let mut ids = [0; 3];
        for (slot, title) in ids.iter_mut().zip(["Delhi Crime", "Panchayat", "Unlisted"]) {
            *slot = store
                .insert_content(NewContent::new(title, Genre::Drama, date))
                .await
                .id;
        }
        (store, creator, ids)
    }

    #[tokio::test]
    async fn test_browse_by_platform_and_price() {
        let (store, creator, [crime, panchayat, _]) = setup().await;
        set_availability(&store, creator, crime, listing(OttPlatform::Netflix, false))
            .await
            .unwrap();
        set_availability(&store, creator, panchayat, listing(OttPlatform::AmazonPrime, true))
            .await
            .unwrap();
        set_availability(&store, creator, panchayat, listing(OttPlatform::Netflix, false))
            .await
            .unwrap();

        let ids = |items: Vec<ContentSummary>| items.iter().map(|s| s.id).collect::<Vec<_>>();

        let all = browse(&store, OttQuery::default()).await.unwrap();
        assert_eq!(ids(all), vec![crime, panchayat]);

        let netflix = OttQuery {
            platform: Some(OttPlatform::Netflix),
            free_only: false,
        };
        assert_eq!(ids(browse(&store, netflix).await.unwrap()), vec![crime, panchayat]);

        let free = OttQuery {
            platform: None,
            free_only: true,
        };
        assert_eq!(ids(browse(&store, free).await.unwrap()), vec![panchayat]);

        let free_on_netflix = OttQuery {
            platform: Some(OttPlatform::Netflix),
            free_only: true,
        };
        assert!(browse(&store, free_on_netflix).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_only_creators_and_admins_manage_availability() {
        let (store, _, [crime, _, _]) = setup().await;
        let viewer = store.insert_user("viewer").await.id;
        let admin = store.insert_admin("admin").await.id;

        assert!(matches!(
            set_availability(&store, viewer, crime, listing(OttPlatform::Zee5, true)).await,
            Err(AppError::Forbidden(_))
        ));
        let saved = set_availability(
            &store,
            admin,
            crime,
            OttListing {
                watch_url: Some("  ".to_string()),
                ..listing(OttPlatform::Zee5, true)
            },
        )
        .await
        .unwrap();
        assert_eq!(saved.watch_url, None);
        assert_eq!(availability(&store, crime).await.unwrap(), vec![saved]);

        assert!(matches!(
            set_availability(&store, admin, 999, listing(OttPlatform::Zee5, true)).await,
            Err(AppError::NotFound(_))
        ));
    }
}
