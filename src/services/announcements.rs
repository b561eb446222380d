// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use crate::db::{collections, list_as, to_fields, Direction, DocumentStore, Query};
use crate::error::{AppError, Result};
use crate::models::{Announcement, UserProfile};
use crate::time_utils::now_rfc3339;
use serde::Deserialize;
use std::sync::Arc;

const DEFAULT_AUTHOR: &str = "Admin";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnnouncementForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
}

#[derive(Clone)]
pub struct AnnouncementService {
    store: Arc<dyn DocumentStore>,
}

impl AnnouncementService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Newest first.
    pub async fn list(&self) -> Result<Vec<Announcement>> {
        let query = Query::all().order_by("createdAt", Direction::Descending);
        Ok(list_as(self.store.as_ref(), collections::ANNOUNCEMENTS, query).await?)
    }

    pub async fn create(
        &self,
        form: AnnouncementForm,
        author: Option<&UserProfile>,
    ) -> Result<Announcement> {
        let title = form.title.trim();
        let body = form.body.trim();
        if title.is_empty() || body.is_empty() {
            return Err(AppError::Validation(
                "Please fill in both title and body".to_string(),
            ));
        }

        let mut announcement = Announcement {
            title: title.to_string(),
            body: body.to_string(),
            created_at: now_rfc3339(),
            created_by: author
                .map(|p| p.display_name.trim())
                .filter(|n| !n.is_empty())
                .unwrap_or(DEFAULT_AUTHOR)
                .to_string(),
            ..Default::default()
        };
        announcement.id = self
            .store
            .add(collections::ANNOUNCEMENTS, to_fields(&announcement)?)
            .await?;

        tracing::info!(announcement_id = %announcement.id, "Announcement posted");
        Ok(announcement)
    }

    pub async fn delete(&self, announcement_id: &str) -> Result<()> {
        self.store
            .delete(collections::ANNOUNCEMENTS, announcement_id)
            .await?;
        tracing::info!(announcement_id, "Announcement deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    #[tokio::test]
    async fn test_create_trims_and_defaults_author() {
        let service = AnnouncementService::new(Arc::new(MemoryStore::new()));
        let created = service
            .create(
                AnnouncementForm {
                    title: "  Closed Monday ".to_string(),
                    body: "Holiday hours".to_string(),
                },
                None,
            )
            .await
            .unwrap();
        assert_eq!(created.title, "Closed Monday");
        assert_eq!(created.created_by, "Admin");

        let listed = service.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, created.id);
    }

    #[tokio::test]
    async fn test_blank_body_rejected() {
        let service = AnnouncementService::new(Arc::new(MemoryStore::new()));
        let err = service
            .create(
                AnnouncementForm {
                    title: "Hi".to_string(),
                    body: "   ".to_string(),
                },
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
