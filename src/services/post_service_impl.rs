//! `SeaORM` implementation of the `PostService` trait.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::db::{Store, unique_violation};
use crate::domain::{CallerIdentity, can_edit};
use crate::models::post::{NewPost, Post, PostChanges, PostDraft, PostFilter, slugify};
use crate::services::post_service::{PostError, PostService};

const MAX_WRITE_ATTEMPTS: usize = 5;

pub struct SeaOrmPostService {
    store: Store,
}

impl SeaOrmPostService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Picks `base`, or `base-2`, `base-3`, ... when another post already
    /// holds it. A post keeps its own slug.
    async fn available_slug(
        &self,
        base: Option<String>,
        own_id: Option<i32>,
    ) -> Result<Option<String>, PostError> {
        let Some(base) = base else {
            return Ok(None);
        };

        let mut candidate = base.clone();
        let mut n = 2;
        while let Some(other) = self.store.get_post_by_slug(&candidate).await? {
            if Some(other.id) == own_id {
                break;
            }
            candidate = format!("{base}-{n}");
            n += 1;
        }

        Ok(Some(candidate))
    }
}

/// Unique column a failed write collided with.
#[derive(Debug, PartialEq, Eq)]
enum UniqueColumn {
    Title,
    Slug,
}

fn violated_constraint(err: &anyhow::Error) -> Option<UniqueColumn> {
    let msg = unique_violation(err)?;
    if msg.contains("slug") {
        Some(UniqueColumn::Slug)
    } else {
        Some(UniqueColumn::Title)
    }
}

#[async_trait]
impl PostService for SeaOrmPostService {
    async fn create(&self, caller: &CallerIdentity, draft: PostDraft) -> Result<Post, PostError> {
        let draft = draft.sanitized();
        draft.validate().map_err(PostError::Validation)?;

        if self.store.post_title_exists(&draft.title).await? {
            return Err(PostError::DuplicateTitle(draft.title));
        }

        info!(username = %caller.username, "Creating post");

        let base_slug = slugify(&draft.title);
        let mut new_post = NewPost {
            slug: None,
            title: draft.title,
            content: draft.content,
            tag: draft.tag,
            author_id: caller.id,
            created_at: Utc::now(),
        };

        // The pre-checks can race a concurrent writer; the unique
        // constraints decide. A lost slug is re-picked, a lost title is final.
        for _ in 0..MAX_WRITE_ATTEMPTS {
            new_post.slug = self.available_slug(base_slug.clone(), None).await?;

            match self.store.insert_post(&new_post).await {
                Ok(post) => {
                    metrics::counter!("posts_created_total").increment(1);
                    info!(post_id = post.id, author_id = post.author_id, "Post created");
                    return Ok(post);
                }
                Err(e) => match violated_constraint(&e) {
                    Some(UniqueColumn::Slug) => {
                        debug!(slug = ?new_post.slug, "Slug taken concurrently, retrying");
                    }
                    Some(UniqueColumn::Title) => {
                        return Err(PostError::DuplicateTitle(new_post.title));
                    }
                    None => return Err(PostError::Database(e.to_string())),
                },
            }
        }

        Err(PostError::Internal(format!(
            "No free slug for title after {MAX_WRITE_ATTEMPTS} attempts"
        )))
    }

    async fn find(&self, id: i32) -> Result<Post, PostError> {
        self.store
            .get_post(id)
            .await?
            .ok_or(PostError::NotFound(id))
    }

    async fn list(&self, filter: &PostFilter) -> Result<Vec<Post>, PostError> {
        let posts = self.store.list_posts(filter).await?;
        info!(count = posts.len(), "Listed posts");
        Ok(posts)
    }

    async fn update(
        &self,
        caller: &CallerIdentity,
        id: i32,
        changes: PostChanges,
    ) -> Result<Post, PostError> {
        let mut post = self.find(id).await?;

        if !can_edit(caller, post.author_id) {
            warn!(
                username = %caller.username,
                post_id = id,
                "User tried to edit post without permission"
            );
            return Err(PostError::NotPermitted { action: "edit" });
        }

        let changes = changes.sanitized();
        changes.validate().map_err(PostError::Validation)?;

        if changes.title != post.title
            && let Some(other) = self.store.get_post_by_title(&changes.title).await?
            && other.id != post.id
        {
            return Err(PostError::DuplicateTitle(changes.title));
        }

        let base_slug = slugify(&changes.title);
        post.title = changes.title;
        if let Some(content) = changes.content {
            post.content = content;
        }
        post.tag = changes.tag;
        post.updated_at = Utc::now();

        for _ in 0..MAX_WRITE_ATTEMPTS {
            post.slug = self.available_slug(base_slug.clone(), Some(id)).await?;

            match self.store.update_post(&post).await {
                Ok(saved) => {
                    metrics::counter!("posts_updated_total").increment(1);
                    info!(post_id = id, username = %caller.username, "Post updated");
                    return Ok(saved);
                }
                Err(e) => match violated_constraint(&e) {
                    Some(UniqueColumn::Slug) => {
                        debug!(slug = ?post.slug, "Slug taken concurrently, retrying");
                    }
                    Some(UniqueColumn::Title) => {
                        return Err(PostError::DuplicateTitle(post.title));
                    }
                    None => return Err(PostError::Database(e.to_string())),
                },
            }
        }

        Err(PostError::Internal(format!(
            "No free slug for title after {MAX_WRITE_ATTEMPTS} attempts"
        )))
    }

    async fn author_names(&self, posts: &[Post]) -> Result<HashMap<i32, String>, PostError> {
        let mut ids: Vec<i32> = posts.iter().map(|p| p.author_id).collect();
        ids.sort_unstable();
        ids.dedup();

        let users = self.store.get_users_by_ids(&ids).await?;
        Ok(users.into_iter().map(|u| (u.id, u.username)).collect())
    }
}
