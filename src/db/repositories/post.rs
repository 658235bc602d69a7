use anyhow::{Context, Result};
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::entities::posts;
use crate::models::post::{NewPost, Post, PostFilter};

impl From<posts::Model> for Post {
    fn from(model: posts::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            content: model.content,
            tag: model.tag,
            slug: model.slug,
            author_id: model.author_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

pub struct PostRepository {
    conn: DatabaseConnection,
}

impl PostRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn insert(&self, post: &NewPost) -> Result<Post> {
        let active = posts::ActiveModel {
            title: Set(post.title.clone()),
            content: Set(post.content.clone()),
            tag: Set(post.tag.clone()),
            slug: Set(post.slug.clone()),
            author_id: Set(post.author_id),
            created_at: Set(post.created_at),
            updated_at: Set(post.created_at),
            ..Default::default()
        };

        let model = active.insert(&self.conn).await?;
        Ok(Post::from(model))
    }

    pub async fn get(&self, id: i32) -> Result<Option<Post>> {
        let post = posts::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query post by ID")?;

        Ok(post.map(Post::from))
    }

    pub async fn get_by_title(&self, title: &str) -> Result<Option<Post>> {
        let post = posts::Entity::find()
            .filter(posts::Column::Title.eq(title))
            .one(&self.conn)
            .await
            .context("Failed to query post by title")?;

        Ok(post.map(Post::from))
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        let post = posts::Entity::find()
            .filter(posts::Column::Slug.eq(slug))
            .one(&self.conn)
            .await
            .context("Failed to query post by slug")?;

        Ok(post.map(Post::from))
    }

    pub async fn list(&self, filter: &PostFilter) -> Result<Vec<Post>> {
        let rows = posts::Entity::find()
            .filter(Self::condition(filter))
            .order_by_asc(posts::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list posts")?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    /// Persist the mutable fields of an existing post.
    ///
    /// Only title, content, tag, slug and `updated_at` are written; the id,
    /// author and creation time of the row are left untouched.
    pub async fn update(&self, post: &Post) -> Result<Post> {
        let active = posts::ActiveModel {
            id: sea_orm::Unchanged(post.id),
            title: Set(post.title.clone()),
            content: Set(post.content.clone()),
            tag: Set(post.tag.clone()),
            slug: Set(post.slug.clone()),
            updated_at: Set(post.updated_at),
            ..Default::default()
        };

        let model = active.update(&self.conn).await?;
        Ok(Post::from(model))
    }

    fn condition(filter: &PostFilter) -> Condition {
        let mut cond = Condition::all();

        if let Some(title) = PostFilter::non_empty(filter.title.as_deref()) {
            cond = cond.add(Self::contains_ci(posts::Column::Title, title));
        }
        if let Some(content) = PostFilter::non_empty(filter.content.as_deref()) {
            cond = cond.add(Self::contains_ci(posts::Column::Content, content));
        }
        if let Some(tag) = PostFilter::non_empty(filter.tag.as_deref()) {
            cond = cond.add(Self::contains_ci(posts::Column::Tag, tag));
        }
        if let Some(slug) = PostFilter::non_empty(filter.slug.as_deref()) {
            cond = cond.add(posts::Column::Slug.eq(slug));
        }
        if let Some(author_id) = filter.author_id {
            cond = cond.add(posts::Column::AuthorId.eq(author_id));
        }
        if let Some(after) = filter.created_after {
            cond = cond.add(posts::Column::CreatedAt.gte(after));
        }
        if let Some(before) = filter.created_before {
            cond = cond.add(posts::Column::CreatedAt.lte(before));
        }
        if let Some(after) = filter.updated_after {
            cond = cond.add(posts::Column::UpdatedAt.gte(after));
        }
        if let Some(before) = filter.updated_before {
            cond = cond.add(posts::Column::UpdatedAt.lte(before));
        }

        cond
    }

    /// `lower(column) LIKE %needle%` with LIKE wildcards in the needle escaped.
    fn contains_ci(column: posts::Column, needle: &str) -> sea_orm::sea_query::SimpleExpr {
        let escaped = needle
            .to_lowercase()
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");

        Expr::expr(Func::lower(Expr::col(column)))
            .like(LikeExpr::new(format!("%{escaped}%")).escape('\\'))
    }
}
