use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;

use super::repo_types::{Comment, Like, Post, PostSorting, PostWithLikes};

#[async_trait]
pub trait PostRepository: Send + Sync + 'static {
    async fn create_post(&self, body: &str, user_id: i64) -> anyhow::Result<Post>;
    async fn find_post(&self, post_id: i64) -> anyhow::Result<Option<PostWithLikes>>;
    async fn list_posts(&self, sorting: PostSorting) -> anyhow::Result<Vec<PostWithLikes>>;
    /// Overwrites `image_url` in a single statement. Returns false when the
    /// post no longer exists.
    async fn set_image_url(&self, post_id: i64, image_url: &str) -> anyhow::Result<bool>;
    async fn create_comment(&self, body: &str, post_id: i64, user_id: i64)
        -> anyhow::Result<Comment>;
    async fn comments_for_post(&self, post_id: i64) -> anyhow::Result<Vec<Comment>>;
    async fn create_like(&self, post_id: i64, user_id: i64) -> anyhow::Result<Like>;
}

#[derive(Clone)]
pub struct PgPostRepository {
    db: PgPool,
}

impl PgPostRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

const SELECT_WITH_LIKES: &str = r#"
    SELECT p.id, p.body, p.user_id, p.image_url, COUNT(l.id) AS likes
      FROM posts p
      LEFT JOIN likes l ON l.post_id = p.id
"#;

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn create_post(&self, body: &str, user_id: i64) -> anyhow::Result<Post> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (body, user_id)
            VALUES ($1, $2)
            RETURNING id, body, user_id, image_url
            "#,
        )
        .bind(body)
        .bind(user_id)
        .fetch_one(&self.db)
        .await
        .context("insert post")?;
        Ok(post)
    }

    async fn find_post(&self, post_id: i64) -> anyhow::Result<Option<PostWithLikes>> {
        let sql = format!("{SELECT_WITH_LIKES} WHERE p.id = $1 GROUP BY p.id");
        let post = sqlx::query_as::<_, PostWithLikes>(&sql)
            .bind(post_id)
            .fetch_optional(&self.db)
            .await
            .with_context(|| format!("find post {post_id}"))?;
        Ok(post)
    }

    async fn list_posts(&self, sorting: PostSorting) -> anyhow::Result<Vec<PostWithLikes>> {
        let sql = format!(
            "{SELECT_WITH_LIKES} GROUP BY p.id ORDER BY {}",
            sorting.order_by()
        );
        let rows = sqlx::query_as::<_, PostWithLikes>(&sql)
            .fetch_all(&self.db)
            .await
            .context("list posts")?;
        Ok(rows)
    }

    async fn set_image_url(&self, post_id: i64, image_url: &str) -> anyhow::Result<bool> {
        let res = sqlx::query(r#"UPDATE posts SET image_url = $1 WHERE id = $2"#)
            .bind(image_url)
            .bind(post_id)
            .execute(&self.db)
            .await
            .with_context(|| format!("set image_url on post {post_id}"))?;
        Ok(res.rows_affected() > 0)
    }

    async fn create_comment(
        &self,
        body: &str,
        post_id: i64,
        user_id: i64,
    ) -> anyhow::Result<Comment> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (body, post_id, user_id)
            VALUES ($1, $2, $3)
            RETURNING id, body, post_id, user_id
            "#,
        )
        .bind(body)
        .bind(post_id)
        .bind(user_id)
        .fetch_one(&self.db)
        .await
        .context("insert comment")?;
        Ok(comment)
    }

    async fn comments_for_post(&self, post_id: i64) -> anyhow::Result<Vec<Comment>> {
        let rows = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, body, post_id, user_id
              FROM comments
             WHERE post_id = $1
             ORDER BY id ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.db)
        .await
        .context("list comments by post")?;
        Ok(rows)
    }

    async fn create_like(&self, post_id: i64, user_id: i64) -> anyhow::Result<Like> {
        let like = sqlx::query_as::<_, Like>(
            r#"
            INSERT INTO likes (post_id, user_id)
            VALUES ($1, $2)
            RETURNING id, post_id, user_id
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .fetch_one(&self.db)
        .await
        .context("insert like")?;
        Ok(like)
    }
}
