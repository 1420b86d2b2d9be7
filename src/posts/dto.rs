use serde::{Deserialize, Serialize};

use crate::posts::repo_types::{Comment, PostSorting, PostWithLikes};

#[derive(Debug, Deserialize)]
pub struct PostIn {
    pub body: String,
}

/// `?prompt=` on post creation; present means "generate an image".
#[derive(Debug, Default, Deserialize)]
pub struct CreatePostQuery {
    pub prompt: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub sorting: PostSorting,
}

#[derive(Debug, Deserialize)]
pub struct CommentIn {
    pub body: String,
    pub post_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct LikeIn {
    pub post_id: i64,
}

#[derive(Debug, Serialize)]
pub struct PostWithComments {
    pub post: PostWithLikes,
    pub comments: Vec<Comment>,
}
