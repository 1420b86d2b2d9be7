use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct Post {
    pub id: i64,
    pub body: String,
    pub user_id: i64,
    pub image_url: Option<String>, // set once by the enrichment task
}

/// Post row joined with its like count.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct PostWithLikes {
    pub id: i64,
    pub body: String,
    pub user_id: i64,
    pub image_url: Option<String>,
    pub likes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct Comment {
    pub id: i64,
    pub body: String,
    pub post_id: i64,
    pub user_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct Like {
    pub id: i64,
    pub post_id: i64,
    pub user_id: i64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PostSorting {
    #[default]
    New,
    Old,
    MostLikes,
}

impl PostSorting {
    pub(crate) fn order_by(self) -> &'static str {
        match self {
            PostSorting::New => "p.id DESC",
            PostSorting::Old => "p.id ASC",
            PostSorting::MostLikes => "likes DESC, p.id DESC",
        }
    }
}
