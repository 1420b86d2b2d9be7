use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{CommentIn, CreatePostQuery, LikeIn, ListQuery, PostIn, PostWithComments},
    repo_types::{Comment, Like, Post, PostWithLikes},
};
use crate::{
    auth::extractors::CurrentUser, error::ApiError, state::AppState,
    tasks::enrichment::{EnrichmentJob, EnrichmentOutcome},
};

pub fn post_routes() -> Router<AppState> {
    Router::new()
        .route("/post", get(list_posts).post(create_post))
        .route("/post/:id", get(get_post))
        .route("/post/:id/comment", get(list_comments))
        .route("/comment", post(create_comment))
        .route("/like", post(like_post))
}

async fn existing_post(state: &AppState, post_id: i64) -> Result<PostWithLikes, ApiError> {
    state.posts.find_post(post_id).await?.ok_or_else(|| {
        warn!(post_id, "post not found");
        ApiError::NotFound("Post not found".into())
    })
}

/// POST /post?prompt=...
///
/// Responds as soon as the row exists; the image is attached later by the
/// enrichment task.
#[instrument(skip(state, user, payload), fields(user_id = user.id))]
pub async fn create_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<CreatePostQuery>,
    Json(payload): Json<PostIn>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    let post = state.posts.create_post(&payload.body, user.id).await?;
    info!(post_id = post.id, "post created");

    if let Some(prompt) = query.prompt {
        let job = EnrichmentJob {
            email: user.email.clone(),
            post_id: post.id,
            post_url: format!("{}/post/{}", state.config.public_url, post.id),
            prompt,
        };
        let enricher = state.enricher.clone();
        state.tasks.spawn("image_enrichment", async move {
            match enricher.generate_and_add_to_post(job).await {
                EnrichmentOutcome::Enriched { image_url } => {
                    info!(%image_url, "enrichment finished")
                }
                EnrichmentOutcome::GenerationFailed(e) => {
                    warn!(error = %e, "enrichment finished without image")
                }
            }
        });
    }

    Ok((StatusCode::CREATED, Json(post)))
}

#[instrument(skip(state))]
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<PostWithLikes>>, ApiError> {
    Ok(Json(state.posts.list_posts(query.sorting).await?))
}

#[instrument(skip(state))]
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PostWithComments>, ApiError> {
    let post = existing_post(&state, id).await?;
    let comments = state.posts.comments_for_post(id).await?;
    Ok(Json(PostWithComments { post, comments }))
}

#[instrument(skip(state))]
pub async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    Ok(Json(state.posts.comments_for_post(id).await?))
}

#[instrument(skip(state, user, payload), fields(user_id = user.id, post_id = payload.post_id))]
pub async fn create_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CommentIn>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    existing_post(&state, payload.post_id).await?;
    let comment = state
        .posts
        .create_comment(&payload.body, payload.post_id, user.id)
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

#[instrument(skip(state, user, payload), fields(user_id = user.id, post_id = payload.post_id))]
pub async fn like_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<LikeIn>,
) -> Result<(StatusCode, Json<Like>), ApiError> {
    existing_post(&state, payload.post_id).await?;
    let like = state.posts.create_like(payload.post_id, user.id).await?;
    Ok((StatusCode::CREATED, Json(like)))
}
