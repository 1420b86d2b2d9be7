use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Form, Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        claims::TokenKind,
        dto::{Detail, RegisterRequest, TokenRequest, TokenResponse},
        jwt::JwtKeys,
        password::hash_password,
        repo::CreateUserError,
        services::{authenticate, is_valid_email, mask_email},
    },
    error::ApiError,
    state::AppState,
    tasks::email::send_user_registration_email,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/token", post(login))
        .route("/confirm/:token", get(confirm_email))
}

const MIN_PASSWORD_CHARS: usize = 8;

fn email_taken() -> ApiError {
    ApiError::BadRequest("A user with that email already exists".into())
}

#[instrument(skip(state, payload), fields(email = %mask_email(&payload.email)))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Detail>), ApiError> {
    if !is_valid_email(&payload.email) {
        warn!("invalid email");
        return Err(ApiError::BadRequest("Invalid email".into()));
    }

    if payload.password.chars().count() < MIN_PASSWORD_CHARS {
        warn!("password too short");
        return Err(ApiError::BadRequest("Password too short".into()));
    }

    if state.users.find_by_email(&payload.email).await?.is_some() {
        warn!("email already registered");
        return Err(email_taken());
    }

    let hash = hash_password(&payload.password).map_err(anyhow::Error::new)?;
    // A concurrent registration can still win between the lookup and here.
    let user = match state.users.create(&payload.email, &hash).await {
        Ok(user) => user,
        Err(CreateUserError::Duplicate) => {
            warn!("email registered concurrently");
            return Err(email_taken());
        }
        Err(CreateUserError::Other(e)) => return Err(e.into()),
    };

    let token = state.jwt.sign_confirmation(&user.email).map_err(|e| {
        error!(error = %e, "sign confirmation token failed");
        anyhow::Error::new(e)
    })?;
    let confirmation_url = format!("{}/confirm/{token}", state.config.public_url);

    let mailer = state.mailer.clone();
    let email = user.email.clone();
    state.tasks.spawn("registration_email", async move {
        if let Err(e) = send_user_registration_email(mailer.as_ref(), &email, &confirmation_url).await {
            error!(error = %e, "failed to send registration email");
        }
    });

    info!(user_id = user.id, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(Detail::new("User created. Please confirm your email.")),
    ))
}

#[instrument(skip(state, keys, form), fields(email = %mask_email(&form.username)))]
pub async fn login(
    State(state): State<AppState>,
    State(keys): State<JwtKeys>,
    Form(form): Form<TokenRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = authenticate(state.users.as_ref(), &form.username, &form.password).await?;

    let access_token = keys.sign_access(&user.email).map_err(|e| {
        error!(error = %e, "sign access token failed");
        anyhow::Error::new(e)
    })?;

    info!(user_id = user.id, "user logged in");
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
    }))
}

#[instrument(skip_all)]
pub async fn confirm_email(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<Detail>, ApiError> {
    let email = state
        .jwt
        .subject_for(&token, TokenKind::Confirmation)
        .map_err(|e| {
            warn!(error = %e, "confirmation token rejected");
            ApiError::Unauthorized(e.to_string())
        })?;

    if !state.users.confirm(&email).await? {
        warn!(email = %mask_email(&email), "confirmation for unknown user");
        return Err(ApiError::Unauthorized(
            "Could not find user for this token".into(),
        ));
    }

    info!(email = %mask_email(&email), "email confirmed");
    Ok(Json(Detail::new("User confirmed")))
}
