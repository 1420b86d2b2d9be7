use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use crate::{
    auth::{
        jwt::JwtKeys,
        repo::{PgUserRepository, UserRepository},
    },
    config::AppConfig,
    posts::repo::{PgPostRepository, PostRepository},
    storage::{Storage, StorageClient},
    tasks::{
        email::{MailgunMailer, Mailer},
        enrichment::Enricher,
        generator::DeepAiGenerator,
        BackgroundTasks,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub jwt: JwtKeys,
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub storage: Arc<dyn StorageClient>,
    pub mailer: Arc<dyn Mailer>,
    pub enricher: Arc<Enricher>,
    pub tasks: BackgroundTasks,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
            tracing::warn!(error = %e, "migration failed; continuing with existing schema");
        }

        let storage =
            Arc::new(Storage::new(&config.storage, "us-east-1").await?) as Arc<dyn StorageClient>;

        let users: Arc<dyn UserRepository> = Arc::new(PgUserRepository::new(db.clone()));
        let posts: Arc<dyn PostRepository> = Arc::new(PgPostRepository::new(db));
        let mailer: Arc<dyn Mailer> = Arc::new(MailgunMailer::new(&config.mail)?);
        let generator = Arc::new(DeepAiGenerator::new(&config.generator)?);
        let enricher = Arc::new(Enricher::new(generator, posts.clone(), mailer.clone()));

        Ok(Self {
            jwt: JwtKeys::new(&config.jwt),
            config,
            users,
            posts,
            storage,
            mailer,
            enricher,
            tasks: BackgroundTasks::new(),
        })
    }
}
