use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, error};

use crate::{auth::services::mask_email, config::MailConfig};

#[derive(Debug, Error)]
pub enum EmailDeliveryError {
    #[error("email request failed: {0}")]
    Request(String),
    #[error("email API request failed with status code {0}")]
    Status(u16),
}

#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), EmailDeliveryError>;
}

/// Mailgun HTTP API sender.
pub struct MailgunMailer {
    client: Client,
    api_url: String,
    domain: String,
    api_key: String,
}

impl MailgunMailer {
    pub fn new(cfg: &MailConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("build mail http client")?;
        Ok(Self {
            client,
            api_url: cfg.api_url.trim_end_matches('/').to_string(),
            domain: cfg.domain.clone(),
            api_key: cfg.api_key.clone(),
        })
    }
}

fn preview(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

#[async_trait]
impl Mailer for MailgunMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), EmailDeliveryError> {
        debug!(to = %mask_email(to), subject = %preview(subject, 20), "sending email");
        let from = format!("Postboard <mailgun@{}>", self.domain);
        let res = self
            .client
            .post(format!("{}/{}/messages", self.api_url, self.domain))
            .basic_auth("api", Some(&self.api_key))
            .form(&[("from", from.as_str()), ("to", to), ("subject", subject), ("text", body)])
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "email request failed");
                EmailDeliveryError::Request(e.to_string())
            })?;

        let status = res.status();
        if !status.is_success() {
            error!(%status, "email API rejected message");
            return Err(EmailDeliveryError::Status(status.as_u16()));
        }
        debug!(%status, "email accepted");
        Ok(())
    }
}

pub async fn send_user_registration_email(
    mailer: &dyn Mailer,
    email: &str,
    confirmation_url: &str,
) -> Result<(), EmailDeliveryError> {
    mailer
        .send(
            email,
            "Successfully signed up",
            &format!(
                "Hi {email}! You have successfully signed up to Postboard.\n\
                 Please confirm your email by clicking on the following link: {confirmation_url}"
            ),
        )
        .await
}

pub async fn send_image_ready_email(
    mailer: &dyn Mailer,
    email: &str,
    post_url: &str,
) -> Result<(), EmailDeliveryError> {
    mailer
        .send(
            email,
            "Image generation completed",
            &format!(
                "Hi {email}! Your image has been generated and added to your post. \
                 Please click on the following link to view it: {post_url}"
            ),
        )
        .await
}

pub async fn send_image_failed_email(
    mailer: &dyn Mailer,
    email: &str,
) -> Result<(), EmailDeliveryError> {
    mailer
        .send(
            email,
            "Error generating image",
            &format!(
                "Hi {email}! Unfortunately there was an error generating an image for your post."
            ),
        )
        .await
}
