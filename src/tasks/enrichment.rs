use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use super::{
    email::{self, Mailer},
    generator::{ApiResponseError, ImageGenerator},
};
use crate::posts::repo::PostRepository;

/// Everything captured from the request that created the post.
#[derive(Debug, Clone)]
pub struct EnrichmentJob {
    pub email: String,
    pub post_id: i64,
    /// Link sent in the success email.
    pub post_url: String,
    pub prompt: String,
}

#[derive(Debug)]
pub enum EnrichmentOutcome {
    Enriched { image_url: String },
    GenerationFailed(ApiResponseError),
}

/// Post-creation image pipeline: generate, attach, notify.
pub struct Enricher {
    generator: Arc<dyn ImageGenerator>,
    posts: Arc<dyn PostRepository>,
    mailer: Arc<dyn Mailer>,
}

impl Enricher {
    pub fn new(
        generator: Arc<dyn ImageGenerator>,
        posts: Arc<dyn PostRepository>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            generator,
            posts,
            mailer,
        }
    }

    /// Never fails: every error ends up in the log and, for the owner, in an
    /// email. The post row is only touched when generation succeeded.
    #[instrument(skip(self, job), fields(post_id = job.post_id))]
    pub async fn generate_and_add_to_post(&self, job: EnrichmentJob) -> EnrichmentOutcome {
        let image = match self.generator.generate(&job.prompt).await {
            Ok(image) => image,
            Err(e) => {
                if e.is_malformed() {
                    error!(error = %e, "image generation returned an unreadable response");
                } else {
                    error!(error = %e, "image generation request failed");
                }
                let sent = email::send_image_failed_email(self.mailer.as_ref(), &job.email).await;
                if let Err(mail_err) = sent {
                    error!(error = %mail_err, "failed to send generation failure email");
                }
                return EnrichmentOutcome::GenerationFailed(e);
            }
        };

        match self.posts.set_image_url(job.post_id, &image.output_url).await {
            Ok(true) => info!(image_url = %image.output_url, "image attached to post"),
            Ok(false) => warn!("post disappeared before image could be attached"),
            Err(e) => error!(error = %format!("{e:#}"), "failed to attach image to post"),
        }

        let sent =
            email::send_image_ready_email(self.mailer.as_ref(), &job.email, &job.post_url).await;
        if let Err(e) = sent {
            error!(error = %e, "failed to send image ready email");
        }

        EnrichmentOutcome::Enriched {
            image_url: image.output_url,
        }
    }
}
