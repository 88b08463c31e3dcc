pub mod command;
pub mod form;
pub mod json;

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;

use crate::cli::Mode;
use crate::config::RunConfig;
use crate::error::AttemptError;

/// What an attempt produced, ready for classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub output: String,
    /// Echo the output next to the credentials on success (command mode)
    pub show_output: bool,
}

/// Sends one login attempt and returns the raw text to classify.
#[async_trait]
pub trait Attempt: Send + Sync {
    async fn attempt(&self, username: &str, password: &str) -> Result<Response, AttemptError>;
}

pub fn build(cfg: &RunConfig) -> Result<Arc<dyn Attempt>> {
    let attempter: Arc<dyn Attempt> = match cfg.mode {
        Mode::Json => Arc::new(json::JsonAttempt::new(cfg, http_client(cfg)?)),
        Mode::Form => Arc::new(form::FormAttempt::new(cfg, http_client(cfg)?)?),
        Mode::Cmd => Arc::new(command::CommandAttempt::new(cfg)?),
    };
    Ok(attempter)
}

fn http_client(cfg: &RunConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(cfg.timeout)
        .danger_accept_invalid_certs(true)
        .build()
        .context("Failed to build HTTP client")
}
