use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use super::{Attempt, Response};
use crate::config::RunConfig;
use crate::error::AttemptError;

/// Runs a local command built from a template such as
/// `mysql -u username -ppassword -e quit`, where the username and password
/// tokens are replaced per attempt. stdout and stderr are captured together.
pub struct CommandAttempt {
    program: String,
    args: Vec<String>,
    username_token: String,
    password_token: String,
    timeout: Duration,
}

impl CommandAttempt {
    pub fn new(cfg: &RunConfig) -> Result<Self> {
        let mut words = cfg.target.split_whitespace().map(str::to_string);
        let program = words
            .next()
            .ok_or_else(|| anyhow!("Command template must not be empty (-t)"))?;
        Ok(Self {
            program,
            args: words.collect(),
            username_token: cfg.username_field.clone(),
            password_token: cfg.password_field.clone(),
            timeout: cfg.timeout,
        })
    }

    fn render(&self, word: &str, username: &str, password: &str) -> String {
        let mut subs = [
            (self.username_token.as_str(), username),
            (self.password_token.as_str(), password),
        ];
        // Longest token first, so "user" can't eat the start of "userpass".
        subs.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        substitute(word, &subs)
    }

    async fn run(&self, program: &str, args: &[String]) -> Result<(std::process::ExitStatus, String), AttemptError> {
        let mut command = Command::new(program);
        command.args(args).stdin(Stdio::null()).kill_on_drop(true);
        let child = command.output();

        let output = match tokio::time::timeout(self.timeout, child).await {
            Ok(result) => result.map_err(|source| AttemptError::Spawn {
                program: program.to_string(),
                source,
            })?,
            Err(_) => return Err(AttemptError::Timeout(self.timeout)),
        };

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok((output.status, text))
    }
}

/// Replace every token in one pass; inserted values are never re-scanned.
fn substitute(word: &str, subs: &[(&str, &str)]) -> String {
    match subs.split_first() {
        None => word.to_string(),
        Some((&(token, _), rest)) if token.is_empty() => substitute(word, rest),
        Some((&(token, value), rest)) => word
            .split(token)
            .map(|piece| substitute(piece, rest))
            .collect::<Vec<_>>()
            .join(value),
    }
}

#[async_trait]
impl Attempt for CommandAttempt {
    async fn attempt(&self, username: &str, password: &str) -> Result<Response, AttemptError> {
        let args: Vec<String> = self
            .args
            .iter()
            .map(|arg| self.render(arg, username, password))
            .collect();
        let program = self.render(&self.program, username, password);
        let (status, output) = self.run(&program, &args).await?;
        if !status.success() {
            return Err(AttemptError::ExitStatus { status, output });
        }
        Ok(Response {
            output,
            show_output: true,
        })
    }
}
