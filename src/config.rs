use anyhow::{anyhow, Context, Result};
use std::time::Duration;
use url::Url;

use crate::cli::{Cli, Mode};
use crate::modules::creds::classify::FailureMarkers;

/// Everything a run needs, validated once before any attempt is sent.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub target: String,
    pub usernames_path: String,
    pub passwords_path: String,
    pub mode: Mode,
    pub username_field: String,
    pub password_field: String,
    pub workers: usize,
    /// Extra `key=value` body fields, in the order given
    pub extra_body: Vec<(String, String)>,
    pub markers: FailureMarkers,
    pub verbose: bool,
    pub timeout: Duration,
    pub interval: Duration,
}

impl RunConfig {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        if cli.usernames.trim().is_empty() {
            return Err(anyhow!("Usernames file must be specified (-u)"));
        }
        if cli.passwords.trim().is_empty() {
            return Err(anyhow!("Passwords file must be specified (-p)"));
        }

        let markers = FailureMarkers::parse(&cli.failure_text)?;

        let extra_body = match cli.mode {
            Mode::Json => parse_extra_body(&cli.extra_body, ',')?,
            Mode::Form => parse_extra_body(&cli.extra_body, '&')?,
            Mode::Cmd => Vec::new(),
        };

        match cli.mode {
            Mode::Json | Mode::Form => {
                Url::parse(&cli.target)
                    .with_context(|| format!("Invalid target URL '{}'", cli.target))?;
            }
            Mode::Cmd => {
                if cli.target.split_whitespace().next().is_none() {
                    return Err(anyhow!("Command template must not be empty (-t)"));
                }
            }
        }

        Ok(Self {
            target: cli.target.clone(),
            usernames_path: cli.usernames.clone(),
            passwords_path: cli.passwords.clone(),
            mode: cli.mode,
            username_field: cli.username_field.clone(),
            password_field: cli.password_field.clone(),
            workers: cli.workers as usize,
            extra_body,
            markers,
            verbose: cli.verbose,
            timeout: Duration::from_secs(cli.timeout),
            interval: Duration::from_millis(cli.interval),
        })
    }
}

/// Parse `k1=v1<sep>k2=v2`. The value is everything after the first '='.
pub fn parse_extra_body(raw: &str, sep: char) -> Result<Vec<(String, String)>> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    raw.split(sep)
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let (key, value) = segment
                .split_once('=')
                .ok_or_else(|| anyhow!("Extra body field '{}' is not key=value", segment))?;
            if key.is_empty() {
                return Err(anyhow!("Extra body field '{}' has an empty key", segment));
            }
            Ok((key.to_string(), value.to_string()))
        })
        .collect()
}
