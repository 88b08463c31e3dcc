use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{header, Client};
use url::Url;

use super::{Attempt, Response};
use crate::config::RunConfig;
use crate::error::AttemptError;

/// POSTs an urlencoded form. Referer and Origin are set to the target's
/// origin since many login handlers check them.
pub struct FormAttempt {
    client: Client,
    url: String,
    origin: String,
    username_field: String,
    password_field: String,
    extra_body: Vec<(String, String)>,
}

impl FormAttempt {
    pub fn new(cfg: &RunConfig, client: Client) -> Result<Self> {
        let parsed = Url::parse(&cfg.target)
            .with_context(|| format!("Invalid target URL '{}'", cfg.target))?;
        Ok(Self {
            client,
            url: cfg.target.clone(),
            origin: parsed.origin().ascii_serialization(),
            username_field: cfg.username_field.clone(),
            password_field: cfg.password_field.clone(),
            extra_body: cfg.extra_body.clone(),
        })
    }

    fn fields<'a>(&'a self, username: &'a str, password: &'a str) -> Vec<(&'a str, &'a str)> {
        let mut fields = vec![
            (self.username_field.as_str(), username),
            (self.password_field.as_str(), password),
        ];
        fields.extend(self.extra_body.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        fields
    }
}

#[async_trait]
impl Attempt for FormAttempt {
    async fn attempt(&self, username: &str, password: &str) -> Result<Response, AttemptError> {
        let response = self
            .client
            .post(&self.url)
            .header(header::REFERER, &self.origin)
            .header(header::ORIGIN, &self.origin)
            .form(&self.fields(username, password))
            .send()
            .await?;
        Ok(Response {
            output: response.text().await?,
            show_output: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Mode;
    use crate::modules::creds::classify::FailureMarkers;
    use crate::modules::transports::test_support::serve;
    use axum::{http::HeaderMap, routing::post, Router};
    use std::time::Duration;

    fn config(url: String) -> RunConfig {
        RunConfig {
            target: url,
            usernames_path: "u.txt".into(),
            passwords_path: "p.txt".into(),
            mode: Mode::Form,
            username_field: "login".into(),
            password_field: "pwd".into(),
            workers: 1,
            extra_body: vec![("csrf".into(), "a b".into())],
            markers: FailureMarkers::parse("invalid").unwrap(),
            verbose: false,
            timeout: Duration::from_secs(5),
            interval: Duration::from_millis(500),
        }
    }

    #[test]
    fn origin_drops_the_path() {
        let attempt =
            FormAttempt::new(&config("https://example.com:8443/a/login?x=1".into()), Client::new())
                .unwrap();
        assert_eq!(attempt.origin, "https://example.com:8443");
    }

    #[test]
    fn fields_keep_their_order() {
        let attempt = FormAttempt::new(&config("http://localhost/".into()), Client::new()).unwrap();
        assert_eq!(
            attempt.fields("bob", "y"),
            vec![("login", "bob"), ("pwd", "y"), ("csrf", "a b")]
        );
    }

    #[tokio::test]
    async fn sends_encoded_form_with_origin_headers() {
        let router = Router::new().route(
            "/login",
            post(|headers: HeaderMap, body: String| async move {
                let origin_ok = headers.get("origin").map(|v| v.as_bytes()) == headers.get("referer").map(|v| v.as_bytes())
                    && headers.get("origin").is_some();
                let form_ok = headers
                    .get("content-type")
                    .map(|v| v.as_bytes() == b"application/x-www-form-urlencoded")
                    .unwrap_or(false);
                if origin_ok && form_ok && body == "login=bob&pwd=y&csrf=a+b" {
                    "dashboard".to_string()
                } else {
                    format!("invalid: {}", body)
                }
            }),
        );
        let base = serve(router).await;

        let attempt = FormAttempt::new(&config(format!("{}/login", base)), Client::new()).unwrap();
        let response = attempt.attempt("bob", "y").await.unwrap();
        assert_eq!(response.output, "dashboard");
    }
}
