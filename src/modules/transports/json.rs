use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Map, Value};

use super::{Attempt, Response};
use crate::config::RunConfig;
use crate::error::AttemptError;

/// POSTs `{"<user field>": user, "<pass field>": pass, ...extras}`.
pub struct JsonAttempt {
    client: Client,
    url: String,
    username_field: String,
    password_field: String,
    extra_body: Vec<(String, String)>,
}

impl JsonAttempt {
    pub fn new(cfg: &RunConfig, client: Client) -> Self {
        Self {
            client,
            url: cfg.target.clone(),
            username_field: cfg.username_field.clone(),
            password_field: cfg.password_field.clone(),
            extra_body: cfg.extra_body.clone(),
        }
    }

    fn body(&self, username: &str, password: &str) -> Value {
        let mut map = Map::new();
        map.insert(self.username_field.clone(), Value::String(username.to_string()));
        map.insert(self.password_field.clone(), Value::String(password.to_string()));
        for (key, value) in &self.extra_body {
            map.insert(key.clone(), Value::String(value.clone()));
        }
        Value::Object(map)
    }
}

#[async_trait]
impl Attempt for JsonAttempt {
    async fn attempt(&self, username: &str, password: &str) -> Result<Response, AttemptError> {
        let response = self
            .client
            .post(&self.url)
            .json(&self.body(username, password))
            .send()
            .await?;
        Ok(Response {
            output: response.text().await?,
            show_output: false,
        })
    }
}
