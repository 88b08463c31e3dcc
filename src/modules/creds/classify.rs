use anyhow::{anyhow, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

/// Ordered, non-empty list of texts that mark a failed login.
#[derive(Debug, Clone)]
pub struct FailureMarkers(Vec<String>);

impl FailureMarkers {
    pub fn new(markers: Vec<String>) -> Result<Self> {
        if markers.is_empty() {
            return Err(anyhow!("Failure text must be specified (-f)"));
        }
        Ok(Self(markers))
    }

    /// Split a comma-separated `-f` value. Empty segments are dropped so that
    /// a stray comma can't produce a marker matching every response.
    pub fn parse(raw: &str) -> Result<Self> {
        Self::new(
            raw.split(',')
                .filter(|m| !m.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// Failure if any marker occurs in `output`, otherwise success.
    pub fn classify(&self, output: &str) -> Outcome {
        if self.0.iter().any(|m| output.contains(m.as_str())) {
            Outcome::Failure
        } else {
            Outcome::Success
        }
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}
