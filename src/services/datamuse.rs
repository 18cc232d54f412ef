use std::collections::HashMap;
use std::time::Duration;

use log::{debug, warn};
use reqwest::Client;
use serde::Deserialize;
use tokio::task::JoinSet;

use crate::error::RhymeError;

pub const DEFAULT_MAX_RHYMES: usize = 500;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Deserialize)]
struct RhymeWord {
    word: String,
}

/// Client for a Datamuse-compatible `/words?rel_rhy=` endpoint
#[derive(Clone)]
pub struct RhymeApi {
    client: Client,
    base_url: String,
    max: usize,
}

impl RhymeApi {
    pub fn new(base_url: &str) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to configure rhyme client ({}), using defaults", e);
                Client::new()
            });

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max: DEFAULT_MAX_RHYMES,
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/words", self.base_url)
    }

    pub async fn rhymes(&self, word: &str) -> Result<Vec<String>, RhymeError> {
        let response = self
            .client
            .get(self.endpoint())
            .query(&[("rel_rhy", word.to_string()), ("max", self.max.to_string())])
            .send()
            .await?
            .error_for_status()?;

        let words: Vec<RhymeWord> = response.json().await?;
        Ok(words.into_iter().map(|w| w.word.to_lowercase()).collect())
    }

    /// Look up rhymes for every word concurrently.
    /// Failed lookups are logged and left out of the result.
    pub async fn rhymes_for_all(&self, words: &[String]) -> HashMap<String, Vec<String>> {
        let mut lookups = JoinSet::new();
        for word in words {
            let api = self.clone();
            let word = word.clone();
            lookups.spawn(async move {
                let result = api.rhymes(&word).await;
                (word, result)
            });
        }

        let mut found = HashMap::new();
        while let Some(joined) = lookups.join_next().await {
            match joined {
                Ok((word, Ok(rhymes))) => {
                    debug!("Rhyme service returned {} rhymes for '{}'", rhymes.len(), word);
                    found.insert(word, rhymes);
                }
                Ok((word, Err(RhymeError::Request(e)))) => {
                    warn!(
                        "Rhyme lookup for '{}' failed (status: {:?}): {}",
                        word,
                        e.status(),
                        e
                    );
                }
                Err(e) => warn!("Rhyme lookup task failed: {}", e),
            }
        }

        found
    }
}
