use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// Failure of the external definition source. A word the source simply does
/// not know is not an error; that is `Ok(None)` from [`Lookup::lookup`].
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("lookup request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("lookup service returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("lookup response had an unexpected shape")]
    MalformedResponse,
}

/// An external definition source. Treated as untrusted: it may be slow,
/// return nothing, or fail outright, and none of that may corrupt local
/// state.
pub trait Lookup {
    fn lookup(&mut self, word: &str) -> Result<Option<String>, LookupError>;
}

const DICTIONARY_API_BASE: &str = "https://api.dictionaryapi.dev/api/v2/entries/en";

/// Free Dictionary API client
#[derive(Debug)]
pub struct DictionaryApi {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl DictionaryApi {
    pub fn new(timeout_secs: u64) -> Result<Self, LookupError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: DICTIONARY_API_BASE.to_string(),
        })
    }

    #[cfg(test)]
    fn with_base_url(base_url: &str, timeout_secs: u64) -> Result<Self, LookupError> {
        let mut api = Self::new(timeout_secs)?;
        api.base_url = base_url.trim_end_matches('/').to_string();
        Ok(api)
    }

    fn first_definition(payload: &serde_json::Value) -> Option<String> {
        payload
            .get(0)?
            .get("meanings")?
            .get(0)?
            .get("definitions")?
            .get(0)?
            .get("definition")?
            .as_str()
            .map(|s| s.to_string())
    }
}

impl Lookup for DictionaryApi {
    fn lookup(&mut self, word: &str) -> Result<Option<String>, LookupError> {
        let url = format!("{}/{}", self.base_url, word);
        let response = self.client.get(&url).send()?;

        // The API answers 404 for words it does not know
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(LookupError::Status(response.status()));
        }

        let payload: serde_json::Value = response.json()?;
        match Self::first_definition(&payload) {
            Some(definition) => Ok(Some(definition)),
            None => Err(LookupError::MalformedResponse),
        }
    }
}

/// Caching wrapper around any [`Lookup`]. Successful lookups are remembered
/// per word so repeated calls never re-invoke the underlying source; absent
/// and failed lookups are not cached.
#[derive(Debug)]
pub struct CachedLookup<L> {
    inner: L,
    cache: HashMap<String, String>,
}

impl<L: Lookup> CachedLookup<L> {
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            cache: HashMap::new(),
        }
    }

    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }
}

impl<L: Lookup> Lookup for CachedLookup<L> {
    fn lookup(&mut self, word: &str) -> Result<Option<String>, LookupError> {
        if let Some(definition) = self.cache.get(word) {
            return Ok(Some(definition.clone()));
        }

        let result = self.inner.lookup(word)?;
        if let Some(ref definition) = result {
            self.cache.insert(word.to_string(), definition.clone());
        }
        Ok(result)
    }
}
