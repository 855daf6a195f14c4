use jsonwebtoken::DecodingKey;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

#[derive(Debug, Clone, Deserialize)]
struct JwkSet {
    keys: Vec<Jwk>,
}

#[derive(Debug, Clone, Deserialize)]
struct Jwk {
    kid: Option<String>,
    kty: String,
    #[serde(default)]
    n: Option<String>,
    #[serde(default)]
    e: Option<String>,
}

struct CachedKeys {
    keys: HashMap<String, DecodingKey>,
    fetched_at: Instant,
}

/// Fetches and caches the identity provider's RSA signing keys
pub struct JwksClient {
    jwks_url: String,
    client: reqwest::Client,
    cache: RwLock<Option<CachedKeys>>,
    cache_ttl: Duration,
}

impl JwksClient {
    pub fn new(issuer_url: &str, cache_ttl: Duration) -> Self {
        Self {
            jwks_url: format!("{}/.well-known/jwks.json", issuer_url.trim_end_matches('/')),
            client: reqwest::Client::new(),
            cache: RwLock::new(None),
            cache_ttl,
        }
    }

    pub async fn get_key(&self, kid: &str) -> Result<DecodingKey, JwksError> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.fetched_at.elapsed() < self.cache_ttl {
                    if let Some(key) = cached.keys.get(kid) {
                        return Ok(key.clone());
                    }
                }
            }
        }

        // Unknown kid or stale cache: the provider may have rotated keys
        let keys = self.fetch_keys().await?;
        let key = keys.get(kid).cloned();

        *self.cache.write().await = Some(CachedKeys {
            keys,
            fetched_at: Instant::now(),
        });

        key.ok_or_else(|| JwksError::KeyNotFound(kid.to_string()))
    }

    async fn fetch_keys(&self) -> Result<HashMap<String, DecodingKey>, JwksError> {
        let response = self
            .client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| JwksError::FetchError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(JwksError::FetchError(format!(
                "HTTP {} from {}",
                response.status(),
                self.jwks_url
            )));
        }

        let set: JwkSet = response
            .json()
            .await
            .map_err(|e| JwksError::ParseError(e.to_string()))?;

        tracing::debug!("Fetched {} keys from {}", set.keys.len(), self.jwks_url);

        rsa_keys(set)
    }
}

/// Keep only RSA keys that carry a kid and both modulus and exponent
fn rsa_keys(set: JwkSet) -> Result<HashMap<String, DecodingKey>, JwksError> {
    let mut keys = HashMap::new();
    for jwk in set.keys {
        let (Some(kid), Some(n), Some(e)) = (jwk.kid, jwk.n, jwk.e) else {
            continue;
        };
        if jwk.kty != "RSA" {
            continue;
        }
        let key = DecodingKey::from_rsa_components(&n, &e)
            .map_err(|err| JwksError::KeyConversionError(err.to_string()))?;
        keys.insert(kid, key);
    }
    Ok(keys)
}

#[derive(Debug, thiserror::Error)]
pub enum JwksError {
    #[error("Failed to fetch JWKS: {0}")]
    FetchError(String),

    #[error("Failed to parse JWKS: {0}")]
    ParseError(String),

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Failed to convert key: {0}")]
    KeyConversionError(String),
}
