//! GitHub Actions secrets API client.
//!
//! Two endpoints are enough for a secrets copy: fetch the target repo's
//! public key, then PUT each secret sealed-box encrypted against it. The
//! API accepts only libsodium sealed boxes, base64 encoded.

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use crypto_box::aead::OsRng;
use crypto_box::PublicKey;
use serde::Deserialize;

const API_VERSION: &str = "2022-11-28";
const ACCEPT: &str = "application/vnd.github+json";

/// Repository public key used for sealing secret values.
#[derive(Debug, Clone, Deserialize)]
pub struct RepoPublicKey {
    pub key_id: String,
    pub key: String,
}

/// Outcome of a secret PUT, derived from the response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretWrite {
    /// 201 - the secret did not exist before.
    Created,
    /// 204 - an existing secret was overwritten.
    Updated,
}

/// Thin client over the two Actions secrets endpoints.
pub struct SecretsClient {
    http: reqwest::Client,
    token: String,
}

impl SecretsClient {
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("forklift/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            token: token.into(),
        })
    }

    /// `GET /repos/{owner}/{repo}/actions/secrets/public-key`
    pub async fn public_key(&self, owner: &str, repo: &str) -> Result<RepoPublicKey> {
        let url = format!("https://api.github.com/repos/{owner}/{repo}/actions/secrets/public-key");
        let resp = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .header("Accept", ACCEPT)
            .header("X-GitHub-Api-Version", API_VERSION)
            .send()
            .await
            .context("Failed to fetch repository public key")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("GET {url} failed with {status}: {body}");
        }
        resp.json::<RepoPublicKey>()
            .await
            .context("Failed to decode public key response")
    }

    /// `PUT /repos/{owner}/{repo}/actions/secrets/{name}`
    pub async fn put_secret(
        &self,
        owner: &str,
        repo: &str,
        name: &str,
        encrypted_value: &str,
        key_id: &str,
    ) -> Result<SecretWrite> {
        let url = format!("https://api.github.com/repos/{owner}/{repo}/actions/secrets/{name}");
        let resp = self
            .http
            .put(&url)
            .bearer_auth(&self.token)
            .header("Accept", ACCEPT)
            .header("X-GitHub-Api-Version", API_VERSION)
            .json(&serde_json::json!({
                "encrypted_value": encrypted_value,
                "key_id": key_id,
            }))
            .send()
            .await
            .with_context(|| format!("Failed to put secret {name}"))?;

        let status = resp.status();
        match status.as_u16() {
            201 => Ok(SecretWrite::Created),
            204 => Ok(SecretWrite::Updated),
            _ if status.is_success() => Ok(SecretWrite::Updated),
            _ => {
                let body = resp.text().await.unwrap_or_default();
                anyhow::bail!("PUT {url} failed with {status}: {body}")
            }
        }
    }
}

/// Sealed-box encrypt a secret value against a base64 repo public key,
/// returning the base64 ciphertext the API expects.
pub fn seal_secret(public_key_b64: &str, value: &str) -> Result<String> {
    let key_bytes = BASE64
        .decode(public_key_b64)
        .context("Repository public key is not valid base64")?;
    let key_bytes: [u8; 32] = key_bytes
        .as_slice()
        .try_into()
        .map_err(|_| anyhow::anyhow!("Repository public key must be 32 bytes"))?;
    let public_key = PublicKey::from(key_bytes);
    let sealed = public_key
        .seal(&mut OsRng, value.as_bytes())
        .map_err(|e| anyhow::anyhow!("Sealed-box encryption failed: {e}"))?;
    Ok(BASE64.encode(sealed))
}
