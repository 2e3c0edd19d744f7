//! Authentication strategies for remote file sources.
//!
//! Every strategy decorates an outgoing request; the Drive backend does not
//! care which one it was given.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use anyhow::{Context, Result, anyhow};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use log::debug;
use reqwest::blocking::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};

pub trait Authenticator: Send + Sync {
    fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder>;
    /// Human-readable strategy name, safe to log.
    fn describe(&self) -> &'static str;
}

/// A bearer token obtained elsewhere, e.g. through an interactive OAuth
/// consent flow.
pub struct AccessToken {
    token: String,
}

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken").field("token", &"***").finish()
    }
}

impl Authenticator for AccessToken {
    fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        Ok(request.bearer_auth(&self.token))
    }

    fn describe(&self) -> &'static str {
        "access-token"
    }
}

/// Reads `access_token` from a saved OAuth credentials file on every request,
/// so an external refresher can rotate the file in place.
#[derive(Debug, Clone)]
pub struct TokenFile {
    path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct StoredCredentials {
    access_token: Option<String>,
    token: Option<String>,
}

impl TokenFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn read_token(&self) -> Result<String> {
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("Reading credentials file {:?}", self.path))?;
        let stored: StoredCredentials = serde_json::from_str(&raw)
            .with_context(|| format!("Parsing credentials file {:?}", self.path))?;
        stored
            .access_token
            .or(stored.token)
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| anyhow!("Credentials file {:?} has no access token", self.path))
    }
}

impl Authenticator for TokenFile {
    fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        Ok(request.bearer_auth(self.read_token()?))
    }

    fn describe(&self) -> &'static str {
        "token-file"
    }
}

/// API key for folders shared publicly; no user identity involved.
pub struct ApiKey {
    key: String,
}

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKey").field("key", &"***").finish()
    }
}

impl Authenticator for ApiKey {
    fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        Ok(request.query(&[("key", self.key.as_str())]))
    }

    fn describe(&self) -> &'static str {
        "api-key"
    }
}

pub const DRIVE_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/drive.metadata.readonly",
    "https://www.googleapis.com/auth/drive.readonly",
];
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: u64 = 3600;
/// Tokens this close to expiry are refreshed before use.
const EXPIRY_MARGIN_SECS: u64 = 60;

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// The fields of a Google service-account JSON key that the token exchange
/// needs; everything else in the file is ignored.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"***")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: u64,
}

impl CachedToken {
    fn is_fresh(&self, now: u64) -> bool {
        now + EXPIRY_MARGIN_SECS < self.expires_at
    }
}

/// Server-to-server login with a service-account key: a signed RS256
/// assertion is exchanged for a read-only Drive access token, which is
/// cached until shortly before it expires.
pub struct ServiceAccount {
    key: ServiceAccountKey,
    signing_key: EncodingKey,
    client: Client,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccount {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Reading service account key {path:?}"))?;
        Self::from_json(&raw).with_context(|| format!("Loading service account key {path:?}"))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let key: ServiceAccountKey =
            serde_json::from_str(raw).context("Parsing service account key JSON")?;
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .context("Decoding service account private key")?;
        Ok(Self {
            key,
            signing_key,
            client: Client::new(),
            cached: Mutex::new(None),
        })
    }

    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    fn signed_assertion(&self, now: u64) -> Result<String> {
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: DRIVE_SCOPES.join(" "),
            aud: &self.key.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();
        jsonwebtoken::encode(&header, &claims, &self.signing_key)
            .context("Signing service account assertion")
    }

    fn exchange(&self, now: u64) -> Result<CachedToken> {
        let assertion = self.signed_assertion(now)?;
        let context = || {
            format!(
                "Requesting access token for service account {}",
                self.key.client_email
            )
        };
        let response = self
            .client
            .post(self.key.token_uri.as_str())
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .with_context(context)?
            .error_for_status()
            .with_context(context)?
            .json::<TokenResponse>()
            .context("Parsing access token response")?;
        Ok(CachedToken {
            token: response.access_token,
            expires_at: now + response.expires_in.unwrap_or(ASSERTION_LIFETIME_SECS),
        })
    }

    /// Cached access token, exchanging a fresh assertion when none is held
    /// or the held one is about to expire.
    pub fn bearer_token(&self) -> Result<String> {
        let now = jsonwebtoken::get_current_timestamp();
        let mut cached = self
            .cached
            .lock()
            .map_err(|_| anyhow!("Service account token cache lock poisoned"))?;
        if let Some(token) = cached.as_ref().filter(|token| token.is_fresh(now)) {
            return Ok(token.token.clone());
        }
        debug!(
            "Exchanging assertion for {} at {}",
            self.key.client_email, self.key.token_uri
        );
        let fresh = self.exchange(now)?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }
}

impl fmt::Debug for ServiceAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccount")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl Authenticator for ServiceAccount {
    fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        Ok(request.bearer_auth(self.bearer_token()?))
    }

    fn describe(&self) -> &'static str {
        "service-account"
    }
}
