use oauth2::basic::BasicClient;
use oauth2::reqwest::http_client;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, PkceCodeChallenge, RedirectUrl,
    RefreshToken, Scope, TokenResponse, TokenUrl,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;
use tiny_http::{Response, Server};
use url::Url;

const AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const REDIRECT_URI: &str = "http://127.0.0.1:8080";
const REDIRECT_BIND: &str = "127.0.0.1:8080";

const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/gmail.send",
    "https://www.googleapis.com/auth/calendar",
];

/// Leeway before the recorded expiry at which a token counts as expired.
const EXPIRY_LEEWAY_SECS: i64 = 60;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Google credentials file not found: {0}")]
    MissingCredentials(String),
    #[error("Invalid client secrets file: {0}")]
    InvalidSecrets(String),
    #[error("Invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("Could not open browser for authorization: {0}")]
    Browser(String),
    #[error("Local redirect listener failed: {0}")]
    RedirectListener(String),
    #[error("No authorization code received before timeout")]
    NoAuthorizationCode,
    #[error("Token exchange failed: {0}")]
    TokenExchange(String),
    #[error("Token persistence error: {0}")]
    TokenStore(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// OAuth client id/secret from the local client-secrets file. Google emits
/// the same shape under an "installed" or "web" key depending on the
/// credential type.
#[derive(Debug, Clone, Deserialize)]
struct AppSecrets {
    client_id: String,
    client_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SecretsFile {
    installed: Option<AppSecrets>,
    web: Option<AppSecrets>,
}

fn load_client_secrets(path: &Path) -> Result<AppSecrets, AuthError> {
    let contents = fs::read_to_string(path)?;
    let parsed: SecretsFile = serde_json::from_str(&contents)
        .map_err(|e| AuthError::InvalidSecrets(e.to_string()))?;

    parsed
        .installed
        .or(parsed.web)
        .ok_or_else(|| {
            AuthError::InvalidSecrets("expected an 'installed' or 'web' section".to_string())
        })
}

/// Persisted OAuth token state, stored as JSON next to the binary (or
/// wherever `GOOGLE_TOKEN_FILE` points).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Epoch seconds at which the access token expires.
    pub expires_at: Option<i64>,
}

impl StoredToken {
    pub fn load(path: &Path) -> Result<Option<Self>, AuthError> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(path)?;
        let token = serde_json::from_str(&contents)
            .map_err(|e| AuthError::TokenStore(format!("invalid token file: {}", e)))?;
        Ok(Some(token))
    }

    pub fn save(&self, path: &Path) -> Result<(), AuthError> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| AuthError::TokenStore(e.to_string()))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// A token with no recorded expiry is treated as expired so it gets
    /// refreshed rather than failing mid-call.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => chrono::Utc::now().timestamp() + EXPIRY_LEEWAY_SECS >= expires_at,
            None => true,
        }
    }

    fn is_usable(&self) -> bool {
        !self.access_token.is_empty() && !self.is_expired()
    }
}

/// Tokens returned by an exchange, before persistence.
struct TokenBundle {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<u64>,
}

impl TokenBundle {
    fn expires_at(&self) -> Option<i64> {
        self.expires_in
            .map(|secs| chrono::Utc::now().timestamp() + secs as i64)
    }
}

/// Manages the persisted Google OAuth token: loads it at startup, refreshes
/// it on expiry, and runs the interactive browser flow when nothing usable
/// exists. All the heavy lifting is delegated to the oauth2 crate.
pub struct GoogleAuthenticator {
    client_id: String,
    client_secret: Option<String>,
    token_file: PathBuf,
    token: StoredToken,
}

impl GoogleAuthenticator {
    /// Load or establish a valid token. Runs before the GUI opens; any
    /// failure here is fatal to startup.
    pub fn bootstrap(credentials_file: &Path, token_file: &Path) -> Result<Self, AuthError> {
        if !credentials_file.exists() {
            return Err(AuthError::MissingCredentials(
                credentials_file.display().to_string(),
            ));
        }

        let secrets = load_client_secrets(credentials_file)?;
        let token = StoredToken::load(token_file)?.unwrap_or_default();

        let mut authenticator = Self {
            client_id: secrets.client_id,
            client_secret: secrets.client_secret,
            token_file: token_file.to_path_buf(),
            token,
        };

        if authenticator.token.is_usable() {
            log::info!("Loaded persisted Google token");
            return Ok(authenticator);
        }

        if let Some(refresh_token) = authenticator.token.refresh_token.clone() {
            log::info!("Persisted token expired, refreshing");
            authenticator.refresh(&refresh_token)?;
        } else {
            log::info!("No usable token, starting interactive authorization");
            authenticator.interactive_flow()?;
        }

        authenticator.token.save(&authenticator.token_file)?;
        log::info!("✅ Google APIs authenticated");
        Ok(authenticator)
    }

    /// Bearer token for API calls, refreshing first if expired.
    pub fn access_token(&mut self) -> Result<String, AuthError> {
        if !self.token.is_usable() {
            let refresh_token = self.token.refresh_token.clone().ok_or_else(|| {
                AuthError::TokenExchange("access token expired and no refresh token".to_string())
            })?;
            self.refresh(&refresh_token)?;
            self.token.save(&self.token_file)?;
        }
        Ok(self.token.access_token.clone())
    }

    fn oauth_client(&self) -> Result<BasicClient, AuthError> {
        let client = BasicClient::new(
            ClientId::new(self.client_id.clone()),
            self.client_secret.clone().map(ClientSecret::new),
            AuthUrl::new(AUTH_ENDPOINT.to_string())?,
            Some(TokenUrl::new(TOKEN_ENDPOINT.to_string())?),
        );
        Ok(client)
    }

    /// Exchange the refresh token for a new access token.
    fn refresh(&mut self, refresh_token: &str) -> Result<(), AuthError> {
        let client = self.oauth_client()?;
        let token = client
            .exchange_refresh_token(&RefreshToken::new(refresh_token.to_string()))
            .request(http_client)
            .map_err(|e| AuthError::TokenExchange(e.to_string()))?;

        let bundle = TokenBundle {
            access_token: token.access_token().secret().to_string(),
            refresh_token: token.refresh_token().map(|t| t.secret().to_string()),
            expires_in: token.expires_in().map(|d| d.as_secs()),
        };
        self.apply(bundle);
        Ok(())
    }

    /// Authorization Code + PKCE flow: open the system browser and catch
    /// the redirect on a loopback listener.
    fn interactive_flow(&mut self) -> Result<(), AuthError> {
        let client = self
            .oauth_client()?
            .set_redirect_uri(RedirectUrl::new(REDIRECT_URI.to_string())?);

        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let mut authorize = client
            .authorize_url(CsrfToken::new_random)
            .set_pkce_challenge(pkce_challenge);
        for scope in SCOPES {
            authorize = authorize.add_scope(Scope::new((*scope).to_string()));
        }
        let (auth_url, _csrf_token) = authorize.url();

        log::info!("Opening browser for Google authorization");
        open::that(auth_url.as_str()).map_err(|e| AuthError::Browser(e.to_string()))?;

        let code = wait_for_authorization_code()?;

        let token = client
            .exchange_code(AuthorizationCode::new(code))
            .set_pkce_verifier(pkce_verifier)
            .request(http_client)
            .map_err(|e| AuthError::TokenExchange(e.to_string()))?;

        let bundle = TokenBundle {
            access_token: token.access_token().secret().to_string(),
            refresh_token: token.refresh_token().map(|t| t.secret().to_string()),
            expires_in: token.expires_in().map(|d| d.as_secs()),
        };
        self.apply(bundle);
        Ok(())
    }

    fn apply(&mut self, bundle: TokenBundle) {
        self.token.expires_at = bundle.expires_at();
        self.token.access_token = bundle.access_token;
        // A refresh response may omit the refresh token; keep the old one.
        if bundle.refresh_token.is_some() {
            self.token.refresh_token = bundle.refresh_token;
        }
    }
}

/// Run a tiny loopback HTTP server until the OAuth redirect delivers the
/// authorization code, or two minutes pass.
fn wait_for_authorization_code() -> Result<String, AuthError> {
    let server =
        Server::http(REDIRECT_BIND).map_err(|e| AuthError::RedirectListener(e.to_string()))?;

    let wait_until = Instant::now() + Duration::from_secs(120);
    while Instant::now() < wait_until {
        let Ok(maybe_request) = server.recv_timeout(Duration::from_millis(500)) else {
            continue;
        };
        let Some(request) = maybe_request else {
            continue;
        };

        let full_url = format!("http://localhost{}", request.url());
        let Ok(parsed) = Url::parse(&full_url) else {
            let _ = request.respond(Response::from_string("Bad redirect"));
            continue;
        };

        let code = parsed
            .query_pairs()
            .find(|(k, _)| k == "code")
            .map(|(_, v)| v.into_owned());
        let _ = request.respond(Response::from_string(
            "Authorization received. You can close this tab.",
        ));

        if let Some(code) = code {
            return Ok(code);
        }
    }

    Err(AuthError::NoAuthorizationCode)
}
