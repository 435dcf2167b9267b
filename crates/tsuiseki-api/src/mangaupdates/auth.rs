use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::error::MangaUpdatesError;

/// Page where users sign in or create an account.
pub const LOGIN_PAGE_URL: &str = "https://www.mangaupdates.com/login.html";

/// Username and password, passed through `get_token` as a JSON access code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Encode as the access code accepted by `MangaUpdatesClient::get_token`.
    pub fn to_access_code(&self) -> String {
        serde_json::json!({ "username": self.username, "password": self.password }).to_string()
    }

    pub fn from_access_code(code: &str) -> Result<Self, MangaUpdatesError> {
        serde_json::from_str(code)
            .map_err(|e| MangaUpdatesError::Login(format!("malformed credentials: {e}")))
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub status: Option<String>,
    pub reason: Option<String>,
    pub context: Option<LoginContext>,
}

#[derive(Debug, Deserialize)]
pub struct LoginContext {
    pub session_token: String,
    #[allow(dead_code)]
    pub uid: Option<u64>,
}

/// Log in with username and password and return the session token.
pub async fn login(
    http: &Client,
    api_url: &str,
    credentials: &Credentials,
) -> Result<String, MangaUpdatesError> {
    let resp = http
        .put(format!("{api_url}/account/login"))
        .json(credentials)
        .send()
        .await?;

    if !resp.status().is_success() {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        return Err(MangaUpdatesError::Api {
            status,
            message: body,
        });
    }

    let body: LoginResponse = resp
        .json()
        .await
        .map_err(|e| MangaUpdatesError::Parse(e.to_string()))?;

    match body.context {
        Some(ctx) if body.status.as_deref() != Some("exception") => Ok(ctx.session_token),
        _ => Err(MangaUpdatesError::Login(
            body.reason.unwrap_or_else(|| "no session token returned".into()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_code_round_trip() {
        let creds = Credentials::new("reader", "pa:ss\"word");
        let parsed = Credentials::from_access_code(&creds.to_access_code()).unwrap();
        assert_eq!(parsed.username, "reader");
        assert_eq!(parsed.password, "pa:ss\"word");
    }

    #[test]
    fn test_malformed_access_code() {
        assert!(matches!(
            Credentials::from_access_code("reader:password"),
            Err(MangaUpdatesError::Login(_))
        ));
    }

    #[test]
    fn test_deserialize_login_response() {
        let json = r#"{
            "status": "success",
            "reason": "Successfully logged in.",
            "context": { "session_token": "abc.def", "uid": 123456 }
        }"#;
        let resp: LoginResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.context.unwrap().session_token, "abc.def");
    }
}
