use oauth2::CsrfToken;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use super::error::MalError;

pub const AUTH_URL: &str = "https://myanimelist.net/v1/oauth2/authorize";
pub const TOKEN_URL: &str = "https://myanimelist.net/v1/oauth2/token";

/// 96 random bytes encode to a 128-character URL-safe verifier, the PKCE maximum.
const VERIFIER_BYTES: u32 = 96;

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<u64>,
    #[allow(dead_code)]
    pub token_type: Option<String>,
}

/// Generate a random PKCE code verifier.
pub fn generate_verifier() -> String {
    CsrfToken::new_random_len(VERIFIER_BYTES).secret().clone()
}

/// Build the MAL consent page URL.
///
/// MAL only supports the `plain` PKCE method, so the challenge is the verifier.
pub fn authorize_url(
    auth_url: &str,
    client_id: &str,
    verifier: &str,
    redirect_uri: Option<&str>,
) -> String {
    let mut url = match Url::parse(auth_url) {
        Ok(url) => url,
        Err(_) => return auth_url.to_string(),
    };
    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("response_type", "code")
            .append_pair("client_id", client_id)
            .append_pair("code_challenge", verifier)
            .append_pair("code_challenge_method", "plain");
        if let Some(redirect) = redirect_uri {
            query.append_pair("redirect_uri", redirect);
        }
    }
    url.into()
}

/// Exchange the authorization code for tokens.
pub async fn exchange_code(
    http: &Client,
    token_url: &str,
    client_id: &str,
    code: &str,
    verifier: &str,
    redirect_uri: Option<&str>,
) -> Result<TokenResponse, MalError> {
    let mut params = vec![
        ("client_id", client_id),
        ("grant_type", "authorization_code"),
        ("code", code),
        ("code_verifier", verifier),
    ];
    if let Some(redirect) = redirect_uri {
        params.push(("redirect_uri", redirect));
    }

    let resp = http.post(token_url).form(&params).send().await?;

    if !resp.status().is_success() {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        return Err(MalError::Api {
            status,
            message: body,
        });
    }

    resp.json::<TokenResponse>()
        .await
        .map_err(|e| MalError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verifier_shape() {
        let verifier = generate_verifier();
        assert_eq!(verifier.len(), 128);
        assert!(verifier
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-._~".contains(c)));
        assert_ne!(verifier, generate_verifier());
    }

    #[test]
    fn test_authorize_url_uses_plain_challenge() {
        let url = Url::parse(&authorize_url(AUTH_URL, "abc123", "verifier", None)).unwrap();
        let pairs: Vec<_> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("code_challenge".into(), "verifier".into())));
        assert!(pairs.contains(&("code_challenge_method".into(), "plain".into())));
        assert!(!pairs.iter().any(|(k, _)| k == "redirect_uri"));
    }
}
