use reqwest::Client;
use serde::Deserialize;
use url::Url;

use super::error::AniListError;

pub const AUTH_URL: &str = "https://anilist.co/api/v2/oauth/authorize";
pub const TOKEN_URL: &str = "https://anilist.co/api/v2/oauth/token";

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: Option<String>,
}

/// Build the AniList consent page URL.
///
/// Without a redirect URI the implicit grant is used and AniList shows the
/// token to the user directly; with one, an authorization code is returned
/// to the redirect and must go through [`exchange_code`].
pub fn authorize_url(client_id: &str, redirect_uri: Option<&str>) -> String {
    let mut url = match Url::parse(AUTH_URL) {
        Ok(url) => url,
        Err(_) => return AUTH_URL.to_string(),
    };
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("client_id", client_id);
        match redirect_uri {
            Some(redirect) => {
                query.append_pair("redirect_uri", redirect);
                query.append_pair("response_type", "code");
            }
            None => {
                query.append_pair("response_type", "token");
            }
        }
    }
    url.into()
}

/// Exchange the authorization code for an access token.
pub async fn exchange_code(
    http: &Client,
    token_url: &str,
    client_id: &str,
    client_secret: &str,
    redirect_uri: &str,
    code: &str,
) -> Result<TokenResponse, AniListError> {
    let resp = http
        .post(token_url)
        .header("Accept", "application/json")
        .json(&serde_json::json!({
            "grant_type": "authorization_code",
            "client_id": client_id,
            "client_secret": client_secret,
            "redirect_uri": redirect_uri,
            "code": code,
        }))
        .send()
        .await?;

    if !resp.status().is_success() {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        return Err(AniListError::Api {
            status,
            message: body,
        });
    }

    resp.json::<TokenResponse>()
        .await
        .map_err(|e| AniListError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_implicit_grant_url() {
        let url = Url::parse(&authorize_url("5375", None)).unwrap();
        let pairs: Vec<_> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("client_id".into(), "5375".into())));
        assert!(pairs.contains(&("response_type".into(), "token".into())));
    }

    #[test]
    fn test_code_grant_url() {
        let url = Url::parse(&authorize_url("5375", Some("http://localhost:19742"))).unwrap();
        let pairs: Vec<_> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("response_type".into(), "code".into())));
        assert!(pairs.contains(&("redirect_uri".into(), "http://localhost:19742".into())));
    }
}
