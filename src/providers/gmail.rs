//! Gmail REST implementation of the provider seams.
//!
//! Talks to the Gmail API v1 with OAuth 2.0 bearer tokens:
//! - `users/me/messages` (`q` search) for partition listings
//! - `users/me/messages/{id}` in metadata format for detail retrieval
//! - `users/me/profile` to resolve the address of a new connection
//! - the Google token endpoint for both the authorization-code and
//!   refresh-token grants
//!
//! The client is stateless apart from its HTTP connection pool; every
//! call takes the credential or session it should act under.

use chrono::{Duration, Utc};
use serde::Deserialize;

use super::traits::{
    CredentialIssuer, MailboxProvider, ProviderError, RawHeader, RawMessageDetail, RawMessageRef,
    Result, Session,
};
use crate::domain::{Credential, MessageId, PartitionQuery};
use async_trait::async_trait;

const GMAIL_API_BASE: &str = "https://gmail.googleapis.com/gmail/v1/users/me";
const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GMAIL_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/gmail.readonly";

/// Headers requested in metadata format; everything the normalizer needs.
const METADATA_HEADERS: [&str; 4] = ["Subject", "From", "Date", "Received"];

/// Refresh the access token when it expires within this window.
const REFRESH_WINDOW_SECS: i64 = 60;

/// OAuth application settings for the Google endpoints.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    /// OAuth client ID.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// Redirect URI registered for the authorization flow.
    pub redirect_uri: String,
}

/// Gmail API message list response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageListResponse {
    messages: Option<Vec<MessageRefPayload>>,
}

/// Gmail API message handle.
#[derive(Debug, Deserialize)]
struct MessageRefPayload {
    id: String,
}

/// Gmail API message in metadata format.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessagePayload {
    id: String,
    label_ids: Option<Vec<String>>,
    snippet: Option<String>,
    internal_date: Option<String>,
    payload: Option<MessageMetaPayload>,
}

/// Gmail message payload (headers only in metadata format).
#[derive(Debug, Deserialize)]
struct MessageMetaPayload {
    headers: Option<Vec<HeaderPayload>>,
}

/// Gmail message header.
#[derive(Debug, Deserialize)]
struct HeaderPayload {
    name: String,
    value: String,
}

/// OAuth token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
    refresh_token: Option<String>,
}

/// Gmail profile response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileResponse {
    email_address: String,
}

/// Gmail API client implementing [`MailboxProvider`] and
/// [`CredentialIssuer`].
pub struct GmailClient {
    http: reqwest::Client,
    oauth: OAuthConfig,
    /// Page size for partition listings.
    page_size: u32,
}

impl GmailClient {
    /// Creates a Gmail client with the given OAuth application settings.
    pub fn new(oauth: OAuthConfig, page_size: u32) -> Self {
        Self {
            http: reqwest::Client::new(),
            oauth,
            page_size,
        }
    }

    /// Calls the token endpoint with the given grant parameters.
    async fn request_token(&self, params: &[(&str, &str)]) -> Result<TokenResponse> {
        let response = self
            .http
            .post(GOOGLE_TOKEN_URL)
            .form(params)
            .send()
            .await
            .map_err(|e| ProviderError::Connection(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Authentication(format!(
                "token request failed ({status}): {body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::Provider(format!("parse token response: {e}")))
    }

    /// Makes an authenticated GET request to the Gmail API.
    async fn get<T: for<'de> Deserialize<'de>>(
        &self,
        access_token: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{GMAIL_API_BASE}{path}");
        let response = self
            .http
            .get(&url)
            .query(query)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| ProviderError::Connection(e.to_string()))?;

        self.handle_response(response).await
    }

    /// Handles an API response, mapping error statuses.
    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        if !response.status().is_success() {
            return Err(self.handle_error(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::Provider(format!("parse response: {e}")))
    }

    /// Maps an API error response onto the provider taxonomy.
    async fn handle_error(&self, response: reqwest::Response) -> ProviderError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        match status.as_u16() {
            401 | 403 => ProviderError::Authentication(format!("unauthorized: {body}")),
            404 => ProviderError::NotFound(body),
            429 => ProviderError::RateLimited {
                retry_after_secs: None,
            },
            400 => ProviderError::InvalidRequest(body),
            _ => ProviderError::Provider(format!("API error ({status}): {body}")),
        }
    }

    /// Exchanges a refresh token for a new access token, producing the
    /// replacement credential bundle.
    async fn refresh_credential(&self, credential: &Credential) -> Result<Credential> {
        let refresh_token = credential.refresh_token.as_deref().ok_or_else(|| {
            ProviderError::Authentication("access token expired and no refresh token granted".to_string())
        })?;

        let token = self
            .request_token(&[
                ("client_id", self.oauth.client_id.as_str()),
                ("client_secret", self.oauth.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .await?;

        Ok(Credential {
            access_token: token.access_token,
            // Google only re-issues the refresh token on the initial
            // grant; keep the stored one when the response omits it.
            refresh_token: token
                .refresh_token
                .or_else(|| credential.refresh_token.clone()),
            expires_at: token.expires_in.map(|secs| Utc::now() + Duration::seconds(secs)),
        })
    }
}

impl From<MessagePayload> for RawMessageDetail {
    fn from(msg: MessagePayload) -> Self {
        RawMessageDetail {
            id: MessageId::from(msg.id),
            label_ids: msg.label_ids.unwrap_or_default(),
            snippet: msg.snippet,
            internal_date_ms: msg.internal_date.and_then(|d| d.parse().ok()),
            headers: msg
                .payload
                .and_then(|p| p.headers)
                .unwrap_or_default()
                .into_iter()
                .map(|h| RawHeader {
                    name: h.name,
                    value: h.value,
                })
                .collect(),
        }
    }
}

#[async_trait]
impl CredentialIssuer for GmailClient {
    fn authorize_url(&self) -> String {
        // Static endpoint and known-good parameters; the parse cannot fail.
        let url = url::Url::parse_with_params(
            GOOGLE_AUTH_URL,
            [
                ("client_id", self.oauth.client_id.as_str()),
                ("redirect_uri", self.oauth.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", GMAIL_READONLY_SCOPE),
                ("access_type", "offline"),
            ],
        )
        .expect("static auth url");
        url.into()
    }

    async fn exchange(&self, code: &str) -> Result<(String, Credential)> {
        let token = self
            .request_token(&[
                ("client_id", self.oauth.client_id.as_str()),
                ("client_secret", self.oauth.client_secret.as_str()),
                ("redirect_uri", self.oauth.redirect_uri.as_str()),
                ("code", code),
                ("grant_type", "authorization_code"),
            ])
            .await?;

        let credential = Credential {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at: token.expires_in.map(|secs| Utc::now() + Duration::seconds(secs)),
        };

        let profile: ProfileResponse = self
            .get(&credential.access_token, "/profile", &[])
            .await?;

        tracing::info!(account = %profile.email_address, "authorization code exchanged");
        Ok((profile.email_address, credential))
    }
}

#[async_trait]
impl MailboxProvider for GmailClient {
    async fn authorize(&self, credential: &Credential) -> Result<Session> {
        if !credential.expires_within(Duration::seconds(REFRESH_WINDOW_SECS)) {
            return Ok(Session {
                access_token: credential.access_token.clone(),
                refreshed: None,
            });
        }

        let refreshed = self.refresh_credential(credential).await?;
        tracing::debug!("access token refreshed");
        Ok(Session {
            access_token: refreshed.access_token.clone(),
            refreshed: Some(refreshed),
        })
    }

    async fn list(&self, session: &Session, query: &PartitionQuery) -> Result<Vec<RawMessageRef>> {
        let response: MessageListResponse = self
            .get(
                &session.access_token,
                "/messages",
                &[
                    ("q", query.selector.clone()),
                    ("maxResults", self.page_size.to_string()),
                ],
            )
            .await?;

        Ok(response
            .messages
            .unwrap_or_default()
            .into_iter()
            .map(|m| RawMessageRef {
                id: MessageId::from(m.id),
                partition: query.tag.clone(),
            })
            .collect())
    }

    async fn get_detail(&self, session: &Session, id: &MessageId) -> Result<RawMessageDetail> {
        let mut query: Vec<(&str, String)> = vec![("format", "metadata".to_string())];
        for header in METADATA_HEADERS {
            query.push(("metadataHeaders", header.to_string()));
        }

        let payload: MessagePayload = self
            .get(&session.access_token, &format!("/messages/{id}"), &query)
            .await?;

        Ok(payload.into())
    }
}
