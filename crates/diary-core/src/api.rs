//! HTTP client for the diary server.
//!
//! Every entry endpoint authenticates with the opaque session token in the
//! `Session-Token` header. Title and content travel percent-encoded, so form
//! bodies are assembled by hand with each value encoded exactly once.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};

use crate::models::encode_text;
use crate::util::{compact_text, is_http_url};
use crate::{Entry, EntryDraft, EntryId, Error, Result};

pub const SESSION_TOKEN_HEADER: &str = "Session-Token";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const LOGIN_SUCCESS: &str = "LOGIN_SUCCESS";
const REGISTER_SUCCESS: &str = "REGISTER_SUCCESS";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Result of a successful login.
#[derive(Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    /// Token from the `Session-Token` response header, if the server sent one
    pub token: Option<String>,
}

impl std::fmt::Debug for LoginOutcome {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("LoginOutcome")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct DiaryApiClient {
    base_url: String,
    client: Client,
}

impl DiaryApiClient {
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl AsRef<str>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            base_url: normalize_base_url(base_url.as_ref())?,
            client: Client::builder().timeout(timeout).build()?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome> {
        let body = form_body(&[("username", username), ("password", password)]);
        let response = self.post_form("/login", body).send().await?;
        log_response("/login", &response);

        let token = response
            .headers()
            .get(SESSION_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(ToString::to_string);
        let text = response.text().await?;

        if text.trim() == LOGIN_SUCCESS {
            Ok(LoginOutcome { token })
        } else {
            tracing::debug!("Login rejected: {}", compact_text(&text));
            Err(Error::InvalidCredentials)
        }
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<()> {
        if username.is_empty() || password.is_empty() {
            return Err(Error::Validation(
                "Please enter username and password".to_string(),
            ));
        }

        let body = form_body(&[("username", username), ("password", password)]);
        let response = self.post_form("/register", body).send().await?;
        log_response("/register", &response);
        let text = response.text().await?;

        if text.trim() == REGISTER_SUCCESS {
            Ok(())
        } else {
            tracing::debug!("Registration rejected: {}", compact_text(&text));
            Err(Error::RegistrationRejected)
        }
    }

    /// Tell the server to drop the session. The response is not inspected.
    pub async fn logout(&self, token: Option<&str>) -> Result<()> {
        let mut request = self.client.get(self.url("/logout"));
        if let Some(token) = token.filter(|token| !token.trim().is_empty()) {
            request = request.header(SESSION_TOKEN_HEADER, token);
        }
        let response = request.send().await?;
        log_response("/logout", &response);
        Ok(())
    }

    pub async fn list_entries(&self, token: Option<&str>) -> Result<Vec<Entry>> {
        let token = require_token(token)?;
        let response = with_token(self.client.get(self.url("/entry/view")), token)
            .send()
            .await?;
        log_response("/entry/view", &response);

        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::SessionLost);
        }
        read_entries(response).await
    }

    pub async fn create_entry(&self, token: Option<&str>, draft: &EntryDraft) -> Result<()> {
        let token = require_token(token)?;
        let body = draft_form_body(None, draft);
        let response = with_token(self.post_form("/entry/create", body), token)
            .send()
            .await?;
        log_response("/entry/create", &response);
        expect_mutation_success(response).await
    }

    pub async fn edit_entry(
        &self,
        token: Option<&str>,
        id: EntryId,
        draft: &EntryDraft,
    ) -> Result<()> {
        let token = require_token(token)?;
        let body = draft_form_body(Some(id), draft);
        let response = with_token(self.post_form("/entry/edit", body), token)
            .send()
            .await?;
        log_response("/entry/edit", &response);
        expect_mutation_success(response).await
    }

    /// Delete an entry. Callers confirm with the user before calling this.
    pub async fn delete_entry(&self, token: Option<&str>, id: EntryId) -> Result<()> {
        let token = require_token(token)?;
        let url = format!("{}?id={}", self.url("/entry/delete"), id);
        let response = with_token(self.client.get(url), token).send().await?;
        log_response("/entry/delete", &response);

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(Error::Unauthorized);
        }
        Err(server_error(status, response.text().await.unwrap_or_default()))
    }

    pub async fn search_entries(&self, token: Option<&str>, query: &str) -> Result<Vec<Entry>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::Validation(
                "Search query cannot be empty".to_string(),
            ));
        }
        let token = require_token(token)?;

        let url = format!("{}?q={}", self.url("/entry/search"), encode_text(query));
        let response = with_token(self.client.get(url), token).send().await?;
        log_response("/entry/search", &response);
        read_entries(response).await
    }

    pub async fn export_entries(&self, token: Option<&str>) -> Result<Vec<Entry>> {
        let token = require_token(token)?;
        let response = with_token(self.client.get(self.url("/entry/export")), token)
            .send()
            .await?;
        log_response("/entry/export", &response);
        read_entries(response).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn post_form(&self, path: &str, body: String) -> RequestBuilder {
        self.client
            .post(self.url(path))
            .header(reqwest::header::CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(body)
    }
}

fn with_token(request: RequestBuilder, token: &str) -> RequestBuilder {
    request.header(SESSION_TOKEN_HEADER, token)
}

pub fn normalize_base_url(url: &str) -> Result<String> {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(Error::InvalidConfiguration(
            "Server URL must not be empty".to_string(),
        ));
    }
    if !is_http_url(trimmed) {
        return Err(Error::InvalidConfiguration(
            "Server URL must include http:// or https://".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

fn require_token(token: Option<&str>) -> Result<&str> {
    token
        .filter(|token| !token.trim().is_empty())
        .ok_or(Error::MissingToken)
}

fn form_body(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(key, value)| format!("{key}={}", encode_text(value)))
        .collect::<Vec<_>>()
        .join("&")
}

fn draft_form_body(id: Option<EntryId>, draft: &EntryDraft) -> String {
    let id = id.map(|id| id.to_string());
    let entry_date = draft.entry_date.format("%Y-%m-%d").to_string();

    let mut fields = Vec::with_capacity(4);
    if let Some(id) = id.as_deref() {
        fields.push(("id", id));
    }
    fields.push(("title", draft.title.as_str()));
    fields.push(("content", draft.content.as_str()));
    fields.push(("entry_date", entry_date.as_str()));
    form_body(&fields)
}

async fn read_entries(response: Response) -> Result<Vec<Entry>> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(Error::Unauthorized);
    }
    let body = response.text().await?;
    if !status.is_success() {
        return Err(server_error(status, body));
    }
    Ok(serde_json::from_str(&body)?)
}

async fn expect_mutation_success(response: Response) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    let body = response.text().await.unwrap_or_default();
    if status == StatusCode::UNAUTHORIZED || body.contains("Unauthorized") {
        return Err(Error::Unauthorized);
    }
    Err(server_error(status, body))
}

fn server_error(status: StatusCode, body: String) -> Error {
    let message = if body.trim().is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        body
    };
    Error::Server {
        status: status.as_u16(),
        message,
    }
}

fn log_response(endpoint: &str, response: &Response) {
    tracing::debug!("{} responded with {}", endpoint, response.status());
}
