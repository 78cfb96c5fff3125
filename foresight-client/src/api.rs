//! Read-only REST client for the profile and cash-flow endpoints.

use foresight_core::{DailyClosingBalance, ImportantDatesRecord};
use reqwest::Url;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use tracing::debug;

use crate::error::FetchError;
use crate::payload::{decode_forecast, decode_profile};

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, FetchError> {
        let base_url =
            Url::parse(base_url).map_err(|_| FetchError::InvalidUrl(base_url.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(FetchError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    /// `GET /api/user/profile?userId=...` and extract `profile.important_dates`.
    ///
    /// `Ok(None)` means the profile has no usable important dates.
    pub async fn fetch_profile(
        &self,
        user_id: &str,
    ) -> Result<Option<ImportantDatesRecord>, FetchError> {
        let mut url = self.endpoint(&["api", "user", "profile"])?;
        url.query_pairs_mut().append_pair("userId", user_id);
        let body = self.get_text(url).await?;
        Ok(decode_profile(&body))
    }

    /// `GET /api/cash-flow/backward-compatibility/{email}` and extract the
    /// daily closing balances.
    pub async fn fetch_forecast(
        &self,
        email: &str,
    ) -> Result<Vec<DailyClosingBalance>, FetchError> {
        let url = self.endpoint(&["api", "cash-flow", "backward-compatibility", email])?;
        let body = self.get_text(url).await?;
        Ok(decode_forecast(&body))
    }

    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| FetchError::InvalidUrl(self.base_url.to_string()))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    fn headers(&self) -> Result<HeaderMap, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = &self.token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| FetchError::InvalidToken)?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    async fn get_text(&self, url: Url) -> Result<String, FetchError> {
        let shown = url.to_string();
        debug!(url = %shown, auth = self.token.is_some(), "GET");

        let resp = self
            .http
            .get(url)
            .headers(self.headers()?)
            .send()
            .await
            .map_err(|source| FetchError::Transport { url: shown.clone(), source })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status { url: shown, status });
        }

        resp.text()
            .await
            .map_err(|source| FetchError::Transport { url: shown, source })
    }
}
