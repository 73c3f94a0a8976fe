//! GitHub repository lookup for profile pages.

use anyhow::{anyhow, Context, Result};
use reqwest::{StatusCode, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("devconnector-backend/", env!("CARGO_PKG_VERSION"));
const REPO_LIMIT: &str = "4";

pub struct GithubClient {
    http: reqwest::Client,
    api_url: String,
    credentials: Option<(String, String)>,
}

#[derive(Debug)]
pub enum GithubError {
    /// GitHub answered with anything but 200
    NoProfile(StatusCode),
    Upstream(anyhow::Error),
}

impl GithubClient {
    pub fn new(
        api_url: &str,
        client_id: Option<String>,
        client_secret: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            api_url: api_url.to_string(),
            credentials: client_id.zip(client_secret),
        })
    }

    /// `<api>/users/<username>/repos`, oldest first, capped at four.
    pub fn repos_url(&self, username: &str) -> Result<Url> {
        let mut url = Url::parse(&self.api_url)
            .with_context(|| format!("Invalid GitHub API url: {}", self.api_url))?;

        url.path_segments_mut()
            .map_err(|_| anyhow!("GitHub API url cannot be a base: {}", self.api_url))?
            .pop_if_empty()
            .extend(["users", username, "repos"]);

        url.query_pairs_mut()
            .append_pair("per_page", REPO_LIMIT)
            .append_pair("sort", "created")
            .append_pair("direction", "asc");

        Ok(url)
    }

    /// The repo list exactly as GitHub returns it
    pub async fn user_repos(&self, username: &str) -> Result<Value, GithubError> {
        let url = self.repos_url(username).map_err(GithubError::Upstream)?;
        debug!("Fetching GitHub repos: {}", url);

        let mut request = self.http.get(url);
        if let Some((id, secret)) = &self.credentials {
            request = request.basic_auth(id, Some(secret));
        }

        let response = request
            .send()
            .await
            .context("GitHub request failed")
            .map_err(GithubError::Upstream)?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!("GitHub returned {} for user {}", status, username);
            return Err(GithubError::NoProfile(status));
        }

        response
            .json::<Value>()
            .await
            .context("Failed to decode GitHub response")
            .map_err(GithubError::Upstream)
    }
}
