use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use crate::models::github_user::{ErrorBody, GithubUser, ListedUser, SearchResponse};


pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Page size for `/search/users`; suggestions never exceed it.
pub const SUGGESTION_LIMIT: usize = 5;

const USER_AGENT: &str = "github-user-finder";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("GitHub answered {status}")]
    Rejected {
        status: StatusCode,
        message: Option<String>,
    },

    #[error("network: {0}")]
    Network(#[from] reqwest::Error),

    #[error("decode: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Unauthenticated access to the three GitHub endpoints the finder uses.
#[derive(Debug, Clone)]
pub struct GitHubUserService {
    pub client: Client,
    pub base_url: String,
}

impl GitHubUserService {
    pub fn new(client: Client, base_url: &str) -> Self {
        GitHubUserService {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Logins matching `text`, in the order GitHub ranks them.
    #[tracing::instrument(skip(self))]
    pub async fn search_logins(&self, text: &str) -> Result<Vec<String>, ApiError> {
        let url = format!(
            "{}/search/users?q={}&per_page={}",
            self.base_url,
            urlencoding::encode(text),
            SUGGESTION_LIMIT
        );
        let response: SearchResponse = self.get_json(&url).await?;

        Ok(response
            .items
            .into_iter()
            .take(SUGGESTION_LIMIT)
            .map(|item| item.login)
            .collect())
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_by_username(&self, login: &str) -> Result<GithubUser, ApiError> {
        let url = format!("{}/users/{}", self.base_url, urlencoding::encode(login));
        self.get_json(&url).await
    }

    /// One page of the account listing, starting after account id `since`.
    #[tracing::instrument(skip(self))]
    pub async fn list_since(&self, since: u64, per_page: u32) -> Result<Vec<ListedUser>, ApiError> {
        let url = format!("{}/users?since={}&per_page={}", self.base_url, since, per_page);
        self.get_json(&url).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        log::info!("Making request to {}...", url);

        let response = self.client.get(url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        let contents = response.text().await?;

        if !status.is_success() {
            log::error!("{:?} from {}", status, url);
            let message = serde_json::from_str::<ErrorBody>(&contents)
                .ok()
                .and_then(|body| body.message)
                .filter(|message| !message.is_empty());
            return Err(ApiError::Rejected { status, message });
        }

        Ok(serde_json::from_str(&contents)?)
    }
}
