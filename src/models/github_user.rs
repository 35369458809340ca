use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A GitHub profile from `/users/{login}`.
///
/// Fields the widget does not render are kept in `extra` so the record
/// holds everything the API returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GithubUser {
    pub login: String,
    #[serde(default)]
    pub id: u64,
    pub avatar_url: String,
    pub html_url: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response from `/search/users`.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub items: Vec<SearchUser>,
}

#[derive(Debug, Deserialize)]
pub struct SearchUser {
    pub login: String,
}

/// One entry of the `/users?since=` listing.
#[derive(Debug, Deserialize)]
pub struct ListedUser {
    #[serde(default)]
    pub login: Option<String>,
}

/// Body GitHub sends with a failed request.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}
