//! In-process stand-in for the GitHub REST API.
//!
//! Serves `/search/users`, `/users/:login` and `/users` from canned data and
//! records every call so tests can assert on network traffic.

use std::collections::{HashMap, VecDeque};
use std::net::{SocketAddr, TcpListener};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

/// What the listing endpoint answers, one entry per call.
#[derive(Debug, Clone)]
pub enum ListReply {
    Users(Vec<&'static str>),
    Empty,
    Status(u16),
}

#[derive(Default)]
pub struct Calls {
    search: Mutex<Vec<(String, usize)>>,
    users: Mutex<Vec<String>>,
    listing: Mutex<Vec<u64>>,
}

impl Calls {
    pub fn search_queries(&self) -> Vec<String> {
        self.search.lock().unwrap().iter().map(|(q, _)| q.clone()).collect()
    }

    pub fn search_page_sizes(&self) -> Vec<usize> {
        self.search.lock().unwrap().iter().map(|(_, n)| *n).collect()
    }

    pub fn user_lookups(&self) -> Vec<String> {
        self.users.lock().unwrap().clone()
    }

    pub fn list_cursors(&self) -> Vec<u64> {
        self.listing.lock().unwrap().clone()
    }
}

#[derive(Default)]
pub struct MockGithub {
    users: HashMap<String, Value>,
    broken_users: Vec<String>,
    search_results: Vec<String>,
    search_delays: HashMap<String, Duration>,
    failing_search: bool,
    listing: VecDeque<ListReply>,
}

pub struct RunningMock {
    pub base_url: String,
    pub calls: Arc<Calls>,
}

struct MockState {
    config: MockGithub,
    listing: Mutex<VecDeque<ListReply>>,
    calls: Arc<Calls>,
}

#[derive(Deserialize)]
struct SearchParams {
    q: String,
    per_page: usize,
}

#[derive(Deserialize)]
struct ListParams {
    since: u64,
    #[allow(dead_code)]
    per_page: u32,
}

pub fn profile_json(login: &str) -> Value {
    json!({
        "login": login,
        "id": 1000 + login.len() as u64,
        "avatar_url": format!("https://avatars.githubusercontent.com/{login}"),
        "html_url": format!("https://github.com/{login}"),
        "name": null,
        "bio": format!("bio of {login}"),
        "public_repos": 7,
    })
}

/// A base URL nothing listens on.
pub fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

impl MockGithub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, login: &str) -> Self {
        self.users.insert(login.to_string(), profile_json(login));
        self
    }

    /// `login` answers 502 with a body that has no `message`.
    pub fn with_broken_user(mut self, login: &str) -> Self {
        self.broken_users.push(login.to_string());
        self
    }

    /// Search returns every entry containing the query, ignoring `per_page`.
    pub fn with_search_results(mut self, logins: &[&str]) -> Self {
        self.search_results = logins.iter().map(|l| l.to_string()).collect();
        self
    }

    pub fn with_search_delay(mut self, query: &str, delay: Duration) -> Self {
        self.search_delays.insert(query.to_string(), delay);
        self
    }

    pub fn failing_search(mut self) -> Self {
        self.failing_search = true;
        self
    }

    pub fn with_listing(mut self, replies: Vec<ListReply>) -> Self {
        self.listing = replies.into();
        self
    }

    pub async fn spawn(self) -> RunningMock {
        let calls = Arc::new(Calls::default());
        let state = Arc::new(MockState {
            listing: Mutex::new(self.listing.clone()),
            config: self,
            calls: calls.clone(),
        });

        let app = Router::new()
            .route("/search/users", get(search_users))
            .route("/users", get(list_users))
            .route("/users/:login", get(get_user))
            .with_state(state);

        RunningMock {
            base_url: serve(app),
            calls,
        }
    }
}

/// Serves `app` on an ephemeral local port and returns its base URL.
pub fn serve(app: Router) -> String {
    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).unwrap();
    listener.set_nonblocking(true).unwrap();
    let addr = listener.local_addr().unwrap();
    let server = axum::Server::from_tcp(listener)
        .unwrap()
        .serve(app.into_make_service());
    tokio::spawn(server);

    format!("http://{addr}")
}

fn failure(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

async fn search_users(
    State(state): State<Arc<MockState>>,
    Query(params): Query<SearchParams>,
) -> Response {
    state.calls.search.lock().unwrap().push((params.q.clone(), params.per_page));

    if let Some(delay) = state.config.search_delays.get(&params.q) {
        tokio::time::sleep(*delay).await;
    }
    if state.config.failing_search {
        return failure(StatusCode::SERVICE_UNAVAILABLE, "Service Unavailable");
    }

    let needle = params.q.to_lowercase();
    let items: Vec<Value> = state
        .config
        .search_results
        .iter()
        .filter(|login| login.to_lowercase().contains(&needle))
        .map(|login| json!({ "login": login, "type": "User" }))
        .collect();

    Json(json!({ "total_count": items.len(), "items": items })).into_response()
}

async fn get_user(State(state): State<Arc<MockState>>, Path(login): Path<String>) -> Response {
    state.calls.users.lock().unwrap().push(login.clone());

    if state.config.broken_users.contains(&login) {
        return (StatusCode::BAD_GATEWAY, Json(json!({}))).into_response();
    }
    match state.config.users.get(&login) {
        Some(profile) => Json(profile.clone()).into_response(),
        None => failure(StatusCode::NOT_FOUND, "Not Found"),
    }
}

async fn list_users(
    State(state): State<Arc<MockState>>,
    Query(params): Query<ListParams>,
) -> Response {
    state.calls.listing.lock().unwrap().push(params.since);

    let reply = state.listing.lock().unwrap().pop_front().unwrap_or(ListReply::Empty);
    match reply {
        ListReply::Users(logins) => {
            let users: Vec<Value> = logins.iter().map(|login| json!({ "login": login })).collect();
            Json(Value::Array(users)).into_response()
        }
        ListReply::Empty => Json(json!([])).into_response(),
        ListReply::Status(code) => failure(
            StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            "listing failed",
        ),
    }
}
