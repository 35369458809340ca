use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rand::Rng;
use serde::Serialize;

use crate::models::github_user::GithubUser;
use crate::services::debouncer::Debouncer;
use crate::services::github_user_service::{ApiError, GitHubUserService};
use crate::validators;


pub const MISSING_INPUT: &str = "Please Enter a User Name";
pub const FETCH_FAILED: &str = "Error Fetching Data";
pub const RANDOM_EXHAUSTED: &str = "Could not find a random user after 3 attempts. Please try again.";

pub const RANDOM_ATTEMPTS: usize = 3;
/// Upper bound of the listing cursor drawn for a random lookup.
pub const MAX_SINCE_CURSOR: u64 = 100_000_000;

#[derive(Debug, Default)]
struct FinderState {
    query: String,
    suggestions: Vec<String>,
    profile: Option<GithubUser>,
    error: Option<String>,
    in_flight: usize,
}

/// What the view renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinderSnapshot {
    pub query: String,
    pub suggestions: Vec<String>,
    pub profile: Option<GithubUser>,
    pub error: Option<String>,
    /// A suggestion lookup is waiting out the quiet period or still running.
    pub pending: bool,
    pub loading: bool,
    pub can_search: bool,
    pub can_reset: bool,
    pub can_random: bool,
}

#[derive(Debug, thiserror::Error)]
enum AttemptError {
    #[error("no account listed after id {0}")]
    EmptyListing(u64),

    #[error(transparent)]
    Api(#[from] ApiError),
}

struct Shared {
    service: GitHubUserService,
    state: Mutex<FinderState>,
}

/// Holds the widget's state and runs its three lookups against GitHub.
///
/// Every operation turns its own failures into an error message on the
/// state; nothing is returned to the caller.
pub struct UserFinder {
    shared: Arc<Shared>,
    debouncer: Mutex<Debouncer>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Counts one outstanding operation for as long as it lives.
struct Loading<'a> {
    state: &'a Mutex<FinderState>,
}

impl<'a> Loading<'a> {
    fn begin(state: &'a Mutex<FinderState>) -> Self {
        lock(state).in_flight += 1;
        Loading { state }
    }
}

impl Drop for Loading<'_> {
    fn drop(&mut self) {
        let mut state = lock(self.state);
        state.in_flight = state.in_flight.saturating_sub(1);
    }
}

impl Shared {
    async fn refresh_suggestions(&self, text: String) {
        let _loading = Loading::begin(&self.state);
        let result = self.service.search_logins(&text).await;

        let mut state = lock(&self.state);
        if state.query != text {
            log::debug!("Dropping suggestions for outdated query {:?}", text);
            return;
        }
        state.suggestions = match result {
            Ok(logins) => logins,
            Err(err) => {
                log::warn!("Suggestion lookup for {:?} failed: {}", text, err);
                Vec::new()
            }
        };
    }

    async fn discover(&self, cursor: u64) -> Result<GithubUser, AttemptError> {
        let listed = self.service.list_since(cursor, 1).await?;
        let login = listed
            .into_iter()
            .next()
            .and_then(|user| user.login)
            .ok_or(AttemptError::EmptyListing(cursor))?;

        Ok(self.service.get_by_username(&login).await?)
    }
}

impl UserFinder {
    pub fn new(service: GitHubUserService, debounce: Duration) -> Self {
        UserFinder {
            shared: Arc::new(Shared {
                service,
                state: Mutex::new(FinderState::default()),
            }),
            debouncer: Mutex::new(Debouncer::new(debounce)),
        }
    }

    pub fn snapshot(&self) -> FinderSnapshot {
        let pending = lock(&self.debouncer).is_pending();
        let state = lock(&self.shared.state);
        let loading = state.in_flight > 0;

        FinderSnapshot {
            query: state.query.clone(),
            suggestions: state.suggestions.clone(),
            profile: state.profile.clone(),
            error: state.error.clone(),
            pending,
            loading,
            can_search: !loading && !validators::is_str_blank(&state.query),
            can_reset: !loading,
            can_random: !loading,
        }
    }

    /// Replaces the query text and reschedules the suggestion lookup.
    ///
    /// The debouncer lock is held across the write so that concurrent edits
    /// schedule their lookups in the same order they change the text.
    pub fn set_query(&self, text: impl Into<String>) {
        let text = text.into();
        let mut debouncer = lock(&self.debouncer);
        {
            let mut state = lock(&self.shared.state);
            if state.query == text {
                return;
            }
            state.query = text.clone();

            if validators::is_str_blank(&text) {
                debouncer.cancel();
                state.suggestions.clear();
                return;
            }
        }

        let shared = self.shared.clone();
        debouncer.schedule(async move {
            shared.refresh_suggestions(text).await;
        });
    }

    pub fn select_suggestion(&self, login: &str) {
        self.set_query(login);
    }

    /// Looks up the exact query text.
    pub async fn search(&self) {
        let query = lock(&self.shared.state).query.clone();

        if validators::is_str_blank(&query) {
            let mut state = lock(&self.shared.state);
            state.error = Some(MISSING_INPUT.into());
            state.profile = None;
            return;
        }

        let _loading = Loading::begin(&self.shared.state);
        let result = self.shared.service.get_by_username(&query).await;

        let mut state = lock(&self.shared.state);
        match result {
            Ok(user) => {
                log::info!("Found GitHub user {}", user.login);
                state.profile = Some(user);
                state.error = None;
            }
            Err(ApiError::Rejected { status, message }) => {
                log::info!("Lookup of {} rejected with {}", query, status);
                state.error = Some(message.unwrap_or_else(|| FETCH_FAILED.into()));
                state.profile = None;
            }
            Err(err) => {
                log::error!("Lookup of {} failed: {}", query, err);
                state.error = Some(FETCH_FAILED.into());
                state.profile = None;
            }
        }
    }

    /// Picks a random account from the listing, trying up to
    /// [`RANDOM_ATTEMPTS`] cursors.
    pub async fn random(&self) {
        let _loading = Loading::begin(&self.shared.state);
        {
            let mut state = lock(&self.shared.state);
            state.profile = None;
            state.error = None;
            state.suggestions.clear();
        }

        for attempt in 1..=RANDOM_ATTEMPTS {
            let cursor = rand::thread_rng().gen_range(1..=MAX_SINCE_CURSOR);

            match self.shared.discover(cursor).await {
                Ok(user) => {
                    let login = user.login.clone();
                    log::info!("Random lookup found {} on attempt {}", login, attempt);
                    {
                        let mut state = lock(&self.shared.state);
                        state.profile = Some(user);
                        state.error = None;
                    }
                    self.set_query(login);
                    return;
                }
                Err(err) => {
                    log::warn!("Random lookup attempt {}/{} failed: {}", attempt, RANDOM_ATTEMPTS, err);
                }
            }
        }

        lock(&self.shared.state).error = Some(RANDOM_EXHAUSTED.into());
    }

    pub fn reset(&self) {
        {
            let mut state = lock(&self.shared.state);
            state.profile = None;
            state.error = None;
        }
        self.set_query(String::new());
    }

    /// Resets the widget and hands back the loaded profile's page, if any.
    pub fn open_profile(&self) -> Option<String> {
        let url = lock(&self.shared.state)
            .profile
            .as_ref()
            .map(|user| user.html_url.clone())?;

        self.reset();
        Some(url)
    }
}
