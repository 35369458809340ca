pub mod debouncer;
pub mod github_user_service;
pub mod user_finder;
