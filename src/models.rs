pub mod github_user;
