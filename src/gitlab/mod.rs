//! GitLab API access.

pub mod client;

pub use client::{GitlabClient, GitlabError, IssueSource};
