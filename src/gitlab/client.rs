//! HTTP client for the GitLab REST API.
//!
//! Only the two read endpoints the pairing analysis needs are wrapped:
//! project milestones and project issues filtered by milestone. Requests
//! authenticate with a personal access token in the `PRIVATE-TOKEN` header.

use crate::config::GitlabConfig;
use crate::models::{Issue, Milestone};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Header GitLab reads personal access tokens from.
const TOKEN_HEADER: &str = "PRIVATE-TOKEN";

/// Header carrying the next page number on paginated responses.
const NEXT_PAGE_HEADER: &str = "x-next-page";

/// GitLab client errors.
#[derive(Debug, Error)]
pub enum GitlabError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unauthorized ({0}): check the access token and its scopes")]
    Unauthorized(StatusCode),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("GitLab API error {0}: {1}")]
    Status(StatusCode, String),

    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Anything that can list milestones and the issues inside them.
#[allow(async_fn_in_trait)] // Only used through generics, never as dyn
pub trait IssueSource {
    async fn milestones(&self) -> Result<Vec<Milestone>, GitlabError>;
    async fn issues(&self, milestone: &str) -> Result<Vec<Issue>, GitlabError>;
}

/// Client bound to a single project.
#[derive(Debug, Clone)]
pub struct GitlabClient {
    root_uri: String,
    project: String,
    token: String,
    per_page: u32,
    client: Client,
}

impl GitlabClient {
    /// Create a client from validated configuration.
    pub fn new(config: &GitlabConfig) -> Result<Self, GitlabError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("pairgrid/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            root_uri: config.root_uri.trim_end_matches('/').to_string(),
            project: config.project_id.encoded(),
            token: config.token.clone(),
            per_page: config.per_page,
            client,
        })
    }

    /// Build a GET request for a project-scoped path with auth and paging.
    fn request(&self, path: &str, page: u32) -> RequestBuilder {
        let url = format!("{}/projects/{}/{}", self.root_uri, self.project, path);
        self.client
            .get(url)
            .header(TOKEN_HEADER, &self.token)
            .query(&[("per_page", self.per_page), ("page", page)])
    }

    /// Fetch every page of a list endpoint.
    async fn get_all<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<Vec<T>, GitlabError> {
        let mut items = Vec::new();
        let mut page = 1;

        loop {
            let request = self.request(path, page).query(params);
            let response = request.send().await?;
            let next = next_page(&response);
            let url = response.url().to_string();
            let body = handle_response(response).await?;

            let batch: Vec<T> = serde_json::from_str(&body)
                .map_err(|source| GitlabError::Decode { url, source })?;
            debug!("Fetched {} items from {} (page {})", batch.len(), path, page);
            items.extend(batch);

            match following_page(page, next) {
                Some(n) => page = n,
                None => break,
            }
        }

        Ok(items)
    }
}

impl IssueSource for GitlabClient {
    async fn milestones(&self) -> Result<Vec<Milestone>, GitlabError> {
        let milestones: Vec<Milestone> = self.get_all("milestones", &[]).await?;
        info!("Found {} milestones in project {}", milestones.len(), self.project);
        Ok(milestones)
    }

    async fn issues(&self, milestone: &str) -> Result<Vec<Issue>, GitlabError> {
        self.get_all("issues", &[("milestone", milestone)]).await
    }
}

/// Read the next page number; an empty header marks the last page.
fn next_page(response: &Response) -> Option<u32> {
    response
        .headers()
        .get(NEXT_PAGE_HEADER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Page to request after `page`, or `None` when done.
///
/// A header that does not move forward ends the walk.
fn following_page(page: u32, next: Option<u32>) -> Option<u32> {
    next.filter(|&n| n > page)
}

/// Return the body of a successful response, or map the status to an error.
async fn handle_response(response: Response) -> Result<String, GitlabError> {
    let status = response.status();
    let url = response.url().to_string();
    if status.is_success() {
        return Ok(response.text().await?);
    }

    let body = response.text().await.unwrap_or_default();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(GitlabError::Unauthorized(status)),
        StatusCode::NOT_FOUND => Err(GitlabError::NotFound(url)),
        _ => Err(GitlabError::Status(status, body)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProjectId;

    fn test_config() -> GitlabConfig {
        GitlabConfig {
            root_uri: "https://gitlab.example.com/api/v4/".to_string(),
            project_id: ProjectId::Path("team/app".to_string()),
            token: "glpat-secret".to_string(),
            per_page: 50,
            timeout_seconds: 10,
        }
    }

    #[test]
    fn test_request_carries_token_and_paging() {
        let client = GitlabClient::new(&test_config()).unwrap();
        let request = client.request("milestones", 2).build().unwrap();

        assert_eq!(request.method(), &reqwest::Method::GET);
        assert_eq!(
            request.url().as_str(),
            "https://gitlab.example.com/api/v4/projects/team%2Fapp/milestones?per_page=50&page=2"
        );
        assert_eq!(request.headers()[TOKEN_HEADER], "glpat-secret");
    }

    #[test]
    fn test_issue_request_encodes_milestone_title() {
        let client = GitlabClient::new(&test_config()).unwrap();
        let request = client
            .request("issues", 1)
            .query(&[("milestone", "Sprint 3 & review")])
            .build()
            .unwrap();

        let query = request.url().query().unwrap();
        assert!(query.contains("milestone=Sprint+3+%26+review"));
        assert!(request.url().path().ends_with("/projects/team%2Fapp/issues"));
    }

    #[test]
    fn test_numeric_project_id() {
        let mut config = test_config();
        config.project_id = ProjectId::Number(42);
        let client = GitlabClient::new(&config).unwrap();
        let request = client.request("issues", 1).build().unwrap();

        assert!(request.url().path().ends_with("/projects/42/issues"));
    }

    fn response(status: u16, next: Option<&str>, body: &str) -> Response {
        let mut builder = http::Response::builder().status(status);
        if let Some(value) = next {
            builder = builder.header(NEXT_PAGE_HEADER, value);
        }
        Response::from(builder.body(body.to_string()).unwrap())
    }

    #[test]
    fn test_next_page_header() {
        assert_eq!(next_page(&response(200, Some("3"), "[]")), Some(3));
        assert_eq!(next_page(&response(200, Some(""), "[]")), None);
        assert_eq!(next_page(&response(200, None, "[]")), None);
        assert_eq!(next_page(&response(200, Some("soon"), "[]")), None);
    }

    #[test]
    fn test_following_page_only_moves_forward() {
        assert_eq!(following_page(1, Some(2)), Some(2));
        assert_eq!(following_page(2, Some(5)), Some(5));
        assert_eq!(following_page(3, Some(3)), None);
        assert_eq!(following_page(3, Some(1)), None);
        assert_eq!(following_page(4, None), None);
    }

    #[test]
    fn test_handle_response_returns_body_on_success() {
        let body = tokio_test::block_on(handle_response(response(200, None, r#"[{"title":"v1"}]"#)))
            .unwrap();
        assert_eq!(body, r#"[{"title":"v1"}]"#);
    }

    #[test]
    fn test_handle_response_maps_statuses() {
        let forbidden = tokio_test::block_on(handle_response(response(403, None, "")));
        assert!(matches!(
            forbidden,
            Err(GitlabError::Unauthorized(status)) if status == StatusCode::FORBIDDEN
        ));

        let unauthorized = tokio_test::block_on(handle_response(response(401, None, "")));
        assert!(matches!(unauthorized, Err(GitlabError::Unauthorized(_))));

        let missing = tokio_test::block_on(handle_response(response(404, None, "")));
        assert!(matches!(missing, Err(GitlabError::NotFound(_))));

        let failed = tokio_test::block_on(handle_response(response(500, None, "oops")));
        assert!(matches!(
            failed,
            Err(GitlabError::Status(status, ref body))
                if status == StatusCode::INTERNAL_SERVER_ERROR && body == "oops"
        ));
    }

    #[test]
    fn test_error_messages() {
        let err = GitlabError::Status(StatusCode::BAD_GATEWAY, "upstream".to_string());
        assert_eq!(err.to_string(), "GitLab API error 502 Bad Gateway: upstream");

        let err = GitlabError::Unauthorized(StatusCode::UNAUTHORIZED);
        assert!(err.to_string().contains("access token"));
    }
}
