//! Collect assignment groups from an issue source, milestone by milestone.

use crate::gitlab::{GitlabError, IssueSource};
use crate::models::AssignmentBatch;
use indicatif::ProgressBar;
use tracing::{debug, info, warn};

/// Walk the source's milestones and classify every issue's assignees.
///
/// When `only` is non-empty, milestones whose title is not listed are skipped.
/// Requests are made one after another; the first failure aborts the run.
pub async fn collect_assignments<S: IssueSource>(
    source: &S,
    only: &[String],
    progress: Option<&ProgressBar>,
) -> Result<AssignmentBatch, GitlabError> {
    let milestones = source.milestones().await?;
    let mut batch = AssignmentBatch::default();

    for milestone in &milestones {
        if !only.is_empty() && !only.iter().any(|t| t == &milestone.title) {
            debug!("Skipping milestone '{}'", milestone.title);
            continue;
        }

        if let Some(pb) = progress {
            pb.set_message(format!("Fetching issues for '{}'", milestone.title));
        }

        let issues = source.issues(&milestone.title).await?;
        let mut current = AssignmentBatch::default();
        current.extend_from_issues(&issues);
        current.milestones.push(milestone.title.clone());
        info!(
            "Milestone '{}': {} issues, {} pairs, {} groups",
            milestone.title,
            current.issues_seen,
            current.pairs.len(),
            current.groups.len()
        );

        batch.merge(current);
    }

    for title in only {
        if !batch.milestones.contains(title) {
            warn!("Milestone '{}' not found in project", title);
        }
    }

    Ok(batch)
}
