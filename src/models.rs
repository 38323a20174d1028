//! Data models for the pairing report.
//!
//! This module contains the GitLab records the tool consumes, the
//! assignment groups extracted from them, and the serializable report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A GitLab milestone. Only the title is needed to fetch its issues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    /// Global milestone id.
    #[serde(default)]
    pub id: Option<u64>,
    /// Milestone title, used as the `milestone` filter on the issues endpoint.
    pub title: String,
    /// "active" or "closed".
    #[serde(default)]
    pub state: Option<String>,
}

/// A person assigned to an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignee {
    /// Display name; this is what ends up in the matrix.
    pub name: String,
    #[serde(default)]
    pub username: Option<String>,
}

/// A GitLab issue, reduced to what the pairing analysis reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Project-scoped issue number.
    #[serde(default)]
    pub iid: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
    /// Assignees in the order the API returned them.
    #[serde(default)]
    pub assignees: Vec<Assignee>,
}

/// The ordered assignee names of one issue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssignmentGroup(pub Vec<String>);

impl AssignmentGroup {
    /// Build a group from an issue, keeping the API's assignee order.
    pub fn from_issue(issue: &Issue) -> Self {
        Self(issue.assignees.iter().map(|a| a.name.clone()).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Exactly two assignees.
    pub fn is_pair(&self) -> bool {
        self.0.len() == 2
    }

    /// More than two assignees.
    pub fn is_multi(&self) -> bool {
        self.0.len() > 2
    }

    /// Same members, sorted by name, so that `[B, A]` and `[A, B]` count as one tuple.
    pub fn normalized(&self) -> Self {
        let mut names = self.0.clone();
        names.sort();
        Self(names)
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for AssignmentGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.0.join(", "))
    }
}

impl<S: Into<String>> FromIterator<S> for AssignmentGroup {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Pairs and multi-groups collected across one or more milestones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentBatch {
    /// Issues with exactly two assignees.
    pub pairs: Vec<AssignmentGroup>,
    /// Issues with more than two assignees.
    pub groups: Vec<AssignmentGroup>,
    /// Titles of the milestones that contributed to this batch.
    pub milestones: Vec<String>,
    /// Every issue looked at, including unassigned and solo ones.
    pub issues_seen: usize,
}

impl AssignmentBatch {
    /// Classify each issue's assignees. Groups of size 0 or 1 are dropped.
    pub fn extend_from_issues(&mut self, issues: &[Issue]) {
        for issue in issues {
            self.issues_seen += 1;
            let group = AssignmentGroup::from_issue(issue);
            if group.is_pair() {
                self.pairs.push(group);
            } else if group.is_multi() {
                self.groups.push(group);
            }
        }
    }

    /// Append another batch, keeping discovery order.
    pub fn merge(&mut self, other: AssignmentBatch) {
        self.pairs.extend(other.pairs);
        self.groups.extend(other.groups);
        self.milestones.extend(other.milestones);
        self.issues_seen += other.issues_seen;
    }
}

/// Metadata about a pairing report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Project id or path as configured.
    pub project: String,
    /// API root the data came from.
    pub root_uri: String,
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Milestones that were processed, in order.
    pub milestones: Vec<String>,
    /// Number of issues looked at across all milestones.
    pub issues_scanned: usize,
    /// Issues with exactly two assignees.
    pub pair_issues: usize,
    /// Issues with more than two assignees.
    pub group_issues: usize,
    /// Whether assignee order was normalized before counting.
    pub normalized: bool,
}

/// The complete co-occurrence report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairingReport {
    pub metadata: ReportMetadata,
    /// Names in discovery order.
    pub names: Vec<String>,
    /// Square matrix aligned with `names`.
    pub matrix: Vec<Vec<u64>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(names: &[&str]) -> Issue {
        Issue {
            iid: None,
            title: None,
            assignees: names
                .iter()
                .map(|n| Assignee {
                    name: n.to_string(),
                    username: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_issue_without_assignees_field() {
        let issue: Issue = serde_json::from_str(r#"{"iid": 7, "title": "Fix login"}"#).unwrap();
        assert_eq!(issue.iid, Some(7));
        assert!(issue.assignees.is_empty());
    }

    #[test]
    fn test_issue_ignores_unknown_fields() {
        let json = r#"{
            "iid": 3,
            "state": "opened",
            "assignees": [{"id": 1, "name": "Alice", "username": "alice", "avatar_url": null}]
        }"#;
        let issue: Issue = serde_json::from_str(json).unwrap();
        assert_eq!(issue.assignees[0].name, "Alice");
        assert_eq!(issue.assignees[0].username.as_deref(), Some("alice"));
    }

    #[test]
    fn test_group_classification() {
        assert!(AssignmentGroup::from_issue(&issue(&["A", "B"])).is_pair());
        assert!(AssignmentGroup::from_issue(&issue(&["A", "B", "C"])).is_multi());

        let solo = AssignmentGroup::from_issue(&issue(&["A"]));
        assert!(!solo.is_pair());
        assert!(!solo.is_multi());
    }

    #[test]
    fn test_normalized_sorts_names() {
        let group: AssignmentGroup = ["Bob", "Alice"].into_iter().collect();
        assert_eq!(group.normalized().names(), &["Alice", "Bob"]);
        assert_eq!(group.names(), &["Bob", "Alice"]);
    }

    #[test]
    fn test_batch_extend_and_merge() {
        let mut first = AssignmentBatch::default();
        first.extend_from_issues(&[
            issue(&[]),
            issue(&["A"]),
            issue(&["A", "B"]),
            issue(&["A", "B", "C"]),
        ]);
        assert_eq!(first.issues_seen, 4);
        assert_eq!(first.pairs.len(), 1);
        assert_eq!(first.groups.len(), 1);

        let mut second = AssignmentBatch::default();
        second.extend_from_issues(&[issue(&["C", "D"])]);
        second.milestones.push("Sprint 2".to_string());

        first.merge(second);
        assert_eq!(first.issues_seen, 5);
        assert_eq!(first.pairs.len(), 2);
        assert_eq!(first.pairs[1].names(), &["C", "D"]);
        assert_eq!(first.milestones, vec!["Sprint 2"]);
    }

    #[test]
    fn test_group_display() {
        let group: AssignmentGroup = ["A", "B", "C"].into_iter().collect();
        assert_eq!(group.to_string(), "(A, B, C)");
    }
}
