//! Report generation.
//!
//! This module renders the co-occurrence matrix as a Markdown table or a
//! JSON document, and builds the short text summary shown after a run.

use crate::analysis::{collaborator_counts, top_pairs, Tally};
use crate::models::PairingReport;
use anyhow::Result;

/// Render names and counts as a Markdown table. Zero cells are left blank.
pub fn render_markdown_table(names: &[String], rows: &[Vec<u64>]) -> String {
    let mut output = String::new();

    let mut header = String::from("| |");
    let mut separator = String::from("|---|");
    for name in names {
        header.push_str(&format!(" {} |", name));
        separator.push_str("-----|");
    }
    output.push_str(&header);
    output.push('\n');
    output.push_str(&separator);
    output.push('\n');

    for (name, row) in names.iter().zip(rows) {
        let mut line = format!("| {} |", name);
        for &count in row {
            if count != 0 {
                line.push_str(&format!(" {} |", count));
            } else {
                line.push_str(" |");
            }
        }
        output.push_str(&line);
        output.push('\n');
    }

    output
}

/// Generate a JSON report.
pub fn generate_json_report(report: &PairingReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Generate a text summary of the tally.
pub fn generate_summary_text(tally: &Tally, top: usize) -> String {
    let mut lines = Vec::new();

    lines.push(format!("People: {}", tally.len()));

    let pairs = top_pairs(tally, top);
    if pairs.is_empty() {
        lines.push("No joint assignments found.".to_string());
        return lines.join("\n");
    }

    lines.push(String::new());
    lines.push("Most frequent pairings:".to_string());
    for (left, right, count) in pairs {
        lines.push(format!("- {} & {}: {}", left, right, count));
    }

    let mut partners = collaborator_counts(tally);
    partners.sort_by_key(|(_, count)| std::cmp::Reverse(*count));
    if let Some((name, count)) = partners.first() {
        lines.push(String::new());
        lines.push(format!("Widest collaborator: {} ({} partners)", name, count));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::build_tally;
    use crate::models::{AssignmentBatch, AssignmentGroup, ReportMetadata};
    use chrono::Utc;

    fn names(input: &[&str]) -> Vec<String> {
        input.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_render_table() {
        let table = render_markdown_table(
            &names(&["Alice", "Bob", "Carol"]),
            &[vec![0, 3, 1], vec![3, 0, 0], vec![1, 0, 0]],
        );

        let expected = "\
| | Alice | Bob | Carol |
|---|-----|-----|-----|
| Alice | | 3 | 1 |
| Bob | 3 | | |
| Carol | 1 | | |
";
        assert_eq!(table, expected);
    }

    #[test]
    fn test_render_empty_table_is_header_only() {
        let table = render_markdown_table(&[], &[]);
        assert_eq!(table, "| |\n|---|\n");
    }

    #[test]
    fn test_generate_json_report() {
        let report = PairingReport {
            metadata: ReportMetadata {
                project: "group/app".to_string(),
                root_uri: "https://gitlab.com/api/v4/".to_string(),
                generated_at: Utc::now(),
                milestones: vec!["Sprint 1".to_string()],
                issues_scanned: 4,
                pair_issues: 1,
                group_issues: 0,
                normalized: false,
            },
            names: names(&["Alice", "Bob"]),
            matrix: vec![vec![0, 1], vec![1, 0]],
        };
        let json = generate_json_report(&report).unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["names"][1], "Bob");
        assert_eq!(value["matrix"][0][1], 1);
        assert_eq!(value["metadata"]["project"], "group/app");
        assert_eq!(value["metadata"]["issues_scanned"], 4);
    }

    #[test]
    fn test_summary_text() {
        let pairs: Vec<AssignmentGroup> = vec![
            ["A", "B"].into_iter().collect(),
            ["A", "B"].into_iter().collect(),
            ["A", "C"].into_iter().collect(),
        ];
        let batch = AssignmentBatch {
            pairs,
            ..Default::default()
        };
        let summary = generate_summary_text(&build_tally(&batch, false), 5);

        assert!(summary.contains("People: 3"));
        assert!(summary.contains("- A & B: 2"));
        assert!(summary.contains("- A & C: 1"));
        assert!(summary.contains("Widest collaborator: A (2 partners)"));
    }

    #[test]
    fn test_summary_text_without_pairs() {
        let summary = generate_summary_text(&Tally::new(), 5);
        assert!(summary.contains("No joint assignments found."));
    }
}
