//! Flattening a workspace into export rows.

use crate::model::Workspace;
use crate::parse::Table;

/// One row of the export: a question paired with one of its mappings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    pub question: String,
    pub answer: String,
    pub subject: String,
    pub topic: String,
    pub subtopic: String,
}

/// Flatten the workspace into one row per (question, mapping) pair.
///
/// A question with at least one non-empty mapping emits one row per mapping,
/// empty mappings included (their fields render as empty strings). Only a
/// question whose mappings are all empty collapses to exactly one row with
/// blank tag fields, so no question ever disappears from the export. Rows
/// are ordered by question index, then mapping position.
pub fn flatten(ws: &Workspace) -> Vec<ExportRow> {
    let mut rows = Vec::new();
    for (idx, record) in ws.records.iter().enumerate() {
        let mappings = ws.mappings(idx);
        if mappings.iter().any(|m| !m.is_empty()) {
            for mapping in mappings {
                rows.push(ExportRow {
                    question: record.question.clone(),
                    answer: record.answer.clone(),
                    subject: mapping.subject.clone().unwrap_or_default(),
                    topic: mapping.topic.clone().unwrap_or_default(),
                    subtopic: mapping.subtopic.clone().unwrap_or_default(),
                });
            }
        } else {
            rows.push(ExportRow {
                question: record.question.clone(),
                answer: record.answer.clone(),
                subject: String::new(),
                topic: String::new(),
                subtopic: String::new(),
            });
        }
    }
    rows
}

/// Render export rows as a table with the canonical output columns
pub fn export_table(rows: &[ExportRow]) -> Table {
    let mut table = Table::new(
        ["Question", "Answer", "Subject", "Topic", "Subtopic"]
            .into_iter()
            .map(String::from)
            .collect(),
    );
    for row in rows {
        table.rows.push(vec![
            row.question.clone(),
            row.answer.clone(),
            row.subject.clone(),
            row.topic.clone(),
            row.subtopic.clone(),
        ]);
    }
    table
}
