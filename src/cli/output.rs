use serde::Serialize;

use crate::model::{Mapping, TaxonomyIndex};
use crate::ops::check::Finding;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct MappingJson {
    pub pos: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtopic: Option<String>,
    pub complete: bool,
    pub valid: bool,
}

impl MappingJson {
    pub fn new(pos: usize, mapping: &Mapping, taxonomy: &TaxonomyIndex) -> MappingJson {
        MappingJson {
            pos,
            subject: mapping.subject.clone(),
            topic: mapping.topic.clone(),
            subtopic: mapping.subtopic.clone(),
            complete: mapping.is_complete(),
            valid: mapping.is_valid(taxonomy),
        }
    }
}

#[derive(Serialize)]
pub struct QuestionJson {
    pub index: usize,
    pub question: String,
    pub answer: String,
    pub mappings: Vec<MappingJson>,
}

#[derive(Serialize)]
pub struct QuestionListJson {
    pub workspace: String,
    pub questions: Vec<QuestionJson>,
}

#[derive(Serialize)]
pub struct StatsJson {
    pub workspace: String,
    pub questions: usize,
    pub tagged_mappings: usize,
    pub total_mappings: usize,
}

#[derive(Serialize)]
pub struct WorkspaceListJson {
    pub active: String,
    pub workspaces: Vec<String>,
}

#[derive(Serialize)]
pub struct FindingJson {
    pub question: usize,
    pub mapping: usize,
    pub problem: String,
}

impl From<&Finding> for FindingJson {
    fn from(f: &Finding) -> FindingJson {
        FindingJson {
            question: f.question,
            mapping: f.mapping,
            problem: f.problem.to_string(),
        }
    }
}

#[derive(Serialize)]
pub struct CheckJson {
    pub workspace: String,
    pub findings: Vec<FindingJson>,
}

// ---------------------------------------------------------------------------
// Plain-text helpers
// ---------------------------------------------------------------------------

/// Render one mapping as `Subject > Topic > Subtopic`, with `(unset)` for
/// empty fields and a trailing `?` when the chain is stale.
pub fn format_mapping(mapping: &Mapping, taxonomy: &TaxonomyIndex) -> String {
    let part = |v: &Option<String>| v.clone().unwrap_or_else(|| "(unset)".to_string());
    let mut line = format!(
        "{} > {} > {}",
        part(&mapping.subject),
        part(&mapping.topic),
        part(&mapping.subtopic)
    );
    if !mapping.is_valid(taxonomy) {
        line.push_str("  ?");
    }
    line
}

/// Shorten long question text for one-line listings
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}
