use std::collections::BTreeMap;

use super::mapping::Mapping;
use super::question::QuestionRecord;

/// Per-question tag lists, keyed by question index.
///
/// Invariant: every tracked question holds at least one mapping. The map is
/// ordered by index so exports and listings are stable.
pub type TaggingState = BTreeMap<usize, Vec<Mapping>>;

/// An independently persisted bundle: one question set, its tagging state,
/// and the source column-name bindings from the uploaded table.
///
/// Exactly one workspace is active at a time; every operation takes the
/// workspace explicitly rather than going through ambient state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Workspace {
    pub name: String,
    pub records: Vec<QuestionRecord>,
    pub tags: TaggingState,
    /// Header text of the uploaded column matched as "question"
    pub question_col: String,
    /// Header text of the uploaded column matched as "answer"
    pub answer_col: String,
}

impl Workspace {
    pub fn new(name: &str) -> Workspace {
        Workspace {
            name: name.to_string(),
            question_col: "Question".to_string(),
            answer_col: "Answer".to_string(),
            ..Default::default()
        }
    }

    /// Mappings for a question, or an empty slice if the index is untracked
    pub fn mappings(&self, idx: usize) -> &[Mapping] {
        self.tags.get(&idx).map(|m| m.as_slice()).unwrap_or(&[])
    }
}
