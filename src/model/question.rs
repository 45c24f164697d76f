use serde::{Deserialize, Serialize};

/// One uploaded question/answer record.
///
/// Identity is the record's load-time index in the workspace; the text is
/// immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub question: String,
    pub answer: String,
}
