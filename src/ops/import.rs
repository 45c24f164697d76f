//! Loading taxonomy and question tables into model state.

use crate::model::{QuestionRecord, TaxonomyIndex};
use crate::parse::Table;

/// Error type for table schema problems
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("taxonomy file is missing required column '{column}' (found: {})", .found.join(", "))]
    MissingTaxonomyColumn { column: String, found: Vec<String> },
    #[error("questions file must contain columns: Question, Answer. Missing: {}. Found: {}", .missing.join(", "), .found.join(", "))]
    MissingQuestionColumns {
        missing: Vec<String>,
        found: Vec<String>,
    },
}

/// Build a `TaxonomyIndex` from a table with exact `Subject`, `Topic`,
/// `Subtopic` columns.
pub fn load_taxonomy(table: &Table) -> Result<TaxonomyIndex, SchemaError> {
    let mut indices = [0usize; 3];
    for (slot, column) in ["Subject", "Topic", "Subtopic"].iter().enumerate() {
        indices[slot] =
            table
                .column_index(column)
                .ok_or_else(|| SchemaError::MissingTaxonomyColumn {
                    column: column.to_string(),
                    found: table.columns.clone(),
                })?;
    }
    let [si, ti, sti] = indices;

    Ok(TaxonomyIndex::build(table.rows.iter().map(|row| {
        (row[si].clone(), row[ti].clone(), row[sti].clone())
    })))
}

/// Questions loaded from an uploaded table, plus the header text of the
/// columns that matched.
#[derive(Debug)]
pub struct LoadedQuestions {
    pub records: Vec<QuestionRecord>,
    pub question_col: String,
    pub answer_col: String,
}

/// Load question records from a table whose columns match `question` and
/// `answer` case-insensitively (headers trimmed before comparison). The
/// original header text is reported back so the workspace can remember its
/// source column bindings.
pub fn load_questions(table: &Table) -> Result<LoadedQuestions, SchemaError> {
    let question = table.column_index_loose("question");
    let answer = table.column_index_loose("answer");

    if question.is_none() || answer.is_none() {
        let mut missing = Vec::new();
        if question.is_none() {
            missing.push("Question".to_string());
        }
        if answer.is_none() {
            missing.push("Answer".to_string());
        }
        return Err(SchemaError::MissingQuestionColumns {
            missing,
            found: table.columns.clone(),
        });
    }

    let (qi, question_col) = question.unwrap();
    let (ai, answer_col) = answer.unwrap();
    let question_col = question_col.to_string();
    let answer_col = answer_col.to_string();

    let records = table
        .rows
        .iter()
        .map(|row| QuestionRecord {
            question: row[qi].clone(),
            answer: row[ai].clone(),
        })
        .collect();

    Ok(LoadedQuestions {
        records,
        question_col,
        answer_col,
    })
}
