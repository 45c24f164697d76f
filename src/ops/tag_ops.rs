//! Mutations over a workspace's tagging state.
//!
//! The central rule lives in `set_field`: changing a mapping's subject clears
//! its topic and subtopic, and changing its topic clears its subtopic, so a
//! mapping can never display a child selection its parent no longer admits.

use crate::model::{Field, Mapping, TaggingState, TaxonomyIndex};

/// Error type for tagging operations
#[derive(Debug, thiserror::Error)]
pub enum TagError {
    #[error("no question at index {0}")]
    NoSuchQuestion(usize),
    #[error("question {0} has no mapping at position {1}")]
    NoSuchMapping(usize, usize),
    #[error("cannot remove the only mapping on question {0}: each question keeps at least one")]
    LastMapping(usize),
    #[error("'{value}' is not a {field} option here")]
    NotInTaxonomy { field: Field, value: String },
}

/// Make sure a question has a mapping list, starting with one empty mapping.
/// Idempotent; an existing list is untouched.
pub fn ensure_question(tags: &mut TaggingState, idx: usize) {
    tags.entry(idx).or_insert_with(|| vec![Mapping::default()]);
}

/// Append an empty mapping to a question's list. Any number may accumulate.
pub fn add_mapping(tags: &mut TaggingState, idx: usize) -> Result<(), TagError> {
    let list = tags.get_mut(&idx).ok_or(TagError::NoSuchQuestion(idx))?;
    list.push(Mapping::default());
    Ok(())
}

/// Remove the mapping at `pos`. A question always retains at least one
/// mapping, so removing from a single-element list fails and leaves the
/// state unchanged.
pub fn remove_mapping(tags: &mut TaggingState, idx: usize, pos: usize) -> Result<(), TagError> {
    let list = tags.get_mut(&idx).ok_or(TagError::NoSuchQuestion(idx))?;
    if pos >= list.len() {
        return Err(TagError::NoSuchMapping(idx, pos));
    }
    if list.len() == 1 {
        return Err(TagError::LastMapping(idx));
    }
    list.remove(pos);
    Ok(())
}

/// Set one field of one mapping, validating taxonomy membership and applying
/// the cascade reset. `value = None` unsets the field; unsetting cascades the
/// same way a change does.
pub fn set_field(
    tags: &mut TaggingState,
    taxonomy: &TaxonomyIndex,
    idx: usize,
    pos: usize,
    field: Field,
    value: Option<&str>,
) -> Result<(), TagError> {
    let list = tags.get_mut(&idx).ok_or(TagError::NoSuchQuestion(idx))?;
    let mapping = list
        .get_mut(pos)
        .ok_or(TagError::NoSuchMapping(idx, pos))?;

    // Membership check against the options the current parent chain offers
    if let Some(value) = value {
        let known = match field {
            Field::Subject => taxonomy.has_subject(value),
            Field::Topic => mapping
                .subject
                .as_deref()
                .is_some_and(|s| taxonomy.has_topic(s, value)),
            Field::Subtopic => match (mapping.subject.as_deref(), mapping.topic.as_deref()) {
                (Some(s), Some(t)) => taxonomy.has_subtopic(s, t, value),
                _ => false,
            },
        };
        if !known {
            return Err(TagError::NotInTaxonomy {
                field,
                value: value.to_string(),
            });
        }
    }

    let new = value.map(String::from);
    match field {
        Field::Subject => {
            if mapping.subject != new {
                mapping.topic = None;
                mapping.subtopic = None;
            }
            mapping.subject = new;
        }
        Field::Topic => {
            if mapping.topic != new {
                mapping.subtopic = None;
            }
            mapping.topic = new;
        }
        Field::Subtopic => {
            mapping.subtopic = new;
        }
    }
    Ok(())
}

/// Progress counts: (complete mappings, all mappings). Informational only;
/// export never gates on this.
pub fn completion_stats(tags: &TaggingState) -> (usize, usize) {
    let mut tagged = 0;
    let mut total = 0;
    for list in tags.values() {
        for mapping in list {
            total += 1;
            if mapping.is_complete() {
                tagged += 1;
            }
        }
    }
    (tagged, total)
}
