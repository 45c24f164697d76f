//! Integrity check: find mappings that reference taxonomy entries the
//! current taxonomy no longer contains.
//!
//! Replacing the taxonomy file can strand selections made under the old
//! hierarchy. Those stale references are left in place (the user may want to
//! re-point them), but they are flagged here rather than silently displayed.

use crate::model::{TaxonomyIndex, Workspace};

/// One stale reference found by the check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub question: usize,
    pub mapping: usize,
    pub problem: Problem,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Problem {
    /// Subject not present in the taxonomy
    UnknownSubject(String),
    /// Topic not listed under the mapping's subject
    UnknownTopic { subject: String, topic: String },
    /// Subtopic not listed under the mapping's topic
    UnknownSubtopic { topic: String, subtopic: String },
    /// Child field set while its parent is unset
    OrphanedChild(&'static str),
}

impl std::fmt::Display for Problem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Problem::UnknownSubject(s) => write!(f, "subject '{}' is not in the taxonomy", s),
            Problem::UnknownTopic { subject, topic } => {
                write!(f, "topic '{}' is not listed under '{}'", topic, subject)
            }
            Problem::UnknownSubtopic { topic, subtopic } => {
                write!(f, "subtopic '{}' is not listed under '{}'", subtopic, topic)
            }
            Problem::OrphanedChild(field) => {
                write!(f, "{} is set but its parent selection is not", field)
            }
        }
    }
}

/// Validate every mapping in the workspace against the taxonomy.
/// Read-only; findings are reported, never repaired.
pub fn check_workspace(ws: &Workspace, taxonomy: &TaxonomyIndex) -> Vec<Finding> {
    let mut findings = Vec::new();
    for (&question, mappings) in &ws.tags {
        for (pos, mapping) in mappings.iter().enumerate() {
            let problem = match (&mapping.subject, &mapping.topic, &mapping.subtopic) {
                (None, Some(_), _) => Some(Problem::OrphanedChild("topic")),
                (None, None, Some(_)) => Some(Problem::OrphanedChild("subtopic")),
                (Some(s), _, _) if !taxonomy.has_subject(s) => {
                    Some(Problem::UnknownSubject(s.clone()))
                }
                (Some(s), Some(t), _) if !taxonomy.has_topic(s, t) => Some(Problem::UnknownTopic {
                    subject: s.clone(),
                    topic: t.clone(),
                }),
                (Some(_), None, Some(_)) => Some(Problem::OrphanedChild("subtopic")),
                (Some(s), Some(t), Some(st)) if !taxonomy.has_subtopic(s, t, st) => {
                    Some(Problem::UnknownSubtopic {
                        topic: t.clone(),
                        subtopic: st.clone(),
                    })
                }
                _ => None,
            };
            if let Some(problem) = problem {
                findings.push(Finding {
                    question,
                    mapping: pos,
                    problem,
                });
            }
        }
    }
    findings
}
