use serde::{Deserialize, Serialize};

use super::taxonomy::TaxonomyIndex;

/// Which level of a mapping a selection targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Subject,
    Topic,
    Subtopic,
}

impl std::str::FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "subject" => Ok(Field::Subject),
            "topic" => Ok(Field::Topic),
            "subtopic" => Ok(Field::Subtopic),
            other => Err(format!(
                "unknown field '{}' (expected subject, topic, or subtopic)",
                other
            )),
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Field::Subject => write!(f, "subject"),
            Field::Topic => write!(f, "topic"),
            Field::Subtopic => write!(f, "subtopic"),
        }
    }
}

/// One Subject/Topic/Subtopic tag attached to a question.
///
/// Any field may be unset; partial mappings are legal intermediate states
/// while the user works down the hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtopic: Option<String>,
}

impl Mapping {
    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::Subject => self.subject.as_deref(),
            Field::Topic => self.topic.as_deref(),
            Field::Subtopic => self.subtopic.as_deref(),
        }
    }

    /// All three fields set
    pub fn is_complete(&self) -> bool {
        self.subject.is_some() && self.topic.is_some() && self.subtopic.is_some()
    }

    /// No field set
    pub fn is_empty(&self) -> bool {
        self.subject.is_none() && self.topic.is_none() && self.subtopic.is_none()
    }

    /// Check the set fields against the taxonomy: a topic must live under the
    /// mapping's subject and a subtopic under its topic. Unset fields never
    /// invalidate a mapping.
    pub fn is_valid(&self, taxonomy: &TaxonomyIndex) -> bool {
        if let Some(subject) = &self.subject {
            if !taxonomy.has_subject(subject) {
                return false;
            }
            if let Some(topic) = &self.topic {
                if !taxonomy.has_topic(subject, topic) {
                    return false;
                }
                if let Some(subtopic) = &self.subtopic {
                    if !taxonomy.has_subtopic(subject, topic, subtopic) {
                        return false;
                    }
                }
            } else if self.subtopic.is_some() {
                return false;
            }
        } else if self.topic.is_some() || self.subtopic.is_some() {
            return false;
        }
        true
    }
}
