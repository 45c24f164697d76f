use indexmap::IndexMap;

/// The Subject → Topic → Subtopic hierarchy used to constrain tags.
///
/// Built once from flat taxonomy rows and immutable afterwards. Insertion
/// order is preserved at every level so dropdown-style listings are stable,
/// and each (subject, topic) pair holds its subtopics without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaxonomyIndex {
    subjects: IndexMap<String, IndexMap<String, Vec<String>>>,
}

impl TaxonomyIndex {
    /// Build the index from flat (subject, topic, subtopic) rows.
    ///
    /// Rows are processed in input order; a subtopic already present under
    /// its (subject, topic) pair is skipped, so the insert is idempotent and
    /// first-seen order wins.
    pub fn build<I, S>(rows: I) -> TaxonomyIndex
    where
        I: IntoIterator<Item = (S, S, S)>,
        S: Into<String>,
    {
        let mut subjects: IndexMap<String, IndexMap<String, Vec<String>>> = IndexMap::new();
        for (subject, topic, subtopic) in rows {
            let topics = subjects.entry(subject.into()).or_default();
            let subtopics = topics.entry(topic.into()).or_default();
            let subtopic = subtopic.into();
            if !subtopics.contains(&subtopic) {
                subtopics.push(subtopic);
            }
        }
        TaxonomyIndex { subjects }
    }

    /// All subjects, in first-seen order
    pub fn subjects(&self) -> Vec<&str> {
        self.subjects.keys().map(|s| s.as_str()).collect()
    }

    /// Topics under a subject, in first-seen order; empty if unknown
    pub fn topics(&self, subject: &str) -> Vec<&str> {
        self.subjects
            .get(subject)
            .map(|topics| topics.keys().map(|t| t.as_str()).collect())
            .unwrap_or_default()
    }

    /// Subtopics under a (subject, topic) pair; empty if unknown
    pub fn subtopics(&self, subject: &str, topic: &str) -> Vec<&str> {
        self.subjects
            .get(subject)
            .and_then(|topics| topics.get(topic))
            .map(|subs| subs.iter().map(|s| s.as_str()).collect())
            .unwrap_or_default()
    }

    pub fn has_subject(&self, subject: &str) -> bool {
        self.subjects.contains_key(subject)
    }

    pub fn has_topic(&self, subject: &str, topic: &str) -> bool {
        self.subjects
            .get(subject)
            .is_some_and(|topics| topics.contains_key(topic))
    }

    pub fn has_subtopic(&self, subject: &str, topic: &str, subtopic: &str) -> bool {
        self.subjects
            .get(subject)
            .and_then(|topics| topics.get(topic))
            .is_some_and(|subs| subs.iter().any(|s| s == subtopic))
    }

    /// Total number of (subject, topic, subtopic) leaf entries
    pub fn leaf_count(&self) -> usize {
        self.subjects
            .values()
            .flat_map(|topics| topics.values())
            .map(|subs| subs.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }
}
