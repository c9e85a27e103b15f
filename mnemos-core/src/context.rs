//! Grounding context for graph RAG
//!
//! Every directed edge in the store becomes one `- <subject> (<relation>) <object>`
//! line. The lines are handed verbatim to the language model as the only facts it may
//! answer from.

use std::fmt;

use crate::models::TripletRecord;
use crate::projection::resolve_display_name;

/// A subject-relation-object fact derived from one graph edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Triplet {
    pub subject: String,
    pub relation: String,
    pub object: String,
}

impl Triplet {
    pub fn new(
        subject: impl Into<String>,
        relation: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            relation: relation.into(),
            object: object.into(),
        }
    }
}

impl From<&TripletRecord> for Triplet {
    fn from(record: &TripletRecord) -> Self {
        Self {
            subject: resolve_display_name(
                record.source_name.as_deref(),
                record.source_label.as_deref(),
            ),
            relation: record.relation.clone(),
            object: resolve_display_name(
                record.target_name.as_deref(),
                record.target_label.as_deref(),
            ),
        }
    }
}

impl fmt::Display for Triplet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "- {} ({}) {}", self.subject, self.relation, self.object)
    }
}

/// Ordered triplets supplied to the model. Empty means memory is empty and no
/// prompt should be built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroundingContext {
    triplets: Vec<Triplet>,
}

impl GroundingContext {
    pub fn is_empty(&self) -> bool {
        self.triplets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.triplets.len()
    }

    pub fn lines(&self) -> Vec<String> {
        self.triplets.iter().map(Triplet::to_string).collect()
    }

    /// Newline-joined lines, as embedded in the prompt.
    pub fn render(&self) -> String {
        self.lines().join("\n")
    }
}

impl From<Vec<Triplet>> for GroundingContext {
    fn from(triplets: Vec<Triplet>) -> Self {
        Self { triplets }
    }
}

/// Serialize raw edge rows into a grounding context. One line per row, input order,
/// no deduplication.
pub fn serialize(records: &[TripletRecord]) -> GroundingContext {
    GroundingContext {
        triplets: records.iter().map(Triplet::from).collect(),
    }
}
