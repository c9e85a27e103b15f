use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One submitted text blob, handed to the memory engine for extraction.
///
/// `reference_time` is stamped when the episode is built and is never inferred
/// later; the engine's temporal validity model depends on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Episode {
    pub uuid: Uuid,
    pub name: String,
    pub episode_body: String,
    pub source_description: String,
    pub reference_time: DateTime<Utc>,
}

impl Episode {
    pub fn new(
        body: impl Into<String>,
        name: impl Into<String>,
        source_description: impl Into<String>,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            episode_body: body.into(),
            source_description: source_description.into(),
            reference_time: Utc::now(),
        }
    }
}
