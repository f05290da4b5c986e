use serde::{Deserialize, Serialize};

/// One child whose removal did not go through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeFailure {
    pub id: i64,
    pub error: String,
}

/// What a cascading delete actually removed below `parent`.
///
/// Nothing is rolled back: ids in `completed` are gone, ids in `failed` are
/// still stored together with whatever hangs below them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeReport {
    pub parent: i64,
    pub completed: Vec<i64>,
    pub failed: Vec<CascadeFailure>,
}

impl CascadeReport {
    pub fn new(parent: i64) -> Self {
        Self {
            parent,
            ..Default::default()
        }
    }

    pub fn is_partial(&self) -> bool {
        !self.failed.is_empty()
    }
}
