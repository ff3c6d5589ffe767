use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

/// Alternative answers for one question, with the one currently selected.
#[derive(Debug, Clone, Default, Serialize, JsonSchema, PartialEq, Eq)]
pub struct DraftResponse {
    pub candidates: Vec<String>,
    #[serde(default)]
    pub selected: usize,
}

impl DraftResponse {
    /// A response whose newest candidate is selected.
    #[must_use]
    pub fn latest(candidates: Vec<String>) -> Self {
        let selected = candidates.len().saturating_sub(1);
        Self {
            candidates,
            selected,
        }
    }

    #[must_use]
    pub fn selected_text(&self) -> Option<&str> {
        self.candidates.get(self.selected).map(String::as_str)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DraftResponseRepr {
    Full {
        candidates: Vec<String>,
        #[serde(default)]
        selected: usize,
    },
    // Older records keep a bare array; the last entry is the fused answer.
    Candidates(Vec<String>),
    Single(String),
}

impl<'de> Deserialize<'de> for DraftResponse {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match DraftResponseRepr::deserialize(deserializer)? {
            DraftResponseRepr::Full {
                candidates,
                selected,
            } => {
                let selected = selected.min(candidates.len().saturating_sub(1));
                Self {
                    candidates,
                    selected,
                }
            }
            DraftResponseRepr::Candidates(candidates) => Self::latest(candidates),
            DraftResponseRepr::Single(text) => Self::latest(vec![text]),
        })
    }
}

/// Draft answers keyed by question id.
///
/// Records written before questions carried ids use positional `"s-ss-q"`
/// keys; `WizardData::migrate_legacy_drafts` rewrites them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct DraftData {
    #[serde(default)]
    pub responses: BTreeMap<String, DraftResponse>,
}
