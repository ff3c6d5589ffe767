use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

use super::draft::DraftData;
use super::methodology::{Methodology, MethodologyOption};
use super::outline::{QuestionPath, Section, question_at};
use super::structure::PaperStructure;
use super::synthesis::{FinalDocument, FusedOutline};
use crate::enums::{OutlineStage, PaperLength, Tab};

/// A recommended or user-added source category and whether it is checked.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CategoryChoice {
    pub name: String,
    #[serde(default = "default_true")]
    pub selected: bool,
}

const fn default_true() -> bool {
    true
}

impl CategoryChoice {
    #[must_use]
    pub fn selected(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            selected: true,
        }
    }
}

/// Full snapshot of wizard progress, persisted as the `data` field of a
/// project record. Every field defaults so that partial records load.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct WizardData {
    #[serde(deserialize_with = "paper_type_ref")]
    #[schemars(with = "Option<String>")]
    pub selected_paper_type: Option<String>,
    pub paper_length: PaperLength,

    pub thesis_draft: String,
    pub final_thesis: String,
    pub probing_questions: Vec<String>,

    pub category_candidates: Vec<CategoryChoice>,
    pub source_categories: Vec<String>,

    pub methodology_options: Vec<MethodologyOption>,
    /// Catalog family the options were generated for.
    pub methodology_type: Option<String>,
    #[serde(deserialize_with = "methodology_ref")]
    #[schemars(with = "Option<Methodology>")]
    pub methodology: Option<Methodology>,

    pub structure: Option<PaperStructure>,
    pub outline_data: Vec<Section>,
    pub outline_stage: OutlineStage,
    pub draft_data: DraftData,
    pub fused_outline: Option<FusedOutline>,
    pub final_document: FinalDocument,

    pub thesis_finalized: bool,
    pub source_categories_activated: bool,
    pub categories_finalized: bool,
    pub ready_for_outline: bool,
    pub framework_complete: bool,
    pub draft_one_complete: bool,
    pub draft_two_complete: bool,
    pub active_tab: Tab,
}

impl WizardData {
    /// Names of the currently checked category candidates, in ranking order.
    #[must_use]
    pub fn selected_categories(&self) -> Vec<String> {
        self.category_candidates
            .iter()
            .filter(|c| c.selected)
            .map(|c| c.name.clone())
            .collect()
    }

    /// Rewrite positional draft keys (`"s-ss-q"`) to question ids.
    ///
    /// Keys that already name a question are kept. Positional keys that do
    /// not resolve against the current outline are dropped and returned.
    pub fn migrate_legacy_drafts(&mut self) -> Vec<String> {
        let mut dropped = Vec::new();
        let mut migrated = BTreeMap::new();
        for (key, response) in std::mem::take(&mut self.draft_data.responses) {
            match QuestionPath::parse_positional(&key) {
                Some(path) => match question_at(&self.outline_data, path) {
                    Some(question) => {
                        migrated.insert(question.id.clone(), response);
                    }
                    None => dropped.push(key),
                },
                None => {
                    migrated.insert(key, response);
                }
            }
        }
        self.draft_data.responses = migrated;
        if !dropped.is_empty() {
            tracing::warn!(count = dropped.len(), "dropped unresolvable draft responses");
        }
        dropped
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PaperTypeRef {
    Id(String),
    Object { id: String },
}

// Older records stored the whole catalog entry instead of its id.
fn paper_type_ref<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(
        Option::<PaperTypeRef>::deserialize(deserializer)?.map(|r| match r {
            PaperTypeRef::Id(id) | PaperTypeRef::Object { id } => id,
        }),
    )
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MethodologyRef {
    Structured(Methodology),
    Text(String),
}

// Older records stored the methodology as free text.
fn methodology_ref<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Methodology>, D::Error> {
    Ok(
        Option::<MethodologyRef>::deserialize(deserializer)?.map(|r| match r {
            MethodologyRef::Structured(m) => m,
            MethodologyRef::Text(text) => Methodology {
                title: "Methodology".into(),
                description: text,
                ..Methodology::default()
            },
        }),
    )
}
