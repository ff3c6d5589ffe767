use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::outline::Citation;
use crate::enums::FinalPart;

/// The restructured outline produced from the drafted data sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FusedOutline {
    #[serde(default, alias = "outline_summary")]
    pub outline_summary: String,
    #[serde(default, alias = "restructuring_notes")]
    pub restructuring_notes: Vec<String>,
    #[serde(default)]
    pub sections: Vec<FusedSection>,
}

impl FusedOutline {
    /// Every citation attached to a fused subsection, in outline order.
    pub fn citations(&self) -> impl Iterator<Item = &Citation> {
        self.sections
            .iter()
            .flat_map(|s| s.subsections.iter())
            .flat_map(|sub| sub.citations.iter())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FusedSection {
    pub title: String,
    #[serde(default)]
    pub context: String,
    #[serde(default, alias = "section_summary")]
    pub section_summary: String,
    #[serde(default)]
    pub subsections: Vec<FusedSubsection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FusedSubsection {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, alias = "supporting_evidence")]
    pub supporting_evidence: Vec<String>,
    #[serde(default)]
    pub citations: Vec<Citation>,
}

/// Text generated on the final tab.
///
/// `transitions` is keyed by outline marker path (`"I.A"`), and
/// `refined_subsections` by subsection id.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct FinalDocument {
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub methodology: String,
    pub conclusion: String,
    pub transitions: BTreeMap<String, String>,
    #[serde(alias = "refined_subsections")]
    pub refined_subsections: BTreeMap<String, String>,
}

impl FinalDocument {
    #[must_use]
    pub fn part(&self, part: FinalPart) -> &str {
        match part {
            FinalPart::Abstract => &self.abstract_text,
            FinalPart::Methodology => &self.methodology,
            FinalPart::Conclusion => &self.conclusion,
        }
    }

    pub fn set_part(&mut self, part: FinalPart, text: String) {
        match part {
            FinalPart::Abstract => self.abstract_text = text,
            FinalPart::Methodology => self.methodology = text,
            FinalPart::Conclusion => self.conclusion = text,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        FinalPart::ALL.iter().all(|p| self.part(*p).is_empty())
            && self.transitions.is_empty()
            && self.refined_subsections.is_empty()
    }
}
