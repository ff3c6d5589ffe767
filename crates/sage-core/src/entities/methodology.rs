use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A methodology family from the backend catalog, with its optional
/// sub-methodologies.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct MethodologyType {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub sub_methodologies: Vec<MethodologyType>,
}

/// A generated methodology proposal tailored to the thesis.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MethodologyOption {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub approach: String,
    #[serde(default, alias = "source_focus")]
    pub source_focus: String,
    #[serde(default, alias = "structure_alignment")]
    pub structure_alignment: String,
    /// `Focused`, `Comprehensive`, or `Innovative`.
    #[serde(default, alias = "methodology_type")]
    pub variant: Option<String>,
}

/// The methodology the writer settled on.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Methodology {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub approach: String,
    #[serde(default, alias = "source_focus")]
    pub source_focus: String,
    #[serde(default, alias = "structure_alignment")]
    pub structure_alignment: String,
    #[serde(default, alias = "methodology_id")]
    pub methodology_id: Option<String>,
    #[serde(default, alias = "sub_methodology_id")]
    pub sub_methodology_id: Option<String>,
}

impl Methodology {
    /// Build the chosen methodology from a generated option and the catalog
    /// family it was generated for.
    #[must_use]
    pub fn from_option(option: &MethodologyOption, methodology_id: Option<String>) -> Self {
        Self {
            title: option.title.clone(),
            description: option.description.clone(),
            approach: option.approach.clone(),
            source_focus: option.source_focus.clone(),
            structure_alignment: option.structure_alignment.clone(),
            methodology_id,
            sub_methodology_id: None,
        }
    }
}
