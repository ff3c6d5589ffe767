use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Ordered section titles for a paper type, optionally enhanced with
/// methodology-specific sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaperStructure {
    pub paper_type: String,
    #[serde(default)]
    pub methodology: Option<String>,
    #[serde(alias = "structure")]
    pub sections: Vec<String>,
    #[serde(default, alias = "has_methodology_sections")]
    pub has_methodology_sections: bool,
}
