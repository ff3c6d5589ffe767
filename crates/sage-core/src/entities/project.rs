use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::wizard_data::WizardData;

/// A named, saved paper project: the unit of persistence.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub data: WizardData,
}

impl ProjectRecord {
    #[must_use]
    pub fn summary(&self) -> ProjectSummary {
        ProjectSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            paper_type: self.data.selected_paper_type.clone(),
            thesis: (!self.data.final_thesis.is_empty()).then(|| self.data.final_thesis.clone()),
            updated_at: self.updated_at,
        }
    }

    /// File name used when exporting: non-alphanumerics replaced by `_`.
    #[must_use]
    pub fn export_file_name(&self) -> String {
        let stem: String = self
            .name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        format!("{stem}.json")
    }
}

/// Compact listing row for a project.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub paper_type: Option<String>,
    pub thesis: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_file_name_replaces_non_alphanumerics() {
        let now = Utc::now();
        let record = ProjectRecord {
            id: "prj-1-00000000".into(),
            name: "Min wage: a review!".into(),
            description: String::new(),
            created_at: now,
            updated_at: now,
            data: WizardData::default(),
        };
        assert_eq!(record.export_file_name(), "Min_wage__a_review_.json");
    }
}
