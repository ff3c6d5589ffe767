//! Stage enums, tabs, and wire-level value types for Sage.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`.
//! `OutlineStage` provides `allowed_next_states()` so that callers can reject
//! invalid transitions before touching any state. Wizard stages are derived
//! from the completion flags instead; see `WizardState::current_stage`.

use std::borrow::Cow;
use std::fmt;

use schemars::{JsonSchema, Schema, SchemaGenerator, json_schema};
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

// ---------------------------------------------------------------------------
// WizardStage
// ---------------------------------------------------------------------------

/// The ordered stages of paper assembly.
///
/// ```text
/// paper_type → thesis → source_categories → methodology
///            → outline_framework → draft_one → draft_two → final
/// ```
///
/// The order is total: `WizardState::current_stage` reports the earliest
/// stage whose flag is unset.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum WizardStage {
    PaperType,
    Thesis,
    SourceCategories,
    Methodology,
    OutlineFramework,
    DraftOne,
    DraftTwo,
    Final,
}

impl WizardStage {
    pub const ALL: [Self; 8] = [
        Self::PaperType,
        Self::Thesis,
        Self::SourceCategories,
        Self::Methodology,
        Self::OutlineFramework,
        Self::DraftOne,
        Self::DraftTwo,
        Self::Final,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PaperType => "paper_type",
            Self::Thesis => "thesis",
            Self::SourceCategories => "source_categories",
            Self::Methodology => "methodology",
            Self::OutlineFramework => "outline_framework",
            Self::DraftOne => "draft_one",
            Self::DraftTwo => "draft_two",
            Self::Final => "final",
        }
    }

    /// Human-readable label for progress displays.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::PaperType => "Paper type",
            Self::Thesis => "Thesis",
            Self::SourceCategories => "Source categories",
            Self::Methodology => "Methodology",
            Self::OutlineFramework => "Outline framework",
            Self::DraftOne => "Draft one",
            Self::DraftTwo => "Draft two",
            Self::Final => "Final document",
        }
    }
}

impl fmt::Display for WizardStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// OutlineStage
// ---------------------------------------------------------------------------

/// Progress of outline generation.
///
/// ```text
/// no_outline → structure_drafted → sections_generated → subsections_generated
///            → questions_generated → citations_generated → complete
/// ```
///
/// Every stage past `no_outline` may reset to `no_outline`.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum OutlineStage {
    #[default]
    NoOutline,
    StructureDrafted,
    SectionsGenerated,
    SubsectionsGenerated,
    QuestionsGenerated,
    CitationsGenerated,
    Complete,
}

impl OutlineStage {
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::NoOutline => &[Self::StructureDrafted],
            Self::StructureDrafted => &[Self::SectionsGenerated, Self::NoOutline],
            Self::SectionsGenerated => &[Self::SubsectionsGenerated, Self::NoOutline],
            Self::SubsectionsGenerated => &[Self::QuestionsGenerated, Self::NoOutline],
            Self::QuestionsGenerated => &[Self::CitationsGenerated, Self::NoOutline],
            Self::CitationsGenerated => &[Self::Complete, Self::NoOutline],
            Self::Complete => &[Self::NoOutline],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoOutline => "no_outline",
            Self::StructureDrafted => "structure_drafted",
            Self::SectionsGenerated => "sections_generated",
            Self::SubsectionsGenerated => "subsections_generated",
            Self::QuestionsGenerated => "questions_generated",
            Self::CitationsGenerated => "citations_generated",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for OutlineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SectionKind
// ---------------------------------------------------------------------------

/// Role of an outline section. Only `data` sections receive questions and
/// citations; `administrative` sections (title page, abstract, references)
/// receive no subsections.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Data,
    Methodology,
    Analysis,
    #[default]
    Content,
    Administrative,
}

impl SectionKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Data => "data",
            Self::Methodology => "methodology",
            Self::Analysis => "analysis",
            Self::Content => "content",
            Self::Administrative => "administrative",
        }
    }

    #[must_use]
    pub const fn is_data(self) -> bool {
        matches!(self, Self::Data)
    }

    #[must_use]
    pub const fn is_administrative(self) -> bool {
        matches!(self, Self::Administrative)
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tab
// ---------------------------------------------------------------------------

/// Workspace tabs shown once the methodology is finalized.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    #[default]
    Framework,
    Draft1,
    Draft2,
    Final,
}

impl Tab {
    pub const ALL: [Self; 4] = [Self::Framework, Self::Draft1, Self::Draft2, Self::Final];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Framework => "framework",
            Self::Draft1 => "draft1",
            Self::Draft2 => "draft2",
            Self::Final => "final",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// FinalPart
// ---------------------------------------------------------------------------

/// Prose blocks generated for the final document from the drafted outline.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum FinalPart {
    Abstract,
    Methodology,
    Conclusion,
}

impl FinalPart {
    pub const ALL: [Self; 3] = [Self::Abstract, Self::Methodology, Self::Conclusion];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Abstract => "abstract",
            Self::Methodology => "methodology",
            Self::Conclusion => "conclusion",
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Abstract => "Abstract",
            Self::Methodology => "Methodology",
            Self::Conclusion => "Conclusion",
        }
    }
}

impl fmt::Display for FinalPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FinalPart {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::Validation(format!("unknown final part: {s}")))
    }
}

// ---------------------------------------------------------------------------
// SaveMode
// ---------------------------------------------------------------------------

/// How a state change should be persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SaveMode {
    /// Nothing changed.
    None,
    /// Coalesce with other edits inside the debounce window.
    Debounced,
    /// Milestone: write now, cancelling any pending debounced write.
    Immediate,
}

impl SaveMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Debounced => "debounced",
            Self::Immediate => "immediate",
        }
    }
}

impl fmt::Display for SaveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// PaperLength
// ---------------------------------------------------------------------------

/// Target length of the paper.
///
/// On the wire this is a single integer: a positive page count, `-1` for
/// "adjusted based on thesis", or `-2` for "maximum detail". Older records
/// stored the form value as a string (`"15"`, `"-1"`), which also parses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "LengthRepr", into = "i64")]
pub enum PaperLength {
    Pages(u32),
    #[default]
    AdjustedToThesis,
    MaximumDetail,
}

impl PaperLength {
    pub const ADJUSTED_WIRE: i64 = -1;
    pub const MAXIMUM_WIRE: i64 = -2;

    /// Page counts offered alongside the two special values.
    pub const STANDARD_PAGES: [u32; 4] = [5, 10, 15, 20];

    #[must_use]
    pub const fn to_wire(self) -> i64 {
        match self {
            Self::Pages(n) => n as i64,
            Self::AdjustedToThesis => Self::ADJUSTED_WIRE,
            Self::MaximumDetail => Self::MAXIMUM_WIRE,
        }
    }

    /// Page count when the length is concrete.
    #[must_use]
    pub const fn pages(self) -> Option<u32> {
        match self {
            Self::Pages(n) => Some(n),
            Self::AdjustedToThesis | Self::MaximumDetail => None,
        }
    }
}

impl TryFrom<i64> for PaperLength {
    type Error = CoreError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            Self::ADJUSTED_WIRE => Ok(Self::AdjustedToThesis),
            Self::MAXIMUM_WIRE => Ok(Self::MaximumDetail),
            n if n > 0 => u32::try_from(n)
                .map(Self::Pages)
                .map_err(|_| CoreError::Validation(format!("paper length too large: {n}"))),
            n => Err(CoreError::Validation(format!("invalid paper length: {n}"))),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LengthRepr {
    Number(i64),
    Text(String),
}

impl TryFrom<LengthRepr> for PaperLength {
    type Error = CoreError;

    fn try_from(value: LengthRepr) -> Result<Self, Self::Error> {
        match value {
            LengthRepr::Number(n) => Self::try_from(n),
            LengthRepr::Text(s) => s.parse(),
        }
    }
}

impl From<PaperLength> for i64 {
    fn from(value: PaperLength) -> Self {
        value.to_wire()
    }
}

impl std::str::FromStr for PaperLength {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "adjusted" | "auto" => Ok(Self::AdjustedToThesis),
            "max" | "maximum" => Ok(Self::MaximumDetail),
            other => other
                .parse::<i64>()
                .map_err(|_| CoreError::Validation(format!("invalid paper length: {s}")))
                .and_then(Self::try_from),
        }
    }
}

impl fmt::Display for PaperLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pages(n) => write!(f, "{n} pages"),
            Self::AdjustedToThesis => f.write_str("Adjusted Based on Thesis"),
            Self::MaximumDetail => f.write_str("Maximum Detail"),
        }
    }
}

impl JsonSchema for PaperLength {
    fn schema_name() -> Cow<'static, str> {
        "PaperLength".into()
    }

    fn json_schema(_generator: &mut SchemaGenerator) -> Schema {
        json_schema!({
            "type": "integer",
            "not": { "enum": [0] },
            "minimum": -2
        })
    }
}
