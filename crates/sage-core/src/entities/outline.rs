use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::SectionKind;
use crate::ids::{self, PREFIX_QUESTION, PREFIX_SECTION, PREFIX_SUBSECTION};

fn new_section_id() -> String {
    ids::generate(PREFIX_SECTION)
}

fn new_subsection_id() -> String {
    ids::generate(PREFIX_SUBSECTION)
}

fn new_question_id() -> String {
    ids::generate(PREFIX_QUESTION)
}

/// A top-level outline section.
///
/// Older records store `section_title`/`section_context` and carry no id;
/// both are accepted on load and an id is generated when missing.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    #[serde(default = "new_section_id")]
    pub id: String,
    #[serde(alias = "section_title")]
    pub title: String,
    #[serde(default, alias = "section_context")]
    pub context: String,
    #[serde(default)]
    pub kind: SectionKind,
    #[serde(default, alias = "pages_allocated")]
    pub pages_allocated: Option<f64>,
    #[serde(default)]
    pub subsections: Vec<Subsection>,
}

impl Section {
    #[must_use]
    pub fn new(title: impl Into<String>, context: impl Into<String>, kind: SectionKind) -> Self {
        Self {
            id: new_section_id(),
            title: title.into(),
            context: context.into(),
            kind,
            pages_allocated: None,
            subsections: Vec::new(),
        }
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.subsections.iter().map(|s| s.questions.len()).sum()
    }
}

/// A subsection within a section.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Subsection {
    #[serde(default = "new_subsection_id")]
    pub id: String,
    #[serde(alias = "subsection_title")]
    pub title: String,
    #[serde(default, alias = "subsection_context")]
    pub context: String,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Subsection {
    #[must_use]
    pub fn new(title: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            id: new_subsection_id(),
            title: title.into(),
            context: context.into(),
            questions: Vec::new(),
        }
    }
}

/// A guiding question the writer answers in the drafts.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Question {
    #[serde(default = "new_question_id")]
    pub id: String,
    #[serde(alias = "question")]
    pub text: String,
    #[serde(default)]
    pub citations: Vec<Citation>,
}

impl Question {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: new_question_id(),
            text: text.into(),
            citations: Vec::new(),
        }
    }
}

/// A recommended source attached to a question.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Citation {
    pub apa: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default, alias = "methodology_points")]
    pub methodology_points: Vec<String>,
    #[serde(default)]
    pub description: String,
}

/// Position of a question inside an outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionPath {
    pub section: usize,
    pub subsection: usize,
    pub question: usize,
}

impl QuestionPath {
    /// Parse a positional `"s-ss-q"` key.
    #[must_use]
    pub fn parse_positional(key: &str) -> Option<Self> {
        let mut parts = key.split('-').map(str::parse::<usize>);
        let section = parts.next()?.ok()?;
        let subsection = parts.next()?.ok()?;
        let question = parts.next()?.ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self {
            section,
            subsection,
            question,
        })
    }
}

/// Look up a question by its position.
#[must_use]
pub fn question_at(outline: &[Section], path: QuestionPath) -> Option<&Question> {
    outline
        .get(path.section)?
        .subsections
        .get(path.subsection)?
        .questions
        .get(path.question)
}

/// Find a question by id, returning its position as well.
#[must_use]
pub fn find_question<'a>(outline: &'a [Section], id: &str) -> Option<(QuestionPath, &'a Question)> {
    outline.iter().enumerate().find_map(|(s, section)| {
        section.subsections.iter().enumerate().find_map(|(ss, sub)| {
            sub.questions.iter().enumerate().find_map(|(q, question)| {
                (question.id == id).then_some((
                    QuestionPath {
                        section: s,
                        subsection: ss,
                        question: q,
                    },
                    question,
                ))
            })
        })
    })
}

/// Iterate every question in document order.
pub fn questions(outline: &[Section]) -> impl Iterator<Item = &Question> {
    outline
        .iter()
        .flat_map(|s| s.subsections.iter())
        .flat_map(|sub| sub.questions.iter())
}
