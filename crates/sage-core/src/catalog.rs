//! Static catalog of supported paper types.
//!
//! Each entry carries the descriptors sent to the backend with generation
//! requests (`purpose`, `structure`, `tone`) and the page length applied when
//! the type is selected.

use schemars::JsonSchema;
use serde::Serialize;

use crate::enums::PaperLength;
use crate::errors::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
pub struct PaperType {
    pub id: &'static str,
    pub name: &'static str,
    pub purpose: &'static str,
    pub structure: &'static str,
    pub tone: &'static str,
    pub example: &'static str,
    pub default_length: PaperLength,
}

pub static PAPER_TYPES: &[PaperType] = &[
    PaperType {
        id: "argumentative",
        name: "Argumentative Paper",
        purpose: "To prove a specific policy position or strategic recommendation using evidence and reasoning.",
        structure: "Introduction with thesis → Body paragraphs with claims and evidence → Counterarguments → Conclusion.",
        tone: "Persuasive, assertive, evidence-based.",
        example: "The U.S. should increase defense spending in the Indo-Pacific region to counter Chinese military expansion.",
        default_length: PaperLength::Pages(10),
    },
    PaperType {
        id: "analytical",
        name: "Analytical Paper",
        purpose: "To break down a security issue, policy, or strategic situation into component parts for better understanding.",
        structure: "Introduction → Analytical breakdown → Supporting evidence → Conclusion.",
        tone: "Objective, methodical.",
        example: "A structural analysis of Russia's hybrid warfare tactics in Eastern Europe.",
        default_length: PaperLength::Pages(10),
    },
    PaperType {
        id: "expository",
        name: "Expository Paper",
        purpose: "To explain or inform about a topic in a neutral, factual way for briefing purposes.",
        structure: "Introduction → Explanation with supporting facts → Conclusion.",
        tone: "Informative, clear, objective.",
        example: "How cyber attribution works in national security investigations.",
        default_length: PaperLength::AdjustedToThesis,
    },
    PaperType {
        id: "narrative",
        name: "Narrative Paper",
        purpose: "To recount historical events, operational experiences, or case studies chronologically.",
        structure: "Chronological or thematic → Often with key turning points or lessons learned.",
        tone: "Descriptive, factual, reflective.",
        example: "The timeline of events leading to the fall of Kabul in August 2021.",
        default_length: PaperLength::AdjustedToThesis,
    },
    PaperType {
        id: "descriptive",
        name: "Descriptive Paper",
        purpose: "To paint a detailed picture of a security situation, operational environment, or strategic landscape.",
        structure: "Loosely structured; often thematic or geographical.",
        tone: "Detailed, comprehensive.",
        example: "Current security conditions in the Sahel region of Africa.",
        default_length: PaperLength::AdjustedToThesis,
    },
    PaperType {
        id: "compare_contrast",
        name: "Compare and Contrast Paper",
        purpose: "To analyze similarities and/or differences between military doctrines, policies, or strategic approaches.",
        structure: "Block (Subject A → Subject B) or Point-by-Point (Theme 1 → Theme 2, etc.).",
        tone: "Objective or persuasive depending on intent.",
        example: "Comparing NATO and Russian military doctrine in conventional warfare.",
        default_length: PaperLength::Pages(10),
    },
    PaperType {
        id: "cause_effect",
        name: "Cause and Effect Paper",
        purpose: "To explore reasons behind geopolitical events or the consequences of policy decisions.",
        structure: "Cause → Effect or Effect → Causes.",
        tone: "Logical, analytical.",
        example: "The effects of economic sanctions on Iranian nuclear program compliance.",
        default_length: PaperLength::Pages(10),
    },
    PaperType {
        id: "definition",
        name: "Definition Paper",
        purpose: "To explain the meaning of strategic concepts, doctrines, or emerging security terms.",
        structure: "Introduction → Definitions → Examples or contexts → Conclusion.",
        tone: "Clarifying, explorative.",
        example: "What constitutes \"gray zone\" operations in modern warfare?",
        default_length: PaperLength::Pages(5),
    },
    PaperType {
        id: "exploratory",
        name: "Exploratory Paper (Open-ended)",
        purpose: "To investigate emerging security issues or policy questions without predetermined conclusions.",
        structure: "Introduction → Background → Exploration of different views → Reflection or tentative conclusion.",
        tone: "Inquisitive, balanced, thoughtful.",
        example: "What are the strategic implications of artificial intelligence in military operations?",
        default_length: PaperLength::AdjustedToThesis,
    },
    PaperType {
        id: "reflective",
        name: "Reflective Paper",
        purpose: "To reflect on operational experiences, policy outcomes, or strategic lessons learned.",
        structure: "Experience/event → Analysis → Lessons learned or policy implications.",
        tone: "Thoughtful, introspective, analytical.",
        example: "Lessons learned from the U.S. withdrawal from Afghanistan for future operations.",
        default_length: PaperLength::Pages(5),
    },
    PaperType {
        id: "synthesis",
        name: "Synthesis Paper",
        purpose: "To combine intelligence from multiple sources to form a cohesive threat assessment or policy recommendation.",
        structure: "Thematic organization combining evidence from various intelligence sources.",
        tone: "Analytical and integrative.",
        example: "Synthesizing open-source intelligence on North Korean missile capabilities.",
        default_length: PaperLength::Pages(15),
    },
    PaperType {
        id: "research",
        name: "Research Paper",
        purpose: "To present original research or compile existing analysis on a specific security question.",
        structure: "Abstract → Introduction → Methodology → Findings → Discussion → Conclusion → References.",
        tone: "Academic, evidence-driven.",
        example: "A quantitative analysis of defense spending effectiveness across NATO allies.",
        default_length: PaperLength::Pages(20),
    },
    PaperType {
        id: "literature_review",
        name: "Literature Review",
        purpose: "To summarize and evaluate existing research on a strategic or policy topic.",
        structure: "Thematic or chronological organization of sources.",
        tone: "Scholarly, comprehensive.",
        example: "A review of recent studies on counterterrorism effectiveness in the Sahel.",
        default_length: PaperLength::Pages(15),
    },
    PaperType {
        id: "critical_review",
        name: "Critical Review / Critique",
        purpose: "To evaluate and interpret defense policies, strategic documents, or operational plans.",
        structure: "Summary of the work → Analysis/critique → Evaluation.",
        tone: "Analytical and evaluative.",
        example: "A critical review of the 2022 National Defense Strategy's Indo-Pacific focus.",
        default_length: PaperLength::Pages(10),
    },
    PaperType {
        id: "position",
        name: "Position Paper",
        purpose: "To take a stance on a controversial policy issue and defend it with evidence.",
        structure: "Thesis → Evidence → Rebuttals → Conclusion.",
        tone: "Assertive, persuasive.",
        example: "The U.S. should maintain strategic ambiguity regarding Taiwan defense commitments.",
        default_length: PaperLength::Pages(10),
    },
    PaperType {
        id: "proposal",
        name: "Proposal Paper",
        purpose: "To propose a solution to a security problem or recommend a course of action.",
        structure: "Problem statement → Proposed solution → Justification → Implementation plan.",
        tone: "Persuasive and constructive.",
        example: "A proposal for enhancing cybersecurity cooperation between Five Eyes nations.",
        default_length: PaperLength::Pages(10),
    },
    PaperType {
        id: "concept",
        name: "Concept Paper",
        purpose: "To explore emerging strategic concepts or theoretical frameworks for analysis.",
        structure: "Introduction → Explanation → Possible applications → Conclusion.",
        tone: "Abstract, theoretical, forward-looking.",
        example: "The concept of \"cognitive warfare\" in 21st century conflicts.",
        default_length: PaperLength::Pages(5),
    },
    PaperType {
        id: "response",
        name: "Response Paper",
        purpose: "To offer analytical reaction to intelligence reports, policy documents, or strategic assessments.",
        structure: "Summary → Reaction → Justification or analysis.",
        tone: "Analytical with supporting evidence.",
        example: "Response to the latest National Intelligence Estimate on climate security threats.",
        default_length: PaperLength::Pages(5),
    },
];

/// Look up a paper type by id.
#[must_use]
pub fn paper_type(id: &str) -> Option<&'static PaperType> {
    PAPER_TYPES.iter().find(|t| t.id == id)
}

/// Like [`paper_type`] but fails with `NotFound`.
pub fn require_paper_type(id: &str) -> Result<&'static PaperType, CoreError> {
    paper_type(id).ok_or_else(|| CoreError::not_found("paper_type", id))
}
