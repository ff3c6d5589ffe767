//! Request builders: project the wizard snapshot onto backend payloads.

use std::collections::BTreeMap;

use sage_client::wire::{
    AnswerProbingRequest, DataSectionDigest, FinalTextRequest, FusedOutlineRequest,
    MethodologyGenerationRequest, PaperStructureRequest, ProbingQuestionsRequest,
    QuestionCitationRequest, QuestionsRequest, RecommendSourcesRequest, RefineSubsectionRequest,
    StructuredOutlineRequest, SubsectionsRequest,
};
use sage_core::catalog::{self, PaperType};
use sage_core::entities::{Question, Section, Subsection, WizardData};

use crate::error::WizardError;

/// Citations requested per question.
pub const CITATIONS_PER_QUESTION: u32 = 3;

pub(crate) fn paper_type(data: &WizardData) -> Result<&'static PaperType, WizardError> {
    let id = data
        .selected_paper_type
        .as_deref()
        .ok_or_else(|| WizardError::precondition("select a paper type first"))?;
    Ok(catalog::require_paper_type(id)?)
}

/// The thesis to send: the finalized one when present, else the draft.
pub(crate) fn thesis(data: &WizardData) -> &str {
    if data.final_thesis.is_empty() {
        &data.thesis_draft
    } else {
        &data.final_thesis
    }
}

/// One-line methodology description used in outline and drafting prompts.
#[must_use]
pub fn methodology_summary(data: &WizardData) -> String {
    match &data.methodology {
        Some(m) if m.description.is_empty() => m.title.clone(),
        Some(m) => format!("{}: {}", m.title, m.description),
        None => String::new(),
    }
}

fn methodology_id(data: &WizardData) -> Option<String> {
    data.methodology
        .as_ref()
        .and_then(|m| m.methodology_id.clone())
        .or_else(|| data.methodology_type.clone())
}

pub(crate) fn probing_questions(data: &WizardData) -> Result<ProbingQuestionsRequest, WizardError> {
    let pt = paper_type(data)?;
    Ok(ProbingQuestionsRequest {
        thesis: thesis(data).to_string(),
        paper_type: pt.name.to_string(),
        paper_purpose: pt.purpose.to_string(),
        paper_tone: pt.tone.to_string(),
    })
}

pub(crate) fn answer_probing(
    data: &WizardData,
    answers: Vec<String>,
) -> Result<AnswerProbingRequest, WizardError> {
    let pt = paper_type(data)?;
    if data.probing_questions.is_empty() {
        return Err(WizardError::precondition(
            "no probing questions to answer; generate them first",
        ));
    }
    Ok(AnswerProbingRequest {
        thesis: thesis(data).to_string(),
        questions: data.probing_questions.clone(),
        answers,
        paper_type: pt.name.to_string(),
        paper_purpose: pt.purpose.to_string(),
        paper_tone: pt.tone.to_string(),
    })
}

pub(crate) fn recommend_sources(
    data: &WizardData,
    exclude: Vec<String>,
) -> RecommendSourcesRequest {
    RecommendSourcesRequest {
        final_thesis: data.final_thesis.clone(),
        paper_length_pages: data.paper_length.to_wire(),
        exclude,
    }
}

pub(crate) fn methodology_generation(
    data: &WizardData,
    methodology_type: &str,
) -> Result<MethodologyGenerationRequest, WizardError> {
    let pt = paper_type(data)?;
    Ok(MethodologyGenerationRequest {
        methodology_type: methodology_type.to_string(),
        final_thesis: data.final_thesis.clone(),
        paper_type: pt.id.to_string(),
        paper_purpose: pt.purpose.to_string(),
        paper_tone: pt.tone.to_string(),
        paper_structure: pt.structure.to_string(),
        source_categories: data.source_categories.clone(),
        page_count: data.paper_length.to_wire(),
    })
}

pub(crate) fn paper_structure(data: &WizardData) -> Result<PaperStructureRequest, WizardError> {
    let pt = paper_type(data)?;
    Ok(PaperStructureRequest {
        paper_type: pt.id.to_string(),
        methodology_id: methodology_id(data),
        sub_methodology_id: data
            .methodology
            .as_ref()
            .and_then(|m| m.sub_methodology_id.clone()),
    })
}

pub(crate) fn structured_outline(
    data: &WizardData,
) -> Result<StructuredOutlineRequest, WizardError> {
    let pt = paper_type(data)?;
    let methodology = data
        .methodology
        .clone()
        .ok_or_else(|| WizardError::precondition("select a methodology first"))?;
    Ok(StructuredOutlineRequest {
        final_thesis: data.final_thesis.clone(),
        paper_type: pt.id.to_string(),
        methodology_id: methodology_id(data),
        sub_methodology_id: methodology.sub_methodology_id.clone(),
        methodology,
        paper_length_pages: data.paper_length.to_wire(),
        source_categories: data.source_categories.clone(),
    })
}

pub(crate) fn subsections(data: &WizardData, section: &Section) -> SubsectionsRequest {
    SubsectionsRequest {
        final_thesis: data.final_thesis.clone(),
        methodology: methodology_summary(data),
        section_title: section.title.clone(),
        section_context: section.context.clone(),
        paper_length_pages: data.paper_length.to_wire(),
        source_categories: data.source_categories.clone(),
    }
}

pub(crate) fn questions(
    data: &WizardData,
    section: &Section,
    subsection: &Subsection,
) -> QuestionsRequest {
    QuestionsRequest {
        final_thesis: data.final_thesis.clone(),
        methodology: methodology_summary(data),
        section_title: section.title.clone(),
        section_context: section.context.clone(),
        subsection_title: subsection.title.clone(),
        subsection_context: subsection.context.clone(),
    }
}

pub(crate) fn question_citations(
    data: &WizardData,
    section: &Section,
    subsection: &Subsection,
    question: &Question,
) -> QuestionCitationRequest {
    QuestionCitationRequest {
        final_thesis: data.final_thesis.clone(),
        methodology: methodology_summary(data),
        section_title: section.title.clone(),
        section_context: section.context.clone(),
        subsection_title: subsection.title.clone(),
        subsection_context: subsection.context.clone(),
        question: question.text.clone(),
        source_categories: data.source_categories.clone(),
        citation_count: CITATIONS_PER_QUESTION,
    }
}

/// Selected draft text for `question`, if it was drafted.
pub(crate) fn selected_draft<'a>(data: &'a WizardData, question: &Question) -> Option<&'a str> {
    data.draft_data
        .responses
        .get(&question.id)
        .and_then(|r| r.selected_text())
        .filter(|text| !text.trim().is_empty())
}

fn subsection_drafts(data: &WizardData, subsection: &Subsection) -> Vec<String> {
    subsection
        .questions
        .iter()
        .filter_map(|q| selected_draft(data, q))
        .map(str::to_string)
        .collect()
}

/// Digest every data section that has at least one drafted answer.
pub(crate) fn fused_outline(data: &WizardData) -> Result<FusedOutlineRequest, WizardError> {
    let pt = paper_type(data)?;
    let data_sections: Vec<DataSectionDigest> = data
        .outline_data
        .iter()
        .filter(|s| s.kind.is_data())
        .filter_map(|section| {
            let all_responses: Vec<String> = section
                .subsections
                .iter()
                .flat_map(|sub| subsection_drafts(data, sub))
                .collect();
            (!all_responses.is_empty()).then(|| DataSectionDigest {
                section_title: section.title.clone(),
                section_context: section.context.clone(),
                all_responses,
                all_citations: section
                    .subsections
                    .iter()
                    .flat_map(|sub| sub.questions.iter())
                    .flat_map(|q| q.citations.iter().cloned())
                    .collect(),
            })
        })
        .collect();
    if data_sections.is_empty() {
        return Err(WizardError::precondition(
            "no data section has a drafted answer; draft the questions first",
        ));
    }
    Ok(FusedOutlineRequest {
        data_sections,
        thesis: thesis(data).to_string(),
        methodology: methodology_summary(data),
        paper_type: pt.id.to_string(),
    })
}

pub(crate) fn final_text(data: &WizardData) -> FinalTextRequest {
    let responses: BTreeMap<String, String> = data
        .outline_data
        .iter()
        .flat_map(|s| s.subsections.iter())
        .flat_map(|sub| sub.questions.iter())
        .filter_map(|q| selected_draft(data, q).map(|text| (q.id.clone(), text.to_string())))
        .collect();
    FinalTextRequest {
        outline: data.outline_data.clone(),
        responses,
        thesis: thesis(data).to_string(),
        methodology: methodology_summary(data),
    }
}

/// Refinement request for one subsection, or `None` when it has no drafts.
pub(crate) fn refine_subsection(
    data: &WizardData,
    section: &Section,
    subsection: &Subsection,
) -> Option<RefineSubsectionRequest> {
    let responses = subsection_drafts(data, subsection);
    (!responses.is_empty()).then(|| RefineSubsectionRequest {
        section_title: section.title.clone(),
        subsection_title: subsection.title.clone(),
        thesis: thesis(data).to_string(),
        methodology: methodology_summary(data),
        responses,
    })
}

#[cfg(test)]
mod tests {
    use sage_core::entities::Methodology;
    use sage_core::enums::PaperLength;

    use super::*;

    #[test]
    fn methodology_summary_joins_title_and_description() {
        let mut data = WizardData::default();
        assert_eq!(methodology_summary(&data), "");

        data.methodology = Some(Methodology {
            title: "Case Study".into(),
            ..Methodology::default()
        });
        assert_eq!(methodology_summary(&data), "Case Study");

        data.methodology = Some(Methodology {
            title: "Case Study".into(),
            description: "Three NATO members".into(),
            ..Methodology::default()
        });
        assert_eq!(methodology_summary(&data), "Case Study: Three NATO members");
    }

    #[test]
    fn probing_request_carries_paper_descriptors() {
        let data = WizardData {
            selected_paper_type: Some("argumentative".into()),
            thesis_draft: "X should do Y".into(),
            ..WizardData::default()
        };
        let req = probing_questions(&data).unwrap();
        assert_eq!(req.thesis, "X should do Y");
        assert_eq!(req.paper_type, "Argumentative Paper");
        assert!(!req.paper_tone.is_empty());
    }

    #[test]
    fn special_lengths_use_wire_values() {
        let data = WizardData {
            final_thesis: "T".into(),
            paper_length: PaperLength::MaximumDetail,
            ..WizardData::default()
        };
        assert_eq!(recommend_sources(&data, Vec::new()).paper_length_pages, -2);
    }

    #[test]
    fn fused_request_only_carries_drafted_data_sections() {
        use sage_core::entities::{Citation, DraftResponse};
        use sage_core::enums::SectionKind;

        let mut answered = Question::new("What changed?");
        answered.citations.push(Citation {
            apa: "Smith, A. (2020).".into(),
            ..Citation::default()
        });
        let unanswered = Question::new("Why?");
        let mut sub = Subsection::new("Wages", "");
        sub.questions = vec![answered.clone(), unanswered];
        let mut findings = Section::new("Findings", "Evidence", SectionKind::Data);
        findings.subsections.push(sub);
        let mut empty = Section::new("Results", "", SectionKind::Data);
        empty.subsections.push(Subsection::new("Later", ""));

        let mut data = WizardData {
            selected_paper_type: Some("argumentative".into()),
            final_thesis: "T".into(),
            outline_data: vec![findings, empty],
            ..WizardData::default()
        };
        assert!(fused_outline(&data).is_err());

        data.draft_data.responses.insert(
            answered.id.clone(),
            DraftResponse::latest(vec!["one".into(), "fused".into()]),
        );
        let req = fused_outline(&data).unwrap();
        assert_eq!(req.data_sections.len(), 1);
        assert_eq!(req.data_sections[0].all_responses, vec!["fused".to_string()]);
        assert_eq!(req.data_sections[0].all_citations.len(), 1);
        assert_eq!(req.paper_type, "argumentative");

        let text = final_text(&data);
        assert_eq!(text.responses[&answered.id], "fused");
        let (drafted, untouched) = (&data.outline_data[0], &data.outline_data[1]);
        let refine = refine_subsection(&data, drafted, &drafted.subsections[0]).unwrap();
        assert_eq!(refine.responses, vec!["fused".to_string()]);
        assert!(refine_subsection(&data, untouched, &untouched.subsections[0]).is_none());
    }

    #[test]
    fn missing_paper_type_is_a_precondition_error() {
        let err = probing_questions(&WizardData::default()).unwrap_err();
        assert!(matches!(err, WizardError::Precondition(_)));
    }
}
