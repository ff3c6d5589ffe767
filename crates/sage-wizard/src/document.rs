//! Final document export.
//!
//! The outline is rendered as Markdown with conventional outline markers
//! (`I.` / `A.` / `1.` / `a.` / `i.` / `1)` / `a)`), the selected draft under
//! each question, and a numbered reference list. Citations are numbered by
//! first appearance across the whole outline, then the fused outline.
//!
//! Final-tab text is woven in when present: the abstract after the thesis,
//! refined prose under each subsection, transitions before the item whose
//! marker path they name (`I.A`), and the conclusion after the outline.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use sage_core::catalog;
use sage_core::entities::{FusedOutline, Section, WizardData, questions};

/// Outline marker for the `index`-th (0-based) item at `depth`.
#[must_use]
pub fn marker(depth: usize, index: usize) -> String {
    let n = index + 1;
    match depth % 7 {
        0 => format!("{}.", roman(n).to_uppercase()),
        1 => format!("{}.", alpha(n).to_uppercase()),
        2 => format!("{n}."),
        3 => format!("{}.", alpha(n)),
        4 => format!("{}.", roman(n)),
        5 => format!("{n})"),
        _ => format!("{})", alpha(n)),
    }
}

/// Lowercase roman numeral for `n` (1-based).
fn roman(mut n: usize) -> String {
    const TABLE: [(usize, &str); 13] = [
        (1000, "m"),
        (900, "cm"),
        (500, "d"),
        (400, "cd"),
        (100, "c"),
        (90, "xc"),
        (50, "l"),
        (40, "xl"),
        (10, "x"),
        (9, "ix"),
        (5, "v"),
        (4, "iv"),
        (1, "i"),
    ];
    let mut out = String::new();
    for (value, digits) in TABLE {
        while n >= value {
            out.push_str(digits);
            n -= value;
        }
    }
    out
}

/// Lowercase bijective base-26 letters: a..z, aa, ab, ...
fn alpha(mut n: usize) -> String {
    let mut out = Vec::new();
    while n > 0 {
        n -= 1;
        out.push(b'a' + u8::try_from(n % 26).unwrap_or(0));
        n /= 26;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// Distinct citation APA strings in order of first appearance.
#[must_use]
pub fn references(outline: &[Section]) -> Vec<String> {
    let mut refs: Vec<String> = Vec::new();
    for question in questions(outline) {
        for citation in &question.citations {
            if !refs.contains(&citation.apa) {
                refs.push(citation.apa.clone());
            }
        }
    }
    refs
}

/// Transition key for an outline item: its markers joined by `.`.
#[must_use]
pub fn marker_path(indices: &[usize]) -> String {
    indices
        .iter()
        .enumerate()
        .map(|(depth, &i)| {
            marker(depth, i)
                .trim_end_matches(['.', ')'])
                .to_string()
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// 1-based reference number of `apa` within `refs`.
#[must_use]
pub fn reference_number(refs: &[String], apa: &str) -> Option<usize> {
    refs.iter().position(|r| r == apa).map(|i| i + 1)
}

/// Render the whole project as a Markdown document.
#[must_use]
pub fn render_markdown(title: &str, data: &WizardData) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {title}\n");

    if let Some(pt) = data.selected_paper_type.as_deref().and_then(catalog::paper_type) {
        let _ = writeln!(out, "**Paper type:** {}  ", pt.name);
    }
    let _ = writeln!(out, "**Length:** {}\n", data.paper_length);

    let fin = &data.final_document;
    if !data.final_thesis.is_empty() {
        let _ = writeln!(out, "## Thesis\n\n{}\n", data.final_thesis);
    }
    if !fin.abstract_text.is_empty() {
        let _ = writeln!(out, "## Abstract\n\n{}\n", fin.abstract_text);
    }
    if let Some(m) = &data.methodology {
        let _ = writeln!(out, "## Methodology\n\n**{}**\n", m.title);
        if !m.description.is_empty() {
            let _ = writeln!(out, "{}\n", m.description);
        }
        if !fin.methodology.is_empty() {
            let _ = writeln!(out, "{}\n", fin.methodology);
        }
    }

    let mut refs = references(&data.outline_data);
    if let Some(fused) = &data.fused_outline {
        for citation in fused.citations() {
            if !refs.contains(&citation.apa) {
                refs.push(citation.apa.clone());
            }
        }
    }
    let mut placed = BTreeSet::new();
    let mut transition = |out: &mut String, path: &[usize]| {
        let key = marker_path(path);
        if let Some(text) = fin.transitions.get(&key) {
            let _ = writeln!(out, "_{text}_\n");
            placed.insert(key);
        }
    };

    if !data.outline_data.is_empty() {
        let _ = writeln!(out, "## Outline\n");
    }
    for (si, section) in data.outline_data.iter().enumerate() {
        transition(&mut out, &[si]);
        let _ = writeln!(out, "### {} {}\n", marker(0, si), section.title);
        if !section.context.is_empty() {
            let _ = writeln!(out, "_{}_\n", section.context);
        }
        for (ssi, subsection) in section.subsections.iter().enumerate() {
            transition(&mut out, &[si, ssi]);
            let _ = writeln!(out, "#### {} {}\n", marker(1, ssi), subsection.title);
            if let Some(prose) = fin.refined_subsections.get(&subsection.id) {
                let _ = writeln!(out, "{prose}\n");
            }
            for (qi, question) in subsection.questions.iter().enumerate() {
                let _ = writeln!(out, "{} {}", marker(2, qi), question.text);
                for (ci, citation) in question.citations.iter().enumerate() {
                    let number = reference_number(&refs, &citation.apa).unwrap_or(ci + 1);
                    let _ = writeln!(out, "   {} [{number}] {}", marker(3, ci), citation.apa);
                }
                let draft = data
                    .draft_data
                    .responses
                    .get(&question.id)
                    .and_then(|r| r.selected_text());
                if let Some(text) = draft {
                    out.push('\n');
                    for line in text.lines() {
                        let _ = writeln!(out, "> {line}");
                    }
                }
                out.push('\n');
            }
        }
    }

    if let Some(fused) = &data.fused_outline {
        render_fused(&mut out, fused, &refs);
    }

    let unplaced: Vec<_> = fin
        .transitions
        .iter()
        .filter(|(key, _)| !placed.contains(*key))
        .collect();
    if !unplaced.is_empty() {
        let _ = writeln!(out, "## Transitions\n");
        for (key, text) in unplaced {
            let _ = writeln!(out, "- **{key}:** {text}");
        }
        out.push('\n');
    }

    if !fin.conclusion.is_empty() {
        let _ = writeln!(out, "## Conclusion\n\n{}\n", fin.conclusion);
    }

    if !refs.is_empty() {
        let _ = writeln!(out, "## References\n");
        for (i, apa) in refs.iter().enumerate() {
            let _ = writeln!(out, "[{}] {apa}", i + 1);
        }
    }
    out
}

fn render_fused(out: &mut String, fused: &FusedOutline, refs: &[String]) {
    let _ = writeln!(out, "## Fused Outline\n");
    if !fused.outline_summary.is_empty() {
        let _ = writeln!(out, "{}\n", fused.outline_summary);
    }
    for note in &fused.restructuring_notes {
        let _ = writeln!(out, "- {note}");
    }
    if !fused.restructuring_notes.is_empty() {
        out.push('\n');
    }
    for (si, section) in fused.sections.iter().enumerate() {
        let _ = writeln!(out, "### {} {}\n", marker(0, si), section.title);
        if !section.section_summary.is_empty() {
            let _ = writeln!(out, "_{}_\n", section.section_summary);
        }
        for (ssi, subsection) in section.subsections.iter().enumerate() {
            let _ = writeln!(out, "#### {} {}\n", marker(1, ssi), subsection.title);
            if !subsection.content.is_empty() {
                let _ = writeln!(out, "{}\n", subsection.content);
            }
            for (ei, evidence) in subsection.supporting_evidence.iter().enumerate() {
                let _ = writeln!(out, "{} {evidence}", marker(2, ei));
            }
            for citation in &subsection.citations {
                if let Some(number) = reference_number(refs, &citation.apa) {
                    let _ = writeln!(out, "   [{number}] {}", citation.apa);
                }
            }
            out.push('\n');
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use sage_core::entities::{Citation, DraftResponse, Question, Subsection};
    use sage_core::enums::SectionKind;

    use super::*;

    #[rstest]
    #[case(0, 0, "I.")]
    #[case(0, 3, "IV.")]
    #[case(0, 13, "XIV.")]
    #[case(1, 0, "A.")]
    #[case(1, 26, "AA.")]
    #[case(2, 4, "5.")]
    #[case(3, 1, "b.")]
    #[case(4, 8, "ix.")]
    #[case(5, 0, "1)")]
    #[case(6, 2, "c)")]
    fn markers_by_depth(#[case] depth: usize, #[case] index: usize, #[case] expected: &str) {
        assert_eq!(marker(depth, index), expected);
    }

    fn citation(apa: &str) -> Citation {
        Citation {
            apa: apa.into(),
            ..Citation::default()
        }
    }

    fn sample() -> WizardData {
        let mut q1 = Question::new("What changed?");
        q1.citations = vec![citation("Smith (2020)."), citation("Jones (2019).")];
        let mut q2 = Question::new("Why?");
        q2.citations = vec![citation("Jones (2019).")];
        let mut sub = Subsection::new("Budget trends", "");
        sub.questions = vec![q1.clone(), q2];
        let mut evidence = Section::new("Evidence", "Primary data", SectionKind::Data);
        evidence.subsections = vec![sub];

        let mut data = WizardData {
            selected_paper_type: Some("argumentative".into()),
            final_thesis: "X should do Y".into(),
            outline_data: vec![
                Section::new("Introduction", "", SectionKind::Content),
                evidence,
            ],
            ..WizardData::default()
        };
        data.draft_data.responses.insert(
            q1.id,
            DraftResponse::latest(vec!["first".into(), "fused line 1\nfused line 2".into()]),
        );
        data
    }

    #[test]
    fn marker_paths_drop_trailing_punctuation() {
        assert_eq!(marker_path(&[0]), "I");
        assert_eq!(marker_path(&[1, 0]), "II.A");
        assert_eq!(marker_path(&[0, 2, 1]), "I.C.2");
    }

    #[test]
    fn final_text_is_woven_into_the_export() {
        use sage_core::entities::{FusedSection, FusedSubsection};

        let mut data = sample();
        let sub_id = data.outline_data[1].subsections[0].id.clone();
        data.fused_outline = Some(FusedOutline {
            outline_summary: "Budgets shape posture".into(),
            sections: vec![FusedSection {
                title: "Spending".into(),
                subsections: vec![FusedSubsection {
                    title: "Trends".into(),
                    content: "Steady growth".into(),
                    supporting_evidence: vec!["Table 2".into()],
                    citations: vec![citation("Jones (2019)."), citation("Brown (2021).")],
                }],
                ..FusedSection::default()
            }],
            ..FusedOutline::default()
        });
        let fin = &mut data.final_document;
        fin.abstract_text = "In short.".into();
        fin.conclusion = "Therefore.".into();
        fin.refined_subsections.insert(sub_id, "Spending rose steadily.".into());
        fin.transitions.insert("II.A".into(), "Turning to trends.".into());
        fin.transitions.insert("IX".into(), "Nowhere.".into());

        let md = render_markdown("Pacific Posture", &data);

        assert!(md.contains("## Thesis\n\nX should do Y\n\n## Abstract\n\nIn short."));
        assert!(md.contains("_Turning to trends._\n\n#### A. Budget trends\n\nSpending rose steadily."));
        assert!(md.contains("## Fused Outline\n\nBudgets shape posture"));
        assert!(md.contains("Steady growth\n\n1. Table 2\n   [2] Jones (2019).\n   [3] Brown (2021)."));
        assert!(md.contains("## Transitions\n\n- **IX:** Nowhere."));
        assert!(!md.contains("**II.A:**"));
        assert!(md.contains("## Conclusion\n\nTherefore."));
        assert!(md.ends_with("[3] Brown (2021).\n"));
    }

    #[test]
    fn references_deduplicate_in_first_seen_order() {
        let data = sample();
        assert_eq!(
            references(&data.outline_data),
            vec!["Smith (2020).".to_string(), "Jones (2019).".to_string()]
        );
    }

    #[test]
    fn markdown_contains_outline_and_selected_draft() {
        let md = render_markdown("Pacific Posture", &sample());
        assert!(md.starts_with("# Pacific Posture\n"));
        assert!(md.contains("**Paper type:** Argumentative Paper"));
        assert!(md.contains("### I. Introduction"));
        assert!(md.contains("### II. Evidence"));
        assert!(md.contains("#### A. Budget trends"));
        assert!(md.contains("1. What changed?\n   a. [1] Smith (2020).\n   b. [2] Jones (2019)."));
        assert!(md.contains("2. Why?\n   a. [2] Jones (2019)."));
        assert!(md.contains("> fused line 1\n> fused line 2"));
        assert!(!md.contains("> first"));
        assert!(md.ends_with("[1] Smith (2020).\n[2] Jones (2019).\n"));
    }
}
