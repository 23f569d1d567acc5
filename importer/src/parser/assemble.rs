//! Merges priority and automation metadata onto parsed test cases.

use serde::{Deserialize, Serialize};

use qa_import_core::{
    AutomationRecommendationMap, AutomationStatus, ParsedDocument, Priority, PriorityMap,
    TestCaseDraft,
};

/// How a test case is matched against automation recommendations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum MatchStrategy {
    /// First recommendation, in document order, contained in the case text.
    #[default]
    FirstMatch,
    /// Longest contained recommendation; ties go to the earlier one.
    LongestMatch,
}

/// Assembly settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AssembleOptions {
    /// Priority for cases absent from the priority block.
    pub default_priority: Priority,
    pub matching: MatchStrategy,
}

/// Returns copies of `drafts` with priority and automation status filled in,
/// using the default options. The maps are not modified.
///
/// # Examples
///
/// ```
/// use qa_import::parser::assemble::assemble;
/// use qa_import_core::*;
///
/// let drafts = vec![TestCaseDraft::new("TC001", "Basic login flow", None, None)];
/// let mut priorities = PriorityMap::new();
/// priorities.insert("TC001".into(), Priority::High);
/// let mut automation = AutomationRecommendationMap::new();
/// automation.insert("basic LOGIN".into(), AutomationStatus::High);
///
/// let assembled = assemble(&drafts, &priorities, &automation);
/// assert_eq!(assembled[0].priority, Priority::High);
/// assert_eq!(assembled[0].automation_status, AutomationStatus::High);
/// ```
pub fn assemble(
    drafts: &[TestCaseDraft],
    priorities: &PriorityMap,
    automation: &AutomationRecommendationMap,
) -> Vec<TestCaseDraft> {
    assemble_with(drafts, priorities, automation, &AssembleOptions::default())
}

pub fn assemble_with(
    drafts: &[TestCaseDraft],
    priorities: &PriorityMap,
    automation: &AutomationRecommendationMap,
    options: &AssembleOptions,
) -> Vec<TestCaseDraft> {
    drafts
        .iter()
        .cloned()
        .map(|mut draft| {
            enrich(&mut draft, priorities, automation, options);
            draft
        })
        .collect()
}

/// Applies assembly to the flat list and to every draft in the section tree.
pub fn assemble_document(mut doc: ParsedDocument, options: &AssembleOptions) -> ParsedDocument {
    let ParsedDocument {
        test_cases,
        sections,
        priorities,
        automation,
    } = &mut doc;

    for draft in test_cases.iter_mut() {
        enrich(draft, priorities, automation, options);
    }
    for sub in sections.iter_mut().flat_map(|s| s.subsections.iter_mut()) {
        for draft in &mut sub.test_cases {
            enrich(draft, priorities, automation, options);
        }
    }
    doc
}

fn enrich(
    draft: &mut TestCaseDraft,
    priorities: &PriorityMap,
    automation: &AutomationRecommendationMap,
    options: &AssembleOptions,
) {
    draft.priority = priorities
        .get(&draft.id)
        .copied()
        .unwrap_or(options.default_priority);
    draft.automation_status = match_recommendation(draft, automation, options.matching)
        .unwrap_or(AutomationStatus::NotPrioritized);
}

/// Finds the recommendation strength for `draft`, if any key matches.
pub fn match_recommendation(
    draft: &TestCaseDraft,
    automation: &AutomationRecommendationMap,
    strategy: MatchStrategy,
) -> Option<AutomationStatus> {
    let haystack = draft.searchable_text().to_lowercase();
    let mut candidates = automation
        .iter()
        .filter(|(key, _)| !key.is_empty() && haystack.contains(&key.to_lowercase()));

    match strategy {
        MatchStrategy::FirstMatch => candidates.next().map(|(_, strength)| *strength),
        MatchStrategy::LongestMatch => candidates
            .fold(None, |best: Option<(&String, &AutomationStatus)>, candidate| {
                match best {
                    Some(current) if current.0.chars().count() >= candidate.0.chars().count() => {
                        Some(current)
                    }
                    _ => Some(candidate),
                }
            })
            .map(|(_, strength)| *strength),
    }
}
