//! Priority and automation block extraction.
//!
//! Both blocks are recognized inside the main scan; this module only knows
//! how to read a tier or recommendation heading and the dash-prefixed run
//! that follows it.

use qa_import_core::{AutomationRecommendationMap, AutomationStatus, Priority, PriorityMap};

use super::util::dash_item;
use super::{
    HIGH_AUTOMATION_HEADING, IndexedLine, LOW_AUTOMATION_HEADING, MEDIUM_AUTOMATION_HEADING,
    PATTERNS,
};

/// Parses a `P<n> - label` tier heading into its normalized priority.
pub fn priority_tier(line: &str) -> Option<Priority> {
    let caps = PATTERNS.priority_tier.captures(line)?;
    let level = caps.get(1)?.as_str().parse::<u32>().ok()?;
    Some(Priority::from_tier_level(level))
}

/// Recognizes a recommendation strength heading.
///
/// Only the `High` heading is part of the base grammar; `extended` adds the
/// `Medium` and `Low` variants.
pub fn automation_heading(line: &str, extended: bool) -> Option<AutomationStatus> {
    match line {
        HIGH_AUTOMATION_HEADING => Some(AutomationStatus::High),
        MEDIUM_AUTOMATION_HEADING if extended => Some(AutomationStatus::Medium),
        LOW_AUTOMATION_HEADING if extended => Some(AutomationStatus::Low),
        _ => None,
    }
}

/// Records every test-case id referenced in `run` under `tier`.
///
/// A line may list several ids (`- TC001, TC002`). Later assignments for the
/// same id overwrite earlier ones. Returns the number of ids recorded.
pub fn record_priority_run(map: &mut PriorityMap, tier: Priority, run: &[IndexedLine]) -> usize {
    let mut recorded = 0;
    for line in run {
        for id in PATTERNS.test_case_ref.find_iter(&line.text) {
            map.insert(id.as_str().to_string(), tier);
            recorded += 1;
        }
    }
    recorded
}

/// Records every non-empty dash item in `run` with `strength`.
/// Returns the number of recommendations recorded.
pub fn record_automation_run(
    map: &mut AutomationRecommendationMap,
    strength: AutomationStatus,
    run: &[IndexedLine],
) -> usize {
    let mut recorded = 0;
    for line in run {
        let Some(text) = dash_item(&line.text) else {
            continue;
        };
        if text.is_empty() {
            continue;
        }
        map.insert(text.to_string(), strength);
        recorded += 1;
    }
    recorded
}
