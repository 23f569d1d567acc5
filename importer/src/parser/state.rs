//! Scan state machine for the combined structure and metadata pass.
//!
//! Each normalized line is classified into a [`LineKind`] (first matching
//! rule wins) and handed to exactly one transition method on [`Scanner`].
//! The block modes live in a single [`ScanMode`] value, so the priority and
//! automation blocks can never be active at the same time.

use tracing::{trace, warn};

use qa_import_core::{AutomationStatus, ParsedDocument, Priority, TestCaseDraft};

use super::util::take_while_true;
use super::{
    AUTOMATION_BLOCK_MARKER, IndexedLine, PATTERNS, PRIORITY_BLOCK_MARKER, ParseOptions, metadata,
};

/// Which auxiliary block, if any, the scan is inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanMode {
    #[default]
    Body,
    PriorityBlock,
    AutomationBlock,
}

/// Category of one normalized line, in rule order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    SectionHeader,
    SubsectionHeader,
    TestCase { id: &'a str, title: &'a str },
    ExpectedResult(&'a str),
    PriorityMarker,
    AutomationMarker,
    /// `P<n> - label` inside the priority block.
    PriorityTier(Priority),
    /// `<Strength> Priority for Automation` inside the automation block.
    AutomationHeading(AutomationStatus),
    Text,
}

/// Classifies a line given the current block mode.
pub fn classify_line<'a>(line: &'a str, mode: ScanMode, options: &ParseOptions) -> LineKind<'a> {
    if PATTERNS.section_header.is_match(line) {
        return LineKind::SectionHeader;
    }
    if PATTERNS.subsection_header.is_match(line) {
        return LineKind::SubsectionHeader;
    }
    if let Some(caps) = PATTERNS.test_case_line.captures(line) {
        let id = caps.get(1).map_or("", |m| m.as_str());
        let title = caps.get(2).map_or("", |m| m.as_str().trim());
        return LineKind::TestCase { id, title };
    }
    if let Some(caps) = PATTERNS.expected_result.captures(line) {
        return LineKind::ExpectedResult(caps.get(1).map_or("", |m| m.as_str().trim()));
    }
    if line == PRIORITY_BLOCK_MARKER {
        return LineKind::PriorityMarker;
    }
    if line == AUTOMATION_BLOCK_MARKER {
        return LineKind::AutomationMarker;
    }
    match mode {
        ScanMode::PriorityBlock => {
            if let Some(tier) = metadata::priority_tier(line) {
                return LineKind::PriorityTier(tier);
            }
        }
        ScanMode::AutomationBlock => {
            if let Some(strength) =
                metadata::automation_heading(line, options.extended_automation_tiers)
            {
                return LineKind::AutomationHeading(strength);
            }
        }
        ScanMode::Body => {}
    }
    LineKind::Text
}

/// Counters and messages produced alongside the document.
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    pub recognized_lines: usize,
    pub unresolved_lines: Vec<String>,
    pub lenient_finalizations: usize,
    pub warnings: Vec<String>,
}

/// Single-pass scanner holding the explicit parse state.
#[derive(Debug)]
pub struct Scanner {
    options: ParseOptions,
    mode: ScanMode,
    section: Option<String>,
    subsection: Option<String>,
    open: Option<TestCaseDraft>,
    document: ParsedDocument,
    outcome: ScanOutcome,
}

impl Scanner {
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            mode: ScanMode::Body,
            section: None,
            subsection: None,
            open: None,
            document: ParsedDocument::default(),
            outcome: ScanOutcome::default(),
        }
    }

    pub fn mode(&self) -> ScanMode {
        self.mode
    }

    /// Walks every line once. Metadata runs are consumed together with the
    /// heading that introduces them.
    pub fn run(&mut self, lines: &[IndexedLine]) {
        let mut cursor = 0;
        while cursor < lines.len() {
            cursor += self.step(lines, cursor);
        }
    }

    /// Applies the transition for `lines[cursor]` and returns how many lines
    /// it consumed (always at least one).
    pub fn step(&mut self, lines: &[IndexedLine], cursor: usize) -> usize {
        let line = &lines[cursor];
        let kind = classify_line(&line.text, self.mode, &self.options);
        trace!(line = line.index, ?kind, mode = ?self.mode, "Scan transition");

        match kind {
            LineKind::SectionHeader => self.on_section_header(&line.text),
            LineKind::SubsectionHeader => self.on_subsection_header(&line.text),
            LineKind::TestCase { id, title } => self.on_test_case(id, title),
            LineKind::ExpectedResult(text) => self.on_expected_result(line, text),
            LineKind::PriorityMarker => self.enter_mode(ScanMode::PriorityBlock),
            LineKind::AutomationMarker => self.enter_mode(ScanMode::AutomationBlock),
            LineKind::PriorityTier(tier) => {
                let run = dash_run(&lines[cursor + 1..]);
                self.on_priority_tier(tier, run);
                return 1 + run.len();
            }
            LineKind::AutomationHeading(strength) => {
                let run = dash_run(&lines[cursor + 1..]);
                self.on_automation_heading(strength, run);
                return 1 + run.len();
            }
            LineKind::Text => self.on_text(line),
        }
        1
    }

    /// Closes any open draft and hands back the document and counters.
    pub fn finish(mut self) -> (ParsedDocument, ScanOutcome) {
        self.finalize_open(true);
        (self.document, self.outcome)
    }

    fn on_section_header(&mut self, heading: &str) {
        self.outcome.recognized_lines += 1;
        self.document.section_entry(heading);
        self.section = Some(heading.to_string());
        self.subsection = None;
    }

    fn on_subsection_header(&mut self, heading: &str) {
        self.outcome.recognized_lines += 1;
        if let Some(section) = &self.section {
            self.document.section_entry(section).subsection_entry(heading);
        }
        self.subsection = Some(heading.to_string());
    }

    fn on_test_case(&mut self, id: &str, title: &str) {
        self.outcome.recognized_lines += 1;
        self.finalize_open(true);
        self.open = Some(TestCaseDraft::new(
            id,
            title,
            self.section.as_deref(),
            self.subsection.as_deref(),
        ));
    }

    fn on_expected_result(&mut self, line: &IndexedLine, text: &str) {
        match self.open.as_mut() {
            Some(draft) => {
                self.outcome.recognized_lines += 1;
                draft.expected_result = text.to_string();
                self.finalize_open(false);
            }
            None => {
                warn!(line = line.index, "Expected result without an open test case");
                self.outcome.unresolved_lines.push(line.text.clone());
            }
        }
    }

    fn enter_mode(&mut self, mode: ScanMode) {
        self.outcome.recognized_lines += 1;
        self.mode = mode;
    }

    fn on_priority_tier(&mut self, tier: Priority, run: &[IndexedLine]) {
        let recorded = metadata::record_priority_run(&mut self.document.priorities, tier, run);
        trace!(%tier, ids = recorded, "Recorded priority tier");
        self.outcome.recognized_lines += 1 + run.len();
    }

    fn on_automation_heading(&mut self, strength: AutomationStatus, run: &[IndexedLine]) {
        let recorded = metadata::record_automation_run(&mut self.document.automation, strength, run);
        trace!(%strength, recommendations = recorded, "Recorded automation run");
        self.outcome.recognized_lines += 1 + run.len();
    }

    fn on_text(&mut self, line: &IndexedLine) {
        match self.open.as_mut() {
            Some(draft) => {
                self.outcome.recognized_lines += 1;
                draft.push_description(&line.text);
            }
            None => self.outcome.unresolved_lines.push(line.text.clone()),
        }
    }

    /// Emits the open draft to the flat list and, when its section and
    /// subsection are indexed, to the nested tree.
    fn finalize_open(&mut self, lenient: bool) {
        let Some(draft) = self.open.take() else {
            return;
        };

        if lenient && !draft.has_expected_result() {
            warn!(id = %draft.id, "Test case closed without an expected result");
            self.outcome.lenient_finalizations += 1;
            self.outcome
                .warnings
                .push(format!("{} has no expected result", draft.id));
        }

        if let (Some(section), Some(subsection)) = (&draft.section, &draft.subsection) {
            let indexed = self
                .document
                .find_section(section)
                .is_some_and(|s| s.find_subsection(subsection).is_some());
            if indexed {
                self.document
                    .section_entry(section)
                    .subsection_entry(subsection)
                    .test_cases
                    .push(draft.clone());
            }
        }
        self.document.test_cases.push(draft);
    }
}

fn dash_run(lines: &[IndexedLine]) -> &[IndexedLine] {
    take_while_true(lines, |line| line.text.starts_with('-'))
}
