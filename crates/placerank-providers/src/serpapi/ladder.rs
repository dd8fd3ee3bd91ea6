//! Location degradation ladder for web-local searches.
//!
//! Verbose location strings (administrative suffixes, parenthetical notes,
//! long comma chains) are a common cause of parameter rejections. The ladder
//! retries with progressively coarser locations, but only when the provider
//! actually rejected the parameters.

use std::sync::LazyLock;

use regex::Regex;

static PARENTHETICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^)]*\)").expect("valid regex"));

const MUNICIPAL_SUFFIX: &str = "Municipal Corporation";
const MAX_SEGMENTS: usize = 2;

/// Strips parenthetical segments and the phrase "Municipal Corporation", then
/// keeps at most the first two non-empty comma-separated segments.
///
/// Returns `None` for a missing or blank location. If stripping removes
/// everything, the trimmed input is returned unchanged.
#[must_use]
pub fn simplify_location(location: Option<&str>) -> Option<String> {
    let raw = location.map(str::trim).filter(|l| !l.is_empty())?;
    let without_notes = PARENTHETICAL.replace_all(raw, "");
    let segments: Vec<String> = without_notes
        .split(',')
        .map(|segment| segment.replace(MUNICIPAL_SUFFIX, "").trim().to_string())
        .filter(|segment| !segment.is_empty())
        .take(MAX_SEGMENTS)
        .collect();
    if segments.is_empty() {
        Some(raw.to_string())
    } else {
        Some(segments.join(", "))
    }
}

/// The first comma segment of `location`, when that differs from the whole.
#[must_use]
pub fn aggressive_location(location: &str) -> Option<String> {
    let first = location.split(',').next().map(str::trim)?;
    (!first.is_empty() && first != location.trim()).then(|| first.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LadderStep {
    /// Simplified location.
    Initial,
    /// First segment of the simplified location only.
    Aggressive,
    /// `location` omitted.
    NoLocation,
    /// No attempts left.
    Exhausted,
}

impl std::fmt::Display for LadderStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Initial => "initial",
            Self::Aggressive => "aggressive_location",
            Self::NoLocation => "no_location",
            Self::Exhausted => "exhausted",
        };
        f.write_str(name)
    }
}

/// State of one web-local search's retry ladder. At most three attempts.
#[derive(Debug, Clone)]
pub struct LocationLadder {
    simplified: Option<String>,
    aggressive: Option<String>,
    step: LadderStep,
}

impl LocationLadder {
    #[must_use]
    pub fn new(location: Option<&str>) -> Self {
        let simplified = simplify_location(location);
        let aggressive = simplified.as_deref().and_then(aggressive_location);
        Self {
            simplified,
            aggressive,
            step: LadderStep::Initial,
        }
    }

    #[must_use]
    pub fn step(&self) -> LadderStep {
        self.step
    }

    /// The `location` parameter for the current step.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        match self.step {
            LadderStep::Initial => self.simplified.as_deref(),
            LadderStep::Aggressive => self.aggressive.as_deref(),
            LadderStep::NoLocation | LadderStep::Exhausted => None,
        }
    }

    /// Moves past a failed attempt and returns the new step.
    ///
    /// `rejected` is whether the failure was a parameter rejection. Any other
    /// failure exhausts the ladder immediately.
    pub fn advance(&mut self, rejected: bool) -> LadderStep {
        self.step = match (self.step, rejected) {
            (_, false) | (LadderStep::NoLocation | LadderStep::Exhausted, true) => {
                LadderStep::Exhausted
            }
            (LadderStep::Initial, true) if self.aggressive.is_some() => LadderStep::Aggressive,
            (LadderStep::Initial | LadderStep::Aggressive, true) if self.simplified.is_some() => {
                LadderStep::NoLocation
            }
            (LadderStep::Initial | LadderStep::Aggressive, true) => LadderStep::Exhausted,
        };
        self.step
    }
}
