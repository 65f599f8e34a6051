//! Extraction of a finding and a confidence score from model text.

use std::sync::LazyLock;

use regex::Regex;

static FINDING_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^[\s#>*\-\d.)]*(?:primary\s+diagnosis|diagnosis|assessment)\**\s*:\**\s*(.+)$")
        .expect("FINDING_LINE is a compile-time constant")
});

static CONFIDENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\bconfidence(?:\s+(?:level|score))?(?:\s*\(\s*0\s*-\s*100\s*%?\s*\))?\**\s*(?:[:=]|\bof\b)\**\s*(\d{1,3}(?:\.\d+)?)\s*(%?)",
    )
    .expect("CONFIDENCE is a compile-time constant")
});

/// What one model response says.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub text: String,
    /// `None` when the response states no confidence.
    pub confidence: Option<u8>,
}

/// Parse a model response.
///
/// The finding is the value of the first `Diagnosis:` / `Assessment:` /
/// `Primary diagnosis:` line, falling back to the first non-empty line.
/// The confidence is the number right after `confidence:`, `confidence =`
/// or `confidence of`, optionally followed by `%`. A bare fraction such as
/// `0.85` is read as 85%. Values are rounded and clamped to 100. An echoed
/// "(0-100%)" range is skipped; prose with no such marker yields `None`.
pub fn parse_model_response(text: &str) -> Finding {
    let labelled = FINDING_LINE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| clean(m.as_str()))
        .find(|s| !s.is_empty());

    let finding = labelled.unwrap_or_else(|| {
        text.lines()
            .map(clean)
            .find(|line| !line.is_empty())
            .unwrap_or_default()
    });

    let confidence = CONFIDENCE.captures(text).and_then(|caps| {
        let number = caps.get(1)?.as_str();
        let percent = caps.get(2).is_some_and(|m| !m.as_str().is_empty());
        score(number, percent)
    });

    Finding { text: finding, confidence }
}

fn score(number: &str, percent: bool) -> Option<u8> {
    let mut value: f64 = number.parse().ok()?;
    if !percent && number.contains('.') && value <= 1.0 {
        value *= 100.0;
    }
    Some(value.round().min(100.0) as u8)
}

fn clean(s: &str) -> String {
    s.trim()
        .trim_start_matches(['#', '*', '>', '-'])
        .trim_end_matches('*')
        .trim()
        .to_string()
}
