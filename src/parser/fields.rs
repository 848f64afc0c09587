use std::sync::LazyLock;

use regex::Regex;

use crate::model::Lift;

static RECORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Record:\s*(\d+(?:\.\d+)?)\s*kg").unwrap());

/// Unit in any case, with the whitespace (nbsp included) in front of it.
static UNIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\s*kg").unwrap());

pub const UNIT: &str = "kg";

/// Accepted spellings per lift, tried in order; the earliest hit wins.
fn labels(lift: Lift) -> &'static [&'static str] {
    match lift {
        Lift::Snatch => &["Snatch"],
        Lift::CleanAndJerk => &["C&J", "Clean & Jerk"],
        Lift::Total => &["Total"],
    }
}

/// Only headings mentioning the unit are weight-class sections.
pub fn is_weight_class(heading: &str) -> bool {
    heading.to_lowercase().contains(UNIT)
}

/// "61 kg" -> "61kg", " +110 KG " -> "+110kg"
pub fn normalize_weight_class(heading: &str) -> String {
    UNIT_RE
        .replace_all(heading.trim(), UNIT)
        .replace('\u{a0}', "")
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LiftValues {
    pub snatch: Option<u32>,
    pub cj: Option<u32>,
    pub total: Option<u32>,
}

/// Scan a content block for the three lift slots.
///
/// Labels are located in fixed order, each searched after the previous hit.
/// A slot's text runs from its label to the next located label (or the end).
/// A missing label leaves its slot empty.
pub fn extract_lifts(text: &str) -> LiftValues {
    let mut hits: Vec<(Lift, usize, usize)> = Vec::with_capacity(3);
    let mut cursor = 0;

    for lift in Lift::ALL {
        if let Some((start, len)) = find_label(&text[cursor..], labels(lift)) {
            let start = cursor + start;
            hits.push((lift, start, start + len));
            cursor = start + len;
        }
    }

    let mut values = LiftValues::default();
    for (i, &(lift, _, body_start)) in hits.iter().enumerate() {
        let end = hits.get(i + 1).map(|h| h.1).unwrap_or(text.len());
        let value = record_value(&text[body_start..end]);
        match lift {
            Lift::Snatch => values.snatch = value,
            Lift::CleanAndJerk => values.cj = value,
            Lift::Total => values.total = value,
        }
    }
    values
}

fn find_label(haystack: &str, candidates: &[&str]) -> Option<(usize, usize)> {
    candidates
        .iter()
        .filter_map(|label| haystack.find(label).map(|pos| (pos, label.len())))
        .min_by_key(|&(pos, _)| pos)
}

/// First `Record: N kg` in the segment, truncated to whole kilograms.
fn record_value(segment: &str) -> Option<u32> {
    let caps = RECORD_RE.captures(segment)?;
    let kg: f64 = caps[1].parse().ok()?;
    if !kg.is_finite() || kg < 0.0 || kg > u32::MAX as f64 {
        return None;
    }
    Some(kg.trunc() as u32)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_three_with_world_standard_marker() {
        let v = extract_lifts(
            "Snatch Record: 141 kg World Standard C&J Record: 172 kg Total Record: 313 kg",
        );
        assert_eq!(
            v,
            LiftValues {
                snatch: Some(141),
                cj: Some(172),
                total: Some(313),
            }
        );
    }

    #[test]
    fn snatch_only() {
        let v = extract_lifts("Snatch Record: 88 kg");
        assert_eq!(v.snatch, Some(88));
        assert_eq!(v.cj, None);
        assert_eq!(v.total, None);
    }

    #[test]
    fn world_standard_slot_still_reads_record() {
        let v = extract_lifts("Snatch World Standard Record: 120 kg C&J Record: 150 kg");
        assert_eq!(v.snatch, Some(120));
        assert_eq!(v.cj, Some(150));
    }

    #[test]
    fn world_standard_without_record_is_absent() {
        let v = extract_lifts("Snatch World Standard C&J Record: 150 kg Total World Standard");
        assert_eq!(v.snatch, None);
        assert_eq!(v.cj, Some(150));
        assert_eq!(v.total, None);
    }

    #[test]
    fn missing_middle_label_does_not_shift_slots() {
        let v = extract_lifts("Snatch Record: 100 kg Total Record: 230 kg");
        assert_eq!(v.snatch, Some(100));
        assert_eq!(v.cj, None);
        assert_eq!(v.total, Some(230));
    }

    #[test]
    fn long_label_spelling() {
        let v = extract_lifts("Snatch Record: 90 kg Clean & Jerk Record: 115 kg");
        assert_eq!(v.cj, Some(115));
    }

    #[test]
    fn fraction_is_truncated() {
        assert_eq!(extract_lifts("Total Record: 313.9 kg").total, Some(313));
    }

    #[test]
    fn no_labels_means_no_values() {
        assert_eq!(extract_lifts("Record: 100 kg"), LiftValues::default());
    }

    #[test]
    fn weight_class_labels() {
        assert!(is_weight_class("61 kg"));
        assert!(is_weight_class("+110 KG"));
        assert!(!is_weight_class("Records"));
        assert_eq!(normalize_weight_class("  61 kg "), "61kg");
        assert_eq!(normalize_weight_class("+110 kg"), "+110kg");
        assert_eq!(normalize_weight_class("+110\u{a0}kg"), "+110kg");
        assert_eq!(normalize_weight_class("+110 KG"), "+110kg");
        assert_eq!(normalize_weight_class("87 Kg"), "87kg");
        assert_eq!(normalize_weight_class("55kg"), "55kg");
        assert_eq!(normalize_weight_class("+87\u{a0}\u{a0}KG "), "+87kg");
    }
}
