pub mod fields;
pub mod sections;

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::model::{QueryConfig, WorldRecord};

/// Two-pass pipeline: html → paired sections → weight-class records.
pub fn parse_page(html: &str, config: &QueryConfig) -> Vec<WorldRecord> {
    let mut seen = HashSet::new();
    let mut records = Vec::new();

    for section in sections::pair_sections(html) {
        if !fields::is_weight_class(&section.heading) {
            continue;
        }
        let weight_class = fields::normalize_weight_class(&section.heading);
        let Some(body) = section.body else {
            debug!(%config, %weight_class, "no content block, skipping");
            continue;
        };

        let lifts = fields::extract_lifts(&body);
        let record = WorldRecord {
            age_category: config.age_category,
            gender: config.gender,
            weight_class,
            snatch_record: lifts.snatch,
            cj_record: lifts.cj,
            total_record: lifts.total,
        };

        if !seen.insert(record.key()) {
            warn!(%config, weight_class = %record.weight_class, "duplicate weight class on page, keeping first");
            continue;
        }
        records.push(record);
    }

    records
}

// ── Tests ──
