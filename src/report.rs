use std::fmt;

use crate::diff::{lift_deltas, SnapshotDiff};
use crate::model::WorldRecord;

fn na(v: Option<u32>) -> String {
    v.map(|n| n.to_string()).unwrap_or_else(|| "N/A".into())
}

/// Human-readable summary of what a commit would change.
pub struct DryRunSummary<'a> {
    records: &'a [WorldRecord],
    diff: &'a SnapshotDiff,
}

impl<'a> DryRunSummary<'a> {
    pub fn new(records: &'a [WorldRecord], diff: &'a SnapshotDiff) -> Self {
        Self { records, diff }
    }
}

impl fmt::Display for DryRunSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts = self.diff.counts();
        let rule = "=".repeat(80);
        let thin = "-".repeat(80);

        writeln!(f, "\n{rule}")?;
        writeln!(f, "DRY RUN MODE - NO CHANGES WILL BE MADE")?;
        writeln!(f, "{rule}")?;
        writeln!(f, "\nTotal records scraped: {}", self.records.len())?;
        writeln!(f, "Total records that would be UPSERTED: {}", counts.to_upsert())?;
        writeln!(f, "  - New records: {}", counts.new)?;
        writeln!(f, "  - Modified records: {}", counts.modified)?;
        writeln!(f, "  - Unchanged records: {}", counts.unchanged)?;

        if counts.new > 0 {
            writeln!(f, "\n{thin}")?;
            writeln!(f, "NEW RECORDS TO BE INSERTED ({}):", counts.new)?;
            writeln!(f, "{thin}")?;
            for r in self.diff.new_records() {
                writeln!(
                    f,
                    "  {:8} {:5} {:10} | Snatch: {:>6} | C&J: {:>6} | Total: {:>6}",
                    r.age_category,
                    r.gender,
                    r.weight_class,
                    na(r.snatch_record),
                    na(r.cj_record),
                    na(r.total_record)
                )?;
            }
        }

        if counts.modified > 0 {
            writeln!(f, "\n{thin}")?;
            writeln!(f, "MODIFIED RECORDS TO BE UPDATED ({}):", counts.modified)?;
            writeln!(f, "{thin}")?;
            for (new, old) in self.diff.modified() {
                writeln!(f, "  {:8} {:5} {:10}", new.age_category, new.gender, new.weight_class)?;
                for d in lift_deltas(old, new) {
                    let label = format!("{}:", d.lift.label());
                    writeln!(f, "    {:7} {} → {}", label, na(d.old), na(d.new))?;
                }
            }
        }

        if counts.to_upsert() == 0 {
            writeln!(f, "\n✅ No changes detected - all records are up to date!")?;
        }

        writeln!(f, "\n{rule}")
    }
}

// ── Tests ──
