use std::collections::HashMap;

use crate::model::{Lift, RecordKey, WorldRecord};

/// Classification of one freshly scraped record against the stored snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    New(WorldRecord),
    Modified { old: WorldRecord, new: WorldRecord },
    Unchanged(WorldRecord),
}

/// A lift whose value moved between snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiftDelta {
    pub lift: Lift,
    pub old: Option<u32>,
    pub new: Option<u32>,
}

pub fn lift_deltas(old: &WorldRecord, new: &WorldRecord) -> Vec<LiftDelta> {
    Lift::ALL
        .into_iter()
        .filter(|&lift| old.lift(lift) != new.lift(lift))
        .map(|lift| LiftDelta {
            lift,
            old: old.lift(lift),
            new: new.lift(lift),
        })
        .collect()
}

/// Changes in the order of the new snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotDiff {
    pub changes: Vec<Change>,
}

impl SnapshotDiff {
    pub fn new_records(&self) -> impl Iterator<Item = &WorldRecord> {
        self.changes.iter().filter_map(|c| match c {
            Change::New(r) => Some(r),
            _ => None,
        })
    }

    /// `(new, old)` pairs.
    pub fn modified(&self) -> impl Iterator<Item = (&WorldRecord, &WorldRecord)> {
        self.changes.iter().filter_map(|c| match c {
            Change::Modified { old, new } => Some((new, old)),
            _ => None,
        })
    }

    pub fn counts(&self) -> DiffCounts {
        let mut counts = DiffCounts::default();
        for change in &self.changes {
            match change {
                Change::New(_) => counts.new += 1,
                Change::Modified { .. } => counts.modified += 1,
                Change::Unchanged(_) => counts.unchanged += 1,
            }
        }
        counts
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffCounts {
    pub new: usize,
    pub modified: usize,
    pub unchanged: usize,
}

impl DiffCounts {
    /// Rows a commit would insert or change.
    pub fn to_upsert(&self) -> usize {
        self.new + self.modified
    }
}

/// Classify each record of `new` against `prior`.
///
/// Keys only present in `prior` are not reported.
pub fn diff(new: &[WorldRecord], prior: &[WorldRecord]) -> SnapshotDiff {
    let by_key: HashMap<RecordKey, &WorldRecord> = prior.iter().map(|r| (r.key(), r)).collect();

    let changes = new
        .iter()
        .map(|record| match by_key.get(&record.key()) {
            None => Change::New(record.clone()),
            Some(&old) if same_values(old, record) => Change::Unchanged(record.clone()),
            Some(&old) => Change::Modified {
                old: old.clone(),
                new: record.clone(),
            },
        })
        .collect();

    SnapshotDiff { changes }
}

fn same_values(a: &WorldRecord, b: &WorldRecord) -> bool {
    a.snatch_record == b.snatch_record
        && a.cj_record == b.cj_record
        && a.total_record == b.total_record
}

// ── Tests ──
