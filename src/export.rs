use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::model::WorldRecord;

pub const HEADER: [&str; 6] = [
    "age_category",
    "gender",
    "weight_class",
    "snatch_record",
    "cj_record",
    "total_record",
];

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

fn write_row<W: Write, S: AsRef<str>>(w: &mut W, row: &[S]) -> io::Result<()> {
    for (i, cell) in row.iter().enumerate() {
        if i > 0 {
            w.write_all(b",")?;
        }
        let cell = cell.as_ref();
        if needs_quotes(cell) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            w.write_all(cell.as_bytes())?;
        }
    }
    w.write_all(b"\r\n")
}

fn cell(v: Option<u32>) -> String {
    v.map(|n| n.to_string()).unwrap_or_default()
}

pub fn write_records<W: Write>(mut w: W, records: &[WorldRecord]) -> io::Result<()> {
    write_row(&mut w, &HEADER)?;
    for r in records {
        write_row(
            &mut w,
            &[
                r.age_category.as_str().to_string(),
                r.gender.as_str().to_string(),
                r.weight_class.clone(),
                cell(r.snatch_record),
                cell(r.cj_record),
                cell(r.total_record),
            ],
        )?;
    }
    w.flush()
}

/// Overwrite `path` with the snapshot as CSV.
pub fn save_csv(path: &Path, records: &[WorldRecord]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    write_records(BufWriter::new(file), records)
        .with_context(|| format!("Failed to write {}", path.display()))
}

// ── Tests ──
