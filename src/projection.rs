// src/projection.rs

use std::fmt::Write as FmtWrite;

use ahash::AHashMap;
use rayon::prelude::*;

use crate::error::{AbundanceError, Result};
use crate::resolver::GroupOtus;
use crate::shared::SharedTable;
use crate::taxonomy::TaxonomyTable;
use crate::types::SampleRow;

/// How group OTUs are mapped to abundance-matrix columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinMode {
    /// Column looked up by OTU identifier in the abundance header.
    Keyed,
    /// Column taken from the OTU's taxonomy row position. Compatibility
    /// behavior for inputs whose header does not carry usable OTU ids.
    Positional,
}

/// The abundance matrix projected onto one group's OTU subset.
#[derive(Debug, Clone)]
pub struct GroupProjection {
    pub group: String,
    /// Projected column names, prefix plus de-padded number (`Otu5`).
    pub column_ids: Vec<String>,
    pub rows: Vec<SampleRow>,
}

impl GroupProjection {
    /// Renders the projection as CSV, one durable artifact per group.
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        out.push_str("Group");
        for id in &self.column_ids {
            write!(out, ",{}", id).unwrap();
        }
        out.push('\n');
        for row in &self.rows {
            out.push_str(&row.label);
            for count in &row.counts {
                write!(out, ",{}", count).unwrap();
            }
            out.push('\n');
        }
        out
    }
}

/// Verifies that taxonomy rows and abundance-matrix columns carry the same
/// OTU identifiers in the same order, and picks the join mode.
///
/// On mismatch the positional fallback is taken only when allowed, and only
/// with a warning; the original workflow aligned by position unconditionally
/// and silently, which corrupts every downstream result when the files drift.
pub fn check_alignment(
    taxonomy: &TaxonomyTable,
    shared: &SharedTable,
    allow_positional_fallback: bool,
) -> Result<JoinMode> {
    let n = taxonomy.len().max(shared.num_otus());
    let mut mismatch = None;
    for i in 0..n {
        let tax = taxonomy.rows.get(i).map(|r| r.otu.as_str());
        let head = shared.otu_ids.get(i).map(|s| s.as_str());
        if tax != head {
            mismatch = Some((i, tax.unwrap_or("(absent)"), head.unwrap_or("(absent)")));
            break;
        }
    }

    match mismatch {
        None => Ok(JoinMode::Keyed),
        Some((position, taxonomy, header)) if allow_positional_fallback => {
            log::warn!(
                "taxonomy/abundance OTU keys diverge at position {position} \
                 (`{taxonomy}` vs `{header}`); falling back to positional column selection"
            );
            Ok(JoinMode::Positional)
        }
        Some((position, taxonomy, header)) => Err(AbundanceError::KeyMismatch {
            position,
            taxonomy: taxonomy.to_string(),
            header: header.to_string(),
        }),
    }
}

/// Projects the abundance matrix onto one group's OTU subset.
///
/// Keeps the first `max_rows` sample rows. A group with no OTUs yields a
/// projection with the full row set and zero count columns.
pub fn project_group(
    shared: &SharedTable,
    group: &GroupOtus,
    mode: JoinMode,
    otu_prefix: &str,
    max_rows: usize,
) -> Result<GroupProjection> {
    let col_by_id: AHashMap<&str, usize> = shared
        .otu_ids
        .iter()
        .enumerate()
        .map(|(i, id)| (id.as_str(), i))
        .collect();

    let mut columns = Vec::with_capacity(group.entries.len());
    let mut column_ids = Vec::with_capacity(group.entries.len());
    for entry in &group.entries {
        let col = match mode {
            JoinMode::Keyed => {
                col_by_id
                    .get(entry.id.as_str())
                    .copied()
                    .ok_or_else(|| AbundanceError::KeyMismatch {
                        position: entry.row,
                        taxonomy: entry.id.clone(),
                        header: "(absent)".to_string(),
                    })?
            }
            JoinMode::Positional => entry.row,
        };
        if col >= shared.num_otus() {
            return Err(AbundanceError::OtuBounds {
                index: col,
                columns: shared.num_otus(),
            });
        }
        columns.push(col);
        column_ids.push(format!("{}{}", otu_prefix, entry.number));
    }

    let rows = shared
        .rows
        .iter()
        .take(max_rows)
        .map(|row| SampleRow {
            label: row.label.clone(),
            counts: columns.iter().map(|&c| row.counts[c]).collect(),
        })
        .collect();

    Ok(GroupProjection {
        group: group.name.clone(),
        column_ids,
        rows,
    })
}

/// Projects all groups. The projections are mutually independent reads of the
/// shared table, so they run in parallel.
pub fn project_groups(
    shared: &SharedTable,
    groups: &[GroupOtus],
    mode: JoinMode,
    otu_prefix: &str,
    max_rows: usize,
) -> Result<Vec<GroupProjection>> {
    groups
        .par_iter()
        .map(|g| project_group(shared, g, mode, otu_prefix, max_rows))
        .collect()
}
