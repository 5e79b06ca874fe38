// src/composer.rs

use std::fmt::Write as FmtWrite;

use crate::config::Config;
use crate::error::{AbundanceError, Result};
use crate::projection::GroupProjection;
use crate::types::{CompositionRecord, CompositionSeries, SampleKey};

/// A group projection with sample labels replaced by (location, depth) keys.
#[derive(Debug, Clone)]
pub struct LocatedProjection {
    pub group: String,
    pub column_ids: Vec<String>,
    pub rows: Vec<LocatedRow>,
}

/// One row of a located projection.
#[derive(Debug, Clone)]
pub struct LocatedRow {
    pub key: SampleKey,
    pub counts: Vec<u64>,
}

impl LocatedProjection {
    /// Renders the located table as CSV, the stage-two durable artifact.
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        out.push_str("Location,Depth (cm)");
        for id in &self.column_ids {
            write!(out, ",{}", id).unwrap();
        }
        out.push('\n');
        for row in &self.rows {
            write!(out, "{},{}", row.key.location, row.key.depth).unwrap();
            for count in &row.counts {
                write!(out, ",{}", count).unwrap();
            }
            out.push('\n');
        }
        out
    }
}

/// Carves location and depth out of a sample label at the configured spans.
///
/// The label encoding is a strict format contract: a label shorter than the
/// spans (or sliced off a UTF-8 boundary) is a format error naming the row.
pub fn extract_key(label: &str, config: &Config, row: usize) -> Result<SampleKey> {
    let err = || AbundanceError::LabelFormat {
        label: label.to_string(),
        row,
        need: config.required_label_len(),
    };
    let location = label.get(config.location_span.clone()).ok_or_else(err)?;
    let depth = label.get(config.depth_span.clone()).ok_or_else(err)?;
    Ok(SampleKey {
        location: location.to_string(),
        depth: depth.to_string(),
    })
}

/// Replaces each sample label with its (location, depth) key, keeping the
/// abundance columns untouched.
pub fn locate_rows(projection: &GroupProjection, config: &Config) -> Result<LocatedProjection> {
    let mut rows = Vec::with_capacity(projection.rows.len());
    for (i, row) in projection.rows.iter().enumerate() {
        rows.push(LocatedRow {
            key: extract_key(&row.label, config, i)?,
            counts: row.counts.clone(),
        });
    }
    Ok(LocatedProjection {
        group: projection.group.clone(),
        column_ids: projection.column_ids.clone(),
        rows,
    })
}

/// Builds the composition series for one location.
///
/// For every sample row at the location: one summed scalar per group, the
/// total across groups, and each group's fraction of that total. A zero
/// total yields 0.0 fractions. Records are ordered by numeric depth when
/// every depth code parses as an integer, otherwise in encountered order;
/// the original rendered encountered string order, which put depth `10`
/// before depth `2` on the x-axis.
pub fn compose_series(located: &[LocatedProjection], location: &str) -> Result<CompositionSeries> {
    let first = located.first().ok_or_else(|| {
        AbundanceError::Config("at least one group table is required".into())
    })?;

    // Row indices of the selected location, taken from the first group.
    // Every group table derives from the same truncated sample rows, so the
    // same indices must select the same samples everywhere.
    let selected: Vec<usize> = first
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| row.key.location == location)
        .map(|(i, _)| i)
        .collect();

    for table in located {
        if table.rows.len() != first.rows.len() {
            return Err(AbundanceError::TableMisaligned {
                group: table.group.clone(),
            });
        }
    }

    let mut records = Vec::with_capacity(selected.len());
    for &i in &selected {
        let group_sums: Vec<u64> = located
            .iter()
            .map(|table| table.rows[i].counts.iter().sum())
            .collect();
        let total: u64 = group_sums.iter().sum();
        let fractions: Vec<f64> = group_sums
            .iter()
            .map(|&sum| {
                if total == 0 {
                    0.0
                } else {
                    sum as f64 / total as f64
                }
            })
            .collect();
        records.push(CompositionRecord {
            depth: first.rows[i].key.depth.clone(),
            group_sums,
            total,
            fractions,
        });
    }

    // Numeric depth ordering when the codes allow it; stable, so equal
    // depths keep their encountered order.
    if records
        .iter()
        .all(|r| r.depth.trim().parse::<u64>().is_ok())
    {
        records.sort_by_cached_key(|r| r.depth.trim().parse::<u64>().unwrap_or(u64::MAX));
    }

    Ok(CompositionSeries {
        location: location.to_string(),
        groups: located.iter().map(|t| t.group.clone()).collect(),
        records,
    })
}

impl CompositionSeries {
    /// Renders the series as CSV: raw sums, total, then fractions, one row
    /// per depth. This is the table the stacked-bar renderer consumes.
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        out.push_str("Location,Depth (cm)");
        for g in &self.groups {
            write!(out, ",{}", g).unwrap();
        }
        out.push_str(",total");
        for g in &self.groups {
            write!(out, ",{}_frac", g).unwrap();
        }
        out.push('\n');

        for record in &self.records {
            write!(out, "{},{}", self.location, record.depth).unwrap();
            for sum in &record.group_sums {
                write!(out, ",{}", sum).unwrap();
            }
            write!(out, ",{}", record.total).unwrap();
            for frac in &record.fractions {
                write!(out, ",{:.6}", frac).unwrap();
            }
            out.push('\n');
        }
        out
    }
}
