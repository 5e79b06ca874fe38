// src/shared.rs

use std::path::Path;

use crate::error::{AbundanceError, Result};
use crate::table::{clean_header, open_table};
use crate::types::SampleRow;

/// The sample-by-OTU abundance matrix from a mothur shared file.
///
/// The `label` column (mothur's distance cutoff) and the `numOtus`
/// bookkeeping total are dropped at load; what remains is the sample label
/// plus one count column per OTU, in taxonomy-row order.
#[derive(Debug, Clone, Default)]
pub struct SharedTable {
    /// OTU column identifiers as written in the header, in column order.
    pub otu_ids: Vec<String>,
    pub rows: Vec<SampleRow>,
}

impl SharedTable {
    pub fn from_path(path: &Path) -> Result<Self> {
        let mut rdr = open_table(path)?;
        let headers = rdr.headers()?.clone();
        let file = path.display().to_string();

        let cleaned: Vec<String> = headers.iter().map(|h| clean_header(h).to_string()).collect();
        let group_col = cleaned
            .iter()
            .position(|h| h == "Group")
            .ok_or_else(|| AbundanceError::MissingColumn {
                name: "Group".into(),
                file: file.clone(),
            })?;

        // Everything after Group is an OTU column, bookkeeping aside.
        let mut otu_cols = Vec::new();
        let mut otu_ids = Vec::new();
        for (i, h) in cleaned.iter().enumerate() {
            if i <= group_col || h == "label" || h.eq_ignore_ascii_case("numOtus") {
                continue;
            }
            otu_cols.push(i);
            otu_ids.push(h.clone());
        }

        let mut rows = Vec::new();
        for (r, record) in rdr.records().enumerate() {
            let record = record?;
            let label = record.get(group_col).unwrap_or("").to_string();

            let mut counts = Vec::with_capacity(otu_cols.len());
            for (&c, id) in otu_cols.iter().zip(&otu_ids) {
                let value = record.get(c).unwrap_or("");
                let count: u64 = value.parse().map_err(|_| AbundanceError::CountFormat {
                    value: value.to_string(),
                    row: r,
                    column: id.clone(),
                })?;
                counts.push(count);
            }
            rows.push(SampleRow { label, counts });
        }

        log::debug!(
            "loaded {} sample rows x {} OTU columns from {}",
            rows.len(),
            otu_ids.len(),
            file
        );
        Ok(Self { otu_ids, rows })
    }

    /// Number of OTU columns.
    pub fn num_otus(&self) -> usize {
        self.otu_ids.len()
    }

    /// Drops OTU columns beyond the first `n`.
    ///
    /// A shared file can carry more OTU columns than the taxonomy table has
    /// rows; columns without taxonomic data cannot belong to any functional
    /// group and are cut before projection.
    pub fn truncate_columns(&mut self, n: usize) {
        if self.otu_ids.len() <= n {
            return;
        }
        log::debug!(
            "trimming abundance matrix from {} to {} OTU columns to match taxonomy",
            self.otu_ids.len(),
            n
        );
        self.otu_ids.truncate(n);
        for row in &mut self.rows {
            row.counts.truncate(n);
        }
    }
}
