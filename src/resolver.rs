// src/resolver.rs

use crate::config::GroupPattern;
use crate::error::{AbundanceError, Result};
use crate::taxonomy::TaxonomyTable;

/// One OTU selected for a functional group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtuEntry {
    /// Identifier as written in the taxonomy table, e.g. `Otu0005`.
    pub id: String,
    /// Numeric suffix with the prefix stripped, e.g. 5.
    pub number: u64,
    /// 0-based taxonomy row, which is also the OTU column position in the
    /// abundance matrix when the two files are aligned.
    pub row: usize,
}

/// The ordered OTU subset belonging to one functional group.
///
/// Zero entries is a legitimate outcome: the group projects to an empty
/// table and contributes zero to every downstream total.
#[derive(Debug, Clone)]
pub struct GroupOtus {
    pub name: String,
    pub entries: Vec<OtuEntry>,
}

/// Scans the taxonomy table for rows whose lineage contains the group's
/// pattern (case-sensitive substring), preserving table order. The match
/// order fixes the column order of the group's projection.
pub fn resolve_group(
    taxonomy: &TaxonomyTable,
    group: &GroupPattern,
    otu_prefix: &str,
) -> Result<GroupOtus> {
    let mut entries = Vec::new();

    for (row, tax_row) in taxonomy.rows.iter().enumerate() {
        if !tax_row.taxonomy.contains(&group.pattern) {
            continue;
        }
        let number = parse_otu_number(&tax_row.otu, otu_prefix, row)?;
        entries.push(OtuEntry {
            id: tax_row.otu.clone(),
            number,
            row,
        });
    }

    log::debug!(
        "group `{}`: {} OTU(s) matched pattern `{}`",
        group.name,
        entries.len(),
        group.pattern
    );
    Ok(GroupOtus {
        name: group.name.clone(),
        entries,
    })
}

/// Strips the fixed prefix from an OTU identifier and parses the remainder
/// as an integer. `Otu0005` with prefix `Otu` parses to 5.
fn parse_otu_number(otu: &str, prefix: &str, row: usize) -> Result<u64> {
    let err = || AbundanceError::OtuFormat {
        otu: otu.to_string(),
        row,
        prefix: prefix.to_string(),
    };
    let suffix = otu.strip_prefix(prefix).ok_or_else(err)?;
    suffix.parse().map_err(|_| err())
}
