// src/taxonomy.rs

use std::path::Path;

use ahash::AHashMap;

use crate::error::{AbundanceError, Result};
use crate::table::{find_column, open_table};

/// One row of a mothur-style taxonomy table.
#[derive(Debug, Clone)]
pub struct TaxonomyRow {
    /// OTU identifier as written in the file, e.g. `Otu0042`.
    pub otu: String,
    /// Free-text lineage string the group patterns are matched against.
    pub taxonomy: String,
}

/// The taxonomy table, in file order. Row order is load-bearing: taxonomy row
/// `i` corresponds to OTU column `i` of the abundance matrix.
#[derive(Debug, Clone, Default)]
pub struct TaxonomyTable {
    pub rows: Vec<TaxonomyRow>,
}

impl TaxonomyTable {
    /// Loads a taxonomy table from a tab- or comma-separated file.
    ///
    /// Requires `OTU` and `Taxonomy` columns (any extra columns such as
    /// mothur's `Size` are ignored) and rejects duplicate OTU identifiers.
    pub fn from_path(path: &Path) -> Result<Self> {
        let mut rdr = open_table(path)?;
        let headers = rdr.headers()?.clone();
        let file = path.display().to_string();

        let otu_col = find_column(&headers, "OTU").ok_or_else(|| AbundanceError::MissingColumn {
            name: "OTU".into(),
            file: file.clone(),
        })?;
        let tax_col =
            find_column(&headers, "Taxonomy").ok_or_else(|| AbundanceError::MissingColumn {
                name: "Taxonomy".into(),
                file: file.clone(),
            })?;

        let mut rows = Vec::new();
        let mut seen: AHashMap<String, usize> = AHashMap::new();

        for (i, record) in rdr.records().enumerate() {
            let record = record?;
            let otu = record.get(otu_col).unwrap_or("").to_string();
            let taxonomy = record.get(tax_col).unwrap_or("").to_string();

            if let Some(&first) = seen.get(&otu) {
                return Err(AbundanceError::DuplicateOtu {
                    otu,
                    first,
                    second: i,
                });
            }
            seen.insert(otu.clone(), i);
            rows.push(TaxonomyRow { otu, taxonomy });
        }

        log::debug!("loaded {} taxonomy rows from {}", rows.len(), file);
        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("relabund_tax_{}_{}", std::process::id(), name));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn loads_tab_separated_taxonomy() {
        let path = write_temp(
            "basic.taxonomy",
            "OTU\tSize\tTaxonomy\nOtu001\t120\tBacteria;Geobacter sp.;\nOtu002\t44\tBacteria;Shewanella;\n",
        );
        let table = TaxonomyTable::from_path(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0].otu, "Otu001");
        assert!(table.rows[1].taxonomy.contains("Shewan"));
    }

    #[test]
    fn loads_csv_with_bom_header() {
        let path = write_temp(
            "bom.csv",
            "\u{feff}OTU,Size,Taxonomy\nOtu001,120,Bacteria;Geobacter sp.;\n",
        );
        let table = TaxonomyTable::from_path(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0].otu, "Otu001");
    }

    #[test]
    fn missing_taxonomy_column_is_an_error() {
        let path = write_temp("nocol.csv", "OTU,Size\nOtu001,120\n");
        let err = TaxonomyTable::from_path(&path).unwrap_err();
        fs::remove_file(&path).ok();

        assert!(matches!(err, AbundanceError::MissingColumn { ref name, .. } if name == "Taxonomy"));
    }

    #[test]
    fn duplicate_otu_is_an_error() {
        let path = write_temp(
            "dup.csv",
            "OTU,Taxonomy\nOtu001,Bacteria;\nOtu001,Archaea;\n",
        );
        let err = TaxonomyTable::from_path(&path).unwrap_err();
        fs::remove_file(&path).ok();

        assert!(matches!(
            err,
            AbundanceError::DuplicateOtu { first: 0, second: 1, .. }
        ));
    }
}
