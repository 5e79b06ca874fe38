// src/table.rs

use std::fs::File;
use std::io::Read;
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::error::Result;

/// Opens a tabular input file as a CSV reader.
///
/// mothur emits tab-separated tables; re-exported spreadsheets are often
/// comma-separated. The delimiter is picked from the file name (`.csv` means
/// comma, anything else means tab) and `.gz` files are decompressed on the
/// fly, the same way FASTQ input is handled elsewhere in this workflow.
pub fn open_table(path: &Path) -> Result<csv::Reader<Box<dyn Read>>> {
    let f = File::open(path)?;

    let is_gz = path
        .extension()
        .map(|ext| ext == "gz")
        .unwrap_or(false);

    let reader: Box<dyn Read> = if is_gz {
        Box::new(MultiGzDecoder::new(f))
    } else {
        Box::new(f)
    };

    Ok(csv::ReaderBuilder::new()
        .delimiter(table_delimiter(path))
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader))
}

/// Delimiter implied by the file name, looking through a trailing `.gz`.
pub fn table_delimiter(path: &Path) -> u8 {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let name = name.strip_suffix(".gz").unwrap_or(&name);
    if name.ends_with(".csv") {
        b','
    } else {
        b'\t'
    }
}

/// Header cell with a UTF-8 BOM and surrounding whitespace removed. Files
/// exported from spreadsheet tools routinely carry a BOM on the first cell.
pub fn clean_header(h: &str) -> &str {
    h.trim_start_matches('\u{feff}').trim()
}

/// Position of a named column in a header record, BOM- and space-insensitive.
pub fn find_column(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| clean_header(h) == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn delimiter_follows_extension() {
        assert_eq!(table_delimiter(&PathBuf::from("a.csv")), b',');
        assert_eq!(table_delimiter(&PathBuf::from("a.CSV")), b',');
        assert_eq!(table_delimiter(&PathBuf::from("a.csv.gz")), b',');
        assert_eq!(table_delimiter(&PathBuf::from("a.shared")), b'\t');
        assert_eq!(table_delimiter(&PathBuf::from("a.taxonomy.gz")), b'\t');
    }

    #[test]
    fn bom_is_stripped_from_headers() {
        assert_eq!(clean_header("\u{feff}OTU"), "OTU");
        assert_eq!(clean_header("  Taxonomy "), "Taxonomy");
        let rec = csv::StringRecord::from(vec!["\u{feff}OTU", "Size", "Taxonomy"]);
        assert_eq!(find_column(&rec, "OTU"), Some(0));
        assert_eq!(find_column(&rec, "Taxonomy"), Some(2));
        assert_eq!(find_column(&rec, "Group"), None);
    }
}
