// src/config.rs

use std::ops::Range;

use crate::error::{AbundanceError, Result};

/// One functional group: an output name plus the case-sensitive substring
/// matched against the Taxonomy column.
#[derive(Debug, Clone)]
pub struct GroupPattern {
    pub name: String,
    pub pattern: String,
}

impl GroupPattern {
    pub fn new(name: &str, pattern: &str) -> Self {
        Self {
            name: name.to_string(),
            pattern: pattern.to_string(),
        }
    }
}

/// Pipeline configuration.
///
/// Everything that was a magic constant in the original workflow lives here:
/// the group patterns, the row-count bound on projections, the fixed byte
/// spans that carve Location and Depth out of a sample label, and the OTU
/// identifier prefix. Validated once, before any file is touched.
#[derive(Debug, Clone)]
pub struct Config {
    /// Functional groups, in legend order.
    pub groups: Vec<GroupPattern>,
    /// Literal prefix of OTU identifiers, e.g. `Otu` in `Otu0042`.
    pub otu_prefix: String,
    /// Maximum number of sample rows carried into each projection.
    pub max_rows: usize,
    /// Byte span of the location code within a sample label.
    pub location_span: Range<usize>,
    /// Byte span of the depth code within a sample label.
    pub depth_span: Range<usize>,
    /// Permit positional column selection when the taxonomy rows and the
    /// abundance header disagree. Logged as a warning when taken.
    pub allow_positional_fallback: bool,
}

impl Default for Config {
    /// The six Second Creek functional groups and the original bounds.
    fn default() -> Self {
        Self {
            groups: vec![
                GroupPattern::new("geobacter", "Geobacter"),
                GroupPattern::new("shewan", "Shewan"),
                GroupPattern::new("desulfo", "Desulfo"),
                GroupPattern::new("methano", "Methano"),
                GroupPattern::new("methylo", "Methylo"),
                GroupPattern::new("verruc", "Verrucomicrobiae"),
            ],
            otu_prefix: "Otu".to_string(),
            max_rows: 45,
            location_span: 3..5,
            depth_span: 5..7,
            allow_positional_fallback: true,
        }
    }
}

impl Config {
    /// Minimum label length implied by the two spans.
    pub fn required_label_len(&self) -> usize {
        self.location_span.end.max(self.depth_span.end)
    }

    pub fn validate(&self) -> Result<()> {
        if self.groups.is_empty() {
            return Err(AbundanceError::Config(
                "at least one functional group is required".into(),
            ));
        }
        for g in &self.groups {
            if g.name.is_empty() {
                return Err(AbundanceError::Config("group name must not be empty".into()));
            }
            if g.pattern.is_empty() {
                return Err(AbundanceError::Config(format!(
                    "group `{}` has an empty taxonomy pattern",
                    g.name
                )));
            }
        }
        for (i, a) in self.groups.iter().enumerate() {
            for b in &self.groups[i + 1..] {
                if a.name == b.name {
                    return Err(AbundanceError::Config(format!(
                        "duplicate group name `{}`",
                        a.name
                    )));
                }
            }
        }
        if self.otu_prefix.is_empty() {
            return Err(AbundanceError::Config("OTU prefix must not be empty".into()));
        }
        if self.max_rows == 0 {
            return Err(AbundanceError::Config("max_rows must be positive".into()));
        }
        if self.location_span.start >= self.location_span.end {
            return Err(AbundanceError::Config(format!(
                "location span {}..{} is empty or reversed",
                self.location_span.start, self.location_span.end
            )));
        }
        if self.depth_span.start >= self.depth_span.end {
            return Err(AbundanceError::Config(format!(
                "depth span {}..{} is empty or reversed",
                self.depth_span.start, self.depth_span.end
            )));
        }
        if self.location_span.start < self.depth_span.end
            && self.depth_span.start < self.location_span.end
        {
            return Err(AbundanceError::Config(format!(
                "location span {}..{} overlaps depth span {}..{}",
                self.location_span.start,
                self.location_span.end,
                self.depth_span.start,
                self.depth_span.end
            )));
        }
        Ok(())
    }
}
