// src/types.rs

/// One row of the abundance matrix: a sample label and its per-OTU counts.
/// The counts are positionally aligned with the owning table's OTU column ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleRow {
    pub label: String,
    pub counts: Vec<u64>,
}

/// Location and depth carved out of a composite sample label,
/// e.g. `2ndC305` -> location `C3`, depth `05`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleKey {
    pub location: String,
    pub depth: String,
}

/// Per-sample composition: one raw sum per functional group, the total across
/// groups, and each group's fraction of that total.
///
/// Fractions for a sample whose total is zero are defined as 0.0, so a dead
/// sample renders as an empty bar instead of propagating NaN.
#[derive(Debug, Clone)]
pub struct CompositionRecord {
    pub depth: String,
    pub group_sums: Vec<u64>,
    pub total: u64,
    pub fractions: Vec<f64>,
}

/// The ordered series of composition records for one location, ready to feed
/// a stacked-bar renderer: one x-axis category per record, one segment per
/// group, segments summing to 1.0 whenever the total is positive.
#[derive(Debug, Clone)]
pub struct CompositionSeries {
    pub location: String,
    /// Group names in legend order, aligned with `group_sums`/`fractions`.
    pub groups: Vec<String>,
    pub records: Vec<CompositionRecord>,
}
