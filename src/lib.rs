// src/lib.rs
pub mod composer;
pub mod config;
pub mod error;
pub mod projection;
pub mod resolver;
pub mod shared;
pub mod table;
pub mod taxonomy;
pub mod types;

use std::path::Path;

use crate::composer::{compose_series, locate_rows, LocatedProjection};
use crate::config::Config;
use crate::error::Result;
use crate::projection::{check_alignment, project_groups, GroupProjection};
use crate::resolver::resolve_group;
use crate::shared::SharedTable;
use crate::taxonomy::TaxonomyTable;
use crate::types::CompositionSeries;

/// Everything one pipeline run produces.
///
/// Each stage's output is a durable, inspectable table: the per-group
/// projections, the location/depth-augmented tables, and the composition
/// series for the selected location. CSV text is generated on demand.
#[derive(Debug)]
pub struct AbundanceResults {
    /// One projection of the abundance matrix per functional group.
    pub projections: Vec<GroupProjection>,

    /// The same tables with sample labels resolved to (location, depth).
    pub located: Vec<LocatedProjection>,

    /// Per-depth fractional composition at the selected location,
    /// ready for a stacked-bar renderer.
    pub composition: CompositionSeries,
}

impl AbundanceResults {
    /// CSV text of one group's projection table, if the group exists.
    pub fn get_projection_csv(&self, group: &str) -> Option<String> {
        self.projections
            .iter()
            .find(|p| p.group == group)
            .map(|p| p.to_csv())
    }

    /// CSV text of one group's location/depth table, if the group exists.
    pub fn get_located_csv(&self, group: &str) -> Option<String> {
        self.located
            .iter()
            .find(|t| t.group == group)
            .map(|t| t.to_csv())
    }

    /// CSV text of the composition series.
    pub fn get_composition_csv(&self) -> String {
        self.composition.to_csv()
    }
}

/// Runs the whole filter-join-aggregate pipeline against a taxonomy table
/// and a shared (sample-by-OTU) abundance table for one location code.
pub fn run_relative_abundance(
    taxonomy_path: &Path,
    shared_path: &Path,
    location: &str,
    config: &Config,
) -> Result<AbundanceResults> {
    // 1. Validate configuration before touching any file
    config.validate()?;

    // 2. Load the two input tables; OTU columns beyond taxonomy coverage
    //    carry no group information and are trimmed
    let taxonomy = TaxonomyTable::from_path(taxonomy_path)?;
    let mut shared = SharedTable::from_path(shared_path)?;
    shared.truncate_columns(taxonomy.len());

    // 3. Partition OTU identifiers by functional group
    let groups = config
        .groups
        .iter()
        .map(|pattern| resolve_group(&taxonomy, pattern, &config.otu_prefix))
        .collect::<Result<Vec<_>>>()?;

    // 4. Pick the join mode: keyed, or positional fallback with a warning
    let mode = check_alignment(&taxonomy, &shared, config.allow_positional_fallback)?;

    // 5. Project the matrix onto each group's OTU subset
    let projections = project_groups(&shared, &groups, mode, &config.otu_prefix, config.max_rows)?;

    // 6. Resolve sample labels into (location, depth) keys
    let located = projections
        .iter()
        .map(|projection| locate_rows(projection, config))
        .collect::<Result<Vec<_>>>()?;

    // 7. Aggregate into the per-depth composition series
    let composition = compose_series(&located, location)?;

    log::info!(
        "composed {} depth record(s) for location `{}` across {} group(s)",
        composition.records.len(),
        location,
        composition.groups.len()
    );

    Ok(AbundanceResults {
        projections,
        located,
        composition,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let path =
            std::env::temp_dir().join(format!("relabund_lib_{}_{}", std::process::id(), name));
        fs::write(&path, contents).unwrap();
        path
    }

    const TAXONOMY: &str = "OTU\tSize\tTaxonomy\n\
                            Otu1\t10\tBacteria;Geobacter sp.;\n\
                            Otu2\t25\tBacteria;Shewanella sp.;\n";

    const SHARED: &str = "label\tGroup\tnumOtus\tOtu1\tOtu2\n\
                          0.03\tAAAC301\t2\t10\t5\n\
                          0.03\tAAAC302\t2\t0\t20\n";

    #[test]
    fn end_to_end_two_group_scenario() {
        let tax_path = write_temp("e2e.taxonomy", TAXONOMY);
        let shared_path = write_temp("e2e.shared", SHARED);

        let config = Config::default();
        let results =
            run_relative_abundance(&tax_path, &shared_path, "C3", &config).unwrap();
        fs::remove_file(&tax_path).ok();
        fs::remove_file(&shared_path).ok();

        let series = &results.composition;
        assert_eq!(series.location, "C3");
        assert_eq!(series.groups.len(), 6);
        assert_eq!(series.records.len(), 2);

        // depth codes from the fixed-offset slices of AAAC301 / AAAC302
        assert_eq!(series.records[0].depth, "01");
        assert_eq!(series.records[1].depth, "02");

        // geobacter fractions: 10/15 then 0/20
        let r0 = &series.records[0];
        assert_eq!(r0.group_sums[0], 10);
        assert_eq!(r0.total, 15);
        assert!((r0.fractions[0] - 10.0 / 15.0).abs() < 1e-9);
        assert!((r0.fractions.iter().sum::<f64>() - 1.0).abs() < 1e-9);

        let r1 = &series.records[1];
        assert_eq!(r1.fractions[0], 0.0);
        assert!((r1.fractions[1] - 1.0).abs() < 1e-9);

        // the four unmatched groups contribute exactly zero everywhere
        for record in &series.records {
            for g in 2..6 {
                assert_eq!(record.group_sums[g], 0);
                assert_eq!(record.fractions[g], 0.0);
            }
        }
    }

    #[test]
    fn every_stage_emits_a_csv_artifact() {
        let tax_path = write_temp("art.taxonomy", TAXONOMY);
        let shared_path = write_temp("art.shared", SHARED);

        let results =
            run_relative_abundance(&tax_path, &shared_path, "C3", &Config::default()).unwrap();
        fs::remove_file(&tax_path).ok();
        fs::remove_file(&shared_path).ok();

        let projection = results.get_projection_csv("geobacter").unwrap();
        assert!(projection.starts_with("Group,Otu1\n"));
        assert!(projection.contains("AAAC301,10"));

        let located = results.get_located_csv("shewan").unwrap();
        assert!(located.starts_with("Location,Depth (cm),Otu2\n"));
        assert!(located.contains("C3,02,20"));

        // empty group: header with zero abundance columns, rows intact
        let empty = results.get_projection_csv("verruc").unwrap();
        assert!(empty.starts_with("Group\n"));
        assert!(empty.contains("AAAC302\n"));

        assert!(results.get_projection_csv("nosuch").is_none());

        let composition = results.get_composition_csv();
        assert!(composition.contains("C3,01,10,5,0,0,0,0,15,0.666667"));
    }

    #[test]
    fn selecting_an_absent_location_yields_an_empty_series() {
        let tax_path = write_temp("empty.taxonomy", TAXONOMY);
        let shared_path = write_temp("empty.shared", SHARED);

        let results =
            run_relative_abundance(&tax_path, &shared_path, "W9", &Config::default()).unwrap();
        fs::remove_file(&tax_path).ok();
        fs::remove_file(&shared_path).ok();

        assert!(results.composition.records.is_empty());
    }

    #[test]
    fn invalid_config_fails_before_io() {
        let config = Config {
            max_rows: 0,
            ..Config::default()
        };
        let err = run_relative_abundance(
            Path::new("does-not-exist.taxonomy"),
            Path::new("does-not-exist.shared"),
            "C3",
            &config,
        )
        .unwrap_err();
        assert!(matches!(err, crate::error::AbundanceError::Config(_)));
    }

    #[test]
    fn short_sample_label_fails_with_row_identified() {
        let tax_path = write_temp("short.taxonomy", TAXONOMY);
        let shared_path = write_temp(
            "short.shared",
            "label\tGroup\tnumOtus\tOtu1\tOtu2\n0.03\tC305\t2\t1\t2\n",
        );

        let err = run_relative_abundance(&tax_path, &shared_path, "C3", &Config::default())
            .unwrap_err();
        fs::remove_file(&tax_path).ok();
        fs::remove_file(&shared_path).ok();

        assert!(matches!(
            err,
            crate::error::AbundanceError::LabelFormat { row: 0, need: 7, .. }
        ));
    }
}
