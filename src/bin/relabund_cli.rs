use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use relabund_rs::config::Config;
use relabund_rs::run_relative_abundance;

fn spinner(color: &str, msg: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&[
                "⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏",
            ])
            .template(&format!("{{spinner:.{color}}} {{msg}}"))
            .expect("Invalid spinner template"),
    );
    bar.set_message(msg.to_string());
    bar
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 || args.len() > 5 {
        eprintln!(
            "usage: {} <taxonomy-file> <shared-file> <location> [out-dir]",
            args[0]
        );
        eprintln!("  e.g. {} final.taxonomy final.shared C3 .", args[0]);
        process::exit(2);
    }
    let taxonomy_path = PathBuf::from(&args[1]);
    let shared_path = PathBuf::from(&args[2]);
    let location = &args[3];
    let out_dir = args.get(4).map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));

    // 1. Run the pipeline
    let bar = spinner("green", "Computing relative abundance...");
    let results = match run_relative_abundance(
        &taxonomy_path,
        &shared_path,
        location,
        &Config::default(),
    ) {
        Ok(results) => results,
        Err(err) => {
            bar.finish_and_clear();
            eprintln!("error: {err}");
            process::exit(1);
        }
    };
    bar.finish_with_message(format!(
        "Composed {} depth record(s) for location {location}.",
        results.composition.records.len()
    ));

    // 2. Write each stage's table
    let bar = spinner("yellow", "Writing output tables...");
    if let Err(err) = write_artifacts(&results, location, &out_dir) {
        bar.finish_and_clear();
        eprintln!("error: {err}");
        process::exit(1);
    }
    bar.finish_with_message(format!(
        "Wrote {} table(s) to {}.",
        results.projections.len() * 2 + 1,
        out_dir.display()
    ));
}

fn write_artifacts(
    results: &relabund_rs::AbundanceResults,
    location: &str,
    out_dir: &Path,
) -> std::io::Result<()> {
    fs::create_dir_all(out_dir)?;
    for projection in &results.projections {
        fs::write(
            out_dir.join(format!("{}_loc.csv", projection.group)),
            projection.to_csv(),
        )?;
    }
    for located in &results.located {
        fs::write(
            out_dir.join(format!("{}_loc_depth.csv", located.group)),
            located.to_csv(),
        )?;
    }
    fs::write(
        out_dir.join(format!("{location}_composition.csv")),
        results.get_composition_csv(),
    )?;
    Ok(())
}
