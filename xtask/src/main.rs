use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hwatomics::catalog::{Manifest, CATALOG};
use hwatomics::{Capabilities, Feature};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::Command;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "hwatomics workspace automation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the operation catalog and its expansion
    Catalog {
        /// Emit the full manifest as JSON
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Write to a file instead of stdout
        #[arg(long)]
        out: Option<String>,
    },
    /// Report which optional processor features are present
    Caps {
        /// Emit JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Run the criterion benchmarks and summarize them
    Bench {
        /// Run quickly (lower sample size/time)
        #[arg(long, default_value_t = false)]
        quick: bool,

        /// Generate report only (skip running benchmarks)
        #[arg(long, default_value_t = false)]
        report_only: bool,
    },
}

const BENCHES: &[&str] = &["locked_ops_benchmark", "rtm_benchmark"];

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Catalog { json, out } => {
            let rendered = if json { render_json()? } else { render_table() };
            match out {
                Some(path) => {
                    fs::write(&path, rendered).with_context(|| format!("Failed to write {path}"))?;
                    println!("Catalog written to {path}");
                }
                None => print!("{rendered}"),
            }
        }
        Commands::Caps { json } => print_capabilities(json)?,
        Commands::Bench { quick, report_only } => {
            if !report_only {
                run_benchmarks(quick)?;
            }
            generate_report()?;
        }
    }

    Ok(())
}

fn render_json() -> Result<String> {
    let mut json = Manifest::build()
        .to_json_pretty()
        .context("Failed to serialize catalog manifest")?;
    json.push('\n');
    Ok(json)
}

fn render_table() -> String {
    let manifest = Manifest::build();
    let mut out = String::new();

    out.push_str("| Operation | Instruction | Operands | Results | Result | Widths | Variants |\n");
    out.push_str("|---|---|---|---|---|---|---|\n");
    for d in CATALOG {
        let widths: Vec<String> = d.widths.iter().map(|w| w.to_string()).collect();
        let variants = manifest
            .variants
            .iter()
            .filter(|v| v.operation == d.operation)
            .count();
        let prefix = if d.locked { "lock " } else { "" };
        out.push_str(&format!(
            "| {} | `{}{}` | {} | {} | {:?} | {} | {} |\n",
            d.name,
            prefix,
            d.mnemonic,
            d.operands,
            d.results,
            d.result,
            widths.join("/"),
            variants
        ));
    }
    out.push_str(&format!(
        "\n{} operations, {} primitives (native width {})\n",
        CATALOG.len(),
        manifest.variants.len(),
        manifest.native_width
    ));
    out
}

#[derive(Serialize)]
struct CapsReport {
    features: BTreeMap<&'static str, bool>,
}

fn print_capabilities(json: bool) -> Result<()> {
    let caps = Capabilities::get();
    let report = CapsReport {
        features: Feature::ALL.iter().map(|f| (f.name(), caps.has(*f))).collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for (name, present) in &report.features {
            println!("{name:<12} {}", if *present { "yes" } else { "no" });
        }
    }
    Ok(())
}

fn run_benchmarks(quick: bool) -> Result<()> {
    println!("Running benchmarks...");

    for bench in BENCHES {
        println!("\n>>> {bench}");
        let start = Instant::now();

        let mut cmd = Command::new("cargo");
        cmd.env("CARGO_INCREMENTAL", "0");
        cmd.args(["bench", "-p", "hwatomics", "--bench", bench]);

        // Args for the test runner (Criterion) go after --
        cmd.arg("--");
        if quick {
            cmd.args(["--measurement-time", "0.1", "--noplot", "--sample-size", "10"]);
        }

        let status = cmd
            .status()
            .with_context(|| format!("Failed to run bench {bench}"))?;

        if status.success() {
            println!("Finished {bench} in {:.2?}", start.elapsed());
        } else {
            eprintln!("Warning: benchmark {bench} failed");
        }
    }

    Ok(())
}

fn generate_report() -> Result<()> {
    println!("\n>>> Generating Report...");
    let criterion_dir = Path::new("target/criterion");
    if !criterion_dir.exists() {
        eprintln!("No criterion output found at {}", criterion_dir.display());
        return Ok(());
    }

    let mut results = BTreeMap::new();
    collect_results(criterion_dir, &mut results);

    let report_path = Path::new("benchmark_results/report.md");
    if let Some(parent) = report_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::File::create(report_path)
        .with_context(|| format!("Failed to create {}", report_path.display()))?;

    writeln!(file, "# Benchmark Report")?;
    writeln!(file)?;
    writeln!(file, "| Benchmark | Mean (ns) | Ops/s |")?;
    writeln!(file, "|---|---|---|")?;
    for (name, time_ns) in &results {
        let ops = 1e9 / time_ns;
        let ops_str = if ops > 1_000_000.0 {
            format!("{:.2}M", ops / 1_000_000.0)
        } else if ops > 1_000.0 {
            format!("{:.2}K", ops / 1_000.0)
        } else {
            format!("{ops:.0}")
        };
        writeln!(file, "| {name} | {time_ns:.2} | {ops_str} |")?;
    }

    println!("Report written to {}", report_path.display());
    Ok(())
}

// Layout: target/criterion/<group>/<function>/new/estimates.json
fn collect_results(dir: &Path, results: &mut BTreeMap<String, f64>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            if path.file_name().and_then(|s| s.to_str()) != Some("report") {
                collect_results(&path, results);
            }
            continue;
        }
        if path.file_name().and_then(|s| s.to_str()) != Some("estimates.json") {
            continue;
        }

        let Some(run_dir) = path.parent() else { continue };
        if run_dir.file_name().and_then(|s| s.to_str()) != Some("new") {
            continue;
        }
        let Some(function_dir) = run_dir.parent() else { continue };
        let Some(group_dir) = function_dir.parent() else { continue };
        let name = format!(
            "{}/{}",
            group_dir.file_name().and_then(|s| s.to_str()).unwrap_or("?"),
            function_dir.file_name().and_then(|s| s.to_str()).unwrap_or("?"),
        );

        let mean = fs::read_to_string(&path)
            .ok()
            .and_then(|content| serde_json::from_str::<serde_json::Value>(&content).ok())
            .and_then(|json| json.get("mean")?.get("point_estimate")?.as_f64());
        if let Some(time_ns) = mean.filter(|t| *t > 0.0) {
            results.insert(name, time_ns);
        }
    }
}
