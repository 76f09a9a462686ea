use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};

use groupscholar_grading_engine::config::ConfigFile;
use groupscholar_grading_engine::{compute_all, report, roster, Department, EngineConfig};

#[derive(Parser)]
#[command(name = "grading-engine")]
#[command(about = "Class grading and statistics for Group Scholar schools", long_about = None)]
struct Cli {
    /// Log pipeline details
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade a roster and write the class report
    Compute {
        /// Roster file (.csv in long form, or .json)
        #[arg(long)]
        roster: PathBuf,
        /// Grading config (TOML); defaults for the department are used if omitted
        #[arg(long)]
        config: Option<PathBuf>,
        /// Department, used when no config file is given
        #[arg(long, value_enum, default_value = "junior-high")]
        department: Department,
        /// Class label for the report header
        #[arg(long)]
        class: Option<String>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
        /// Also write the full snapshot as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Check a grading config for errors
    Validate {
        #[arg(long)]
        config: PathBuf,
    },
    /// Write the default grading config for a department
    InitConfig {
        #[arg(long, value_enum, default_value = "junior-high")]
        department: Department,
        #[arg(long, default_value = "grading.toml")]
        out: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(
                format!("groupscholar_grading_engine={default_level}")
                    .parse()
                    .context("invalid log directive")?,
            ),
        )
        .init();

    match cli.command {
        Commands::Compute {
            roster: roster_path,
            config,
            department,
            class,
            out,
            json,
        } => {
            let config = match config {
                Some(path) => EngineConfig::load(&path)?,
                None => EngineConfig::default_for(department)?,
            };
            let students = roster::enrolled(roster::load_roster(&roster_path)?);
            if students.is_empty() {
                println!("No enrolled students in {}.", roster_path.display());
            }

            let output = compute_all(&students, &config);
            let report = report::build_report(
                class.as_deref(),
                Utc::now().date_naive(),
                &config,
                &output,
            );
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write report: {}", out.display()))?;
            println!("Report written to {}.", out.display());

            if let Some(path) = json {
                let snapshot = serde_json::to_string_pretty(&output)?;
                std::fs::write(&path, snapshot)
                    .with_context(|| format!("failed to write snapshot: {}", path.display()))?;
                println!("Snapshot written to {}.", path.display());
            }

            println!(
                "Graded {} students across {} subjects (class average aggregate {:.1}).",
                output.students.len(),
                config.subjects.len(),
                output.statistics.average_aggregate
            );
            for (category, count) in report::category_counts(&output) {
                println!("- {category}: {count}");
            }
        }
        Commands::Validate { config } => {
            let loaded = EngineConfig::load(&config)?;
            println!(
                "{} is valid: {} with {} active subjects.",
                config.display(),
                loaded.department,
                loaded.subjects.len()
            );
        }
        Commands::InitConfig { department, out } => {
            let file = ConfigFile::default_for(department);
            let content = toml::to_string_pretty(&file).context("failed to render config")?;
            std::fs::write(&out, content)
                .with_context(|| format!("failed to write config: {}", out.display()))?;
            println!("Default {department} config written to {}.", out.display());
        }
    }

    Ok(())
}
