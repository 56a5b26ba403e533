use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::info;

use scouting_rankings::{csv_io, pipeline, report};

#[derive(Parser)]
#[command(name = "scouting-rankings")]
#[command(about = "Score match scouting records and rank teams", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score every CSV in the input folder and write the output tables
    Process {
        #[arg(long, env = "SCOUTING_INPUT_DIR", default_value = ".")]
        input: PathBuf,
        #[arg(long, env = "SCOUTING_OUTPUT_DIR", default_value = "reports")]
        output: PathBuf,
    },
    /// Print teams ranked by average total score
    Rank {
        #[arg(long, default_value = "reports/team_score_summary.csv")]
        summary: PathBuf,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Generate a markdown event report
    Report {
        #[arg(long, env = "SCOUTING_INPUT_DIR", default_value = ".")]
        input: PathBuf,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Process { input, output } => {
            let loaded = csv_io::load_dir(&input)?;
            let outcome = pipeline::process(loaded);
            let paths = csv_io::write_outputs(&output, &outcome)?;

            println!(
                "Accepted {} records, rejected {}.",
                outcome.scored.len(),
                outcome.rejections.len()
            );
            println!("Saved summary: {}", paths.summary.display());
            println!("Saved detailed records: {}", paths.scored.display());
            println!("Saved rejections: {}", paths.rejections.display());
        }
        Commands::Rank { summary, limit } => {
            let summaries = csv_io::read_summaries(&summary)
                .context("run `process` first to produce the summary table")?;
            let ranked = report::rank_teams(&summaries);

            if ranked.is_empty() {
                println!("No teams found in {}.", summary.display());
                return Ok(());
            }

            println!("Top teams by average total score:");
            for entry in ranked.iter().take(limit) {
                let team = &entry.summary;
                println!(
                    "{:>3}. team {} avg {:.2} (end {:.2}) across {} matches, hit rate auto {} tele {}",
                    entry.rank,
                    team.team_number,
                    team.total_score_avg,
                    team.end_score_avg,
                    team.matches_played,
                    report::format_hit_rate(team.auto_hit_rate),
                    report::format_hit_rate(team.tele_hit_rate)
                );
            }
        }
        Commands::Report { input, out } => {
            let loaded = csv_io::load_dir(&input)?;
            let outcome = pipeline::process(loaded);
            let label = input.display().to_string();
            let markdown = report::build_report(&label, chrono::Utc::now(), &outcome);
            std::fs::write(&out, markdown)
                .with_context(|| format!("writing report {}", out.display()))?;
            info!("report covers {} teams", outcome.summaries.len());
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
