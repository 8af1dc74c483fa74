use std::num::NonZeroUsize;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vocalscreen::cli::{AnalyzeArgs, Cli, Command, OutputFormat};
use vocalscreen::{
    analyze_files_with_workers, parallel, RiskAssessment, ScreeningConfig, SymphoniaDecoder,
    VoiceFeatures,
};

#[derive(Serialize)]
struct Report {
    path: PathBuf,
    features: VoiceFeatures,
    #[serde(skip_serializing_if = "Option::is_none")]
    risk: Option<RiskAssessment>,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Command::Analyze(args) => handle_analyze(&args),
        Command::Defaults => {
            let json = serde_json::to_string_pretty(&ScreeningConfig::default())
                .context("Failed to serialize default configuration")?;
            println!("{json}");
            Ok(())
        }
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn handle_analyze(args: &AnalyzeArgs) -> Result<()> {
    let config = ScreeningConfig::load(args.config.as_deref())
        .context("Failed to load screening configuration")?;
    let scorer = config.scorer();

    // One decoder for the whole run, shared by every worker.
    let decoder = SymphoniaDecoder::new();
    let workers = args
        .jobs
        .map_or_else(parallel::default_workers, NonZeroUsize::get);
    info!(inputs = args.inputs.len(), workers, "analyzing recordings");
    let results = analyze_files_with_workers(&decoder, &args.inputs, workers);

    let mut reports = Vec::with_capacity(results.len());
    let mut failures = 0usize;
    for (path, result) in results {
        match result {
            Ok(features) => {
                let risk = (!args.no_score).then(|| scorer.score(&features));
                reports.push(Report {
                    path,
                    features,
                    risk,
                });
            }
            Err(err) => {
                error!(path = %path.display(), error = %err, "analysis failed");
                eprintln!("{}: {:#}", path.display(), err);
                failures += 1;
            }
        }
    }

    match args.format {
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(&reports).context("Failed to serialize reports")?;
            println!("{json}");
        }
        OutputFormat::Text => {
            for report in &reports {
                print_report(report);
            }
        }
    }

    if failures > 0 {
        bail!(
            "{} of {} recordings could not be analyzed",
            failures,
            args.inputs.len()
        );
    }
    Ok(())
}

fn print_report(report: &Report) {
    let f = &report.features;
    println!("{}", report.path.display());
    println!("   Duration:        {:.3} s", f.duration);
    println!("   Pitch:           {:.2} Hz", f.pitch);
    println!("   Pitch variation: {:.2} Hz", f.pitch_variation);
    println!("   Jitter:          {:.3} %", f.jitter);
    println!("   Shimmer:         {:.3} %", f.shimmer);
    println!("   HNR:             {:.2} dB", f.hnr);
    println!("   Amplitude (RMS): {:.4}", f.amplitude);
    let formants: Vec<String> = f.formants.iter().map(|hz| format!("{hz:.1}")).collect();
    println!("   Formants:        {} Hz", formants.join(", "));
    if let Some(risk) = &report.risk {
        println!("   Risk score:      {:.3} ({:?})", risk.score, risk.level);
    }
}
