//! PharmaGuard CLI: scripted access to the analysis backend.
//!
//! Commands:
//! - `analyze`: validate a VCF, submit it with target drugs, print the report
//! - `health`: query the backend health endpoint
//! - `highlight`: dump the syntax tokens of a JSON file, one per line
//! - `drugs`: list the drug catalogue with primary genes

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use pharmaguard_core::drugs::primary_gene;
use pharmaguard_core::{
    highlight, logging, report, AnalysisBackend, ClientConfig, DrugSelection, FailurePolicy,
    HttpBackend, Outcome, Submission, VcfUpload, SUPPORTED_DRUGS,
};

#[derive(Parser)]
#[command(
    name = "pharmaguard",
    about = "PharmaGuard CLI: pharmacogenomic risk reports from VCF files"
)]
struct Cli {
    /// Config file. Defaults to {config_dir}/pharmaguard/config.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL, overriding config and PHARMAGUARD_API_URL.
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a VCF for analysis against one or more drugs.
    Analyze {
        /// VCF file (.vcf, at most 5 MB).
        file: PathBuf,

        /// Target drug; repeat for several (e.g., --drug WARFARIN --drug CODEINE).
        #[arg(long = "drug", required = true)]
        drugs: Vec<String>,

        /// Print the exported JSON instead of the text report.
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Also write each result as pharmaguard_{patient}_{drug}.json here.
        #[arg(long)]
        export_dir: Option<PathBuf>,

        /// On backend failure, print labelled synthetic placeholders instead of failing.
        #[arg(long, default_value_t = false)]
        synthetic_fallback: bool,
    },
    /// Query the backend health endpoint.
    Health,
    /// Print the highlighter's token stream for a JSON file (kind<TAB>text).
    Highlight {
        /// JSON file; it is pretty-printed before tokenizing.
        file: PathBuf,
    },
    /// List the drug catalogue with primary genes.
    Drugs,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ClientConfig::load(cli.config.as_deref()).context("loading client config")?;
    if let Some(url) = cli.api_url {
        config.api_url = url;
        config.validate()?;
    }
    if let Err(e) = logging::init_stderr(&config.log_filter) {
        eprintln!("warning: logging disabled: {e}");
    }

    match cli.command {
        Commands::Analyze {
            file,
            drugs,
            json,
            export_dir,
            synthetic_fallback,
        } => {
            if synthetic_fallback {
                config.on_failure = FailurePolicy::Synthesize;
            }
            let backend = HttpBackend::new(&config).context("building HTTP client")?;
            run_analyze(&backend, &config, &file, &drugs, json, export_dir.as_deref())
        }
        Commands::Health => {
            let backend = HttpBackend::new(&config).context("building HTTP client")?;
            run_health(&backend)
        }
        Commands::Highlight { file } => run_highlight(&file),
        Commands::Drugs => {
            run_drugs();
            Ok(())
        }
    }
}

fn run_analyze(
    backend: &dyn AnalysisBackend,
    config: &ClientConfig,
    file: &Path,
    drugs: &[String],
    json: bool,
    export_dir: Option<&Path>,
) -> Result<()> {
    let selection = DrugSelection::from_names(drugs);
    let submission = match VcfUpload::from_path(file, config.max_upload_bytes)
        .and_then(|upload| Submission::prepare(Some(&upload), &selection, false))
    {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    tracing::debug!(file = %file.display(), drugs = ?submission.drugs(), "prepared submission");
    println!(
        "Submitting {} ({} KB) for {} to {}",
        submission.upload().name(),
        submission.upload().size_kib(),
        submission.drugs().join(", "),
        backend.describe(),
    );

    let outcome = submission.run(backend, config.on_failure);
    if let Outcome::Substituted { cause, .. } = &outcome {
        eprintln!("Warning: {}; showing synthetic placeholders", cause.user_message());
    }
    if let Some(message) = outcome.error_indicator() {
        eprintln!("Error: {message}");
        std::process::exit(1);
    }

    let results = outcome.results();
    for (i, analysis) in results.iter().enumerate() {
        if i > 0 {
            println!();
        }
        if json {
            println!("{}", report::export_json(analysis));
        } else {
            let requested = report::requested_drug(submission.drugs(), i, results.len());
            print!("{}", report::to_text(analysis, requested));
        }

        if let Some(dir) = export_dir {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating {}", dir.display()))?;
            let path = dir.join(report::export_file_name(analysis));
            std::fs::write(&path, report::export_json(analysis))
                .with_context(|| format!("writing {}", path.display()))?;
            eprintln!("Saved {}", path.display());
        }
    }

    Ok(())
}

fn run_health(backend: &dyn AnalysisBackend) -> Result<()> {
    match backend.health() {
        Ok(status) => {
            println!("{}: {}", backend.describe(), status.summary());
            println!("{}", highlight::pretty(&status.raw));
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {} ({e})", e.user_message());
            std::process::exit(1);
        }
    }
}

fn run_highlight(file: &Path) -> Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("reading {}", file.display()))?;
    let value: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("parsing {} as JSON", file.display()))?;
    let pretty = highlight::pretty(&value);

    for token in highlight::tokenize(&pretty) {
        println!("{:?}\t{}", token.kind, token.text.escape_debug());
    }
    Ok(())
}

fn run_drugs() {
    println!("{:<14} GENE", "DRUG");
    for drug in SUPPORTED_DRUGS {
        println!("{:<14} {}", drug, primary_gene(drug).unwrap_or("-"));
    }
    println!();
    println!("Any other drug name is accepted and sent as-is.");
}
