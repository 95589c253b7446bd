//! Binario `etl`: ejecuta el pipeline y opera sobre snapshots y el DAG.
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use etl_core::dag::{dependencies_of, dependents_of, mermaid, DEFAULT_REPOSITORY_URL};
use etlflow::config::CONFIG;
use etlflow::{CommandRunner, FailurePolicy, LocalObjectStore, Pipeline, RunOptions, RunReport, Selection, StepOutcome};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Pipeline incremental de curación de datos.
#[derive(Parser, Debug)]
#[command(name = "etl", version, about, long_about = None)]
struct Cli {
    /// Raíz del proyecto (por defecto `ETL_BASE_DIR` o el directorio actual)
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// Más detalle en los logs (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ejecuta los steps sucios de la selección
    Run {
        /// Regex de steps a incluir (todos si se omite)
        includes: Vec<String>,
        /// Regex de steps a excluir
        #[arg(long)]
        exclude: Vec<String>,
        /// Incluye también los dependientes de la selección
        #[arg(long)]
        downstream: bool,
        /// Sólo informa qué se ejecutaría
        #[arg(long)]
        dry_run: bool,
        /// Ejecuta aunque no esté sucio
        #[arg(short, long)]
        force: bool,
        /// Un fallo no detiene los subgrafos no relacionados
        #[arg(long)]
        continue_on_failure: bool,
    },
    /// Operaciones sobre un snapshot
    Snapshot {
        #[command(subcommand)]
        action: SnapshotAction,
    },
    /// Consultas sobre el DAG
    Graph {
        #[command(subcommand)]
        query: GraphQuery,
    },
}

#[derive(Subcommand, Debug)]
enum SnapshotAction {
    /// Trae el archivo desde el content store
    Pull { uri: String },
    /// Descarga el archivo desde `source_data_url`
    Download { uri: String },
    /// Registra el archivo local en el store
    Add {
        uri: String,
        /// Sube también al remoto
        #[arg(long)]
        upload: bool,
    },
    /// Estado del ciclo de vida
    Status { uri: String },
}

#[derive(Subcommand, Debug)]
enum GraphQuery {
    /// Lista los steps declarados
    List,
    /// Dependencias transitivas de un step
    Deps { step: String },
    /// Dependientes transitivos de un step
    Dependents { step: String },
    /// Diagrama Mermaid de las dependencias de un step
    Mermaid {
        step: String,
        /// Raíz publicada del proyecto, para los links de cada nodo
        #[arg(long, default_value = DEFAULT_REPOSITORY_URL)]
        repository_url: String,
    },
}

fn init_tracing(filter: &str, verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::new(filter),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    // `init` instala también el puente que captura los registros de `log`
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&CONFIG.log_filter, cli.verbose);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: Cli) -> anyhow::Result<()> {
    let config = match cli.base_dir {
        Some(dir) => CONFIG.clone().with_base_dir(dir),
        None => CONFIG.clone(),
    };
    let paths = Rc::new(config.paths());
    let store = Rc::new(LocalObjectStore::open(config.store.clone()).context("opening content store")?);
    let runner = Rc::new(CommandRunner::new(config.runner.clone(), &config.base_dir));

    match cli.command {
        Command::Snapshot { action } => {
            let pipeline = Pipeline::new(paths, store, runner, Default::default());
            let r = snapshot_command(&pipeline, action);
            pipeline.close()?;
            r
        }
        Command::Run { includes,
                       exclude,
                       downstream,
                       dry_run,
                       force,
                       continue_on_failure, } => {
            let pipeline = Pipeline::load(paths, store, runner).context("loading dag")?;
            let selection = Selection { includes,
                                        excludes: exclude,
                                        downstream };
            let failure_policy = if continue_on_failure { FailurePolicy::ContinueUnrelated } else { FailurePolicy::Abort };
            let options = RunOptions { dry_run, force, failure_policy };
            let r = pipeline.run(&selection, options);
            pipeline.close()?;
            let report = r?;
            print_report(&report);
            if !report.is_success() {
                bail!("run finished with failed, blocked or unrunnable steps");
            }
            Ok(())
        }
        Command::Graph { query } => {
            let pipeline = Pipeline::load(paths, store, runner).context("loading dag")?;
            let r = graph_command(&pipeline, query);
            pipeline.close()?;
            r
        }
    }
}

fn snapshot_command(pipeline: &Pipeline, action: SnapshotAction) -> anyhow::Result<()> {
    match action {
        SnapshotAction::Pull { uri } => pipeline.snapshot(&uri)?.pull()?,
        SnapshotAction::Download { uri } => pipeline.snapshot(&uri)?.download_from_source()?,
        SnapshotAction::Add { uri, upload } => pipeline.snapshot(&uri)?.dvc_add(upload)?,
        SnapshotAction::Status { uri } => {
            let snap = pipeline.snapshot(&uri)?;
            println!("{uri}: {:?} (version {}, {})", snap.state()?, snap.metadata.version, snap.remote());
        }
    }
    Ok(())
}

fn graph_command(pipeline: &Pipeline, query: GraphQuery) -> anyhow::Result<()> {
    let steps: BTreeSet<String> = match query {
        GraphQuery::List => pipeline.dag().keys().cloned().collect(),
        GraphQuery::Deps { step } => dependencies_of(pipeline.dag(), &step),
        GraphQuery::Dependents { step } => dependents_of(pipeline.dag(), &step),
        GraphQuery::Mermaid { step, repository_url } => {
            print!("{}", mermaid(pipeline.dag(), &step, &repository_url)?);
            return Ok(());
        }
    };
    for s in steps {
        println!("{s}");
    }
    Ok(())
}

fn print_report(report: &RunReport) {
    for record in &report.records {
        let label = match &record.outcome {
            StepOutcome::Executed => "executed".to_string(),
            StepOutcome::Skipped => "skipped".to_string(),
            StepOutcome::WouldRun => "would run".to_string(),
            StepOutcome::Unrunnable => "no runnable implementation".to_string(),
            StepOutcome::Failed { error } => format!("failed: {error}"),
            StepOutcome::Blocked { by } => format!("blocked by {by}"),
        };
        println!("{:<60} {label}", record.step);
    }
    info!("{} executed, {} skipped", report.executed_count(), report.skipped_count());
}
