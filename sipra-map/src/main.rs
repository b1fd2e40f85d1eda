//! Point d'entrée CLI pour sipra-map

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, EnvFilter};

/// Variables d'environnement : `.env` du répertoire courant, sinon celui du binaire
fn load_env() {
    if dotenvy::dotenv().is_ok() {
        return;
    }
    let beside_exe = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(".env")));
    if let Some(path) = beside_exe {
        dotenvy::from_path(path).ok();
    }
}

mod cli;

use cli::Commands;
use sipra_map::config::Config;

/// Filtrer, exporter et cartographier les projets d'assentamento
#[derive(Parser)]
#[command(name = "sipra-map")]
#[command(author, version)]
#[command(about = "Filtrer, exporter et cartographier les projets d'assentamento de la réforme agraire (SIPRA)")]
struct Cli {
    /// Augmenter la verbosité (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Preset embarqué (default) ou chemin d'un fichier JSON
    #[arg(long, global = true)]
    config: Option<String>,

    /// Fichier GeoJSON (défaut : env SIPRA_DATASET / pasbr_geo.geojson)
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> ExitCode {
    load_env();
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Some(load) = err.downcast_ref::<sipra::LoadError>() {
                error!(error = %load, "Dataset load failed");
                eprintln!("Falha ao carregar o GeoJSON. Verifique o arquivo de dados: {}", load);
                return ExitCode::from(2);
            }
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::resolve(cli.config.as_deref())?.apply_env();
    if let Some(dataset) = cli.dataset {
        config.dataset = dataset;
    }
    info!(dataset = %config.dataset.display(), "Configuration loaded");

    let report = match cli.command {
        Commands::Filter {
            filters,
            output,
            format,
            report,
        } => cli::cmd_filter(&config, &filters, output.as_deref(), format, report.as_deref())?,
        Commands::Options { uf, json } => {
            return cli::cmd_options(&config, uf.as_deref(), json);
        }
        Commands::Layers { output, layers } => cli::cmd_layers(&config, output.as_deref(), &layers)?,
        Commands::Map {
            filters,
            output,
            with_layers,
            layers,
        } => cli::cmd_map(&config, &filters, output.as_deref(), with_layers, &layers)?,
        Commands::ExportAll { output } => cli::cmd_export_all(&config, output.as_deref())?,
    };

    if cli.quiet {
        println!("{}", report.summary());
    } else {
        report.display();
    }

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::WARN
    } else {
        [Level::INFO, Level::DEBUG, Level::TRACE][usize::from(verbose.min(2))]
    };

    // RUST_LOG reste prioritaire pour les cibles qu'il nomme
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(true)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}
