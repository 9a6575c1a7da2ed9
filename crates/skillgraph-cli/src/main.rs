use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::WrapErr;
use skillgraph_core::{Config, EdgeType, GraphStore};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;

#[derive(Parser)]
#[command(name = "skillgraph")]
#[command(about = "Validate, edit and publish skill-graph documents", long_about = None)]
struct Cli {
    /// Config file to use instead of the default search path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a document against the schema and the graph rules
    Validate {
        file: PathBuf,
        /// Skip cycle detection
        #[arg(long)]
        basic: bool,
    },
    /// Import a document as a draft
    Import {
        file: PathBuf,
        #[arg(long)]
        user: String,
    },
    /// Merge a curriculum (JSON or YAML) into a draft
    Sync {
        curriculum: PathBuf,
        #[arg(long)]
        user: String,
        /// Draft to merge into (default: the curriculum id)
        #[arg(long)]
        graph_id: Option<String>,
    },
    /// Add an edge to a draft
    Connect {
        #[arg(long)]
        user: String,
        #[arg(long)]
        graph: String,
        #[arg(long = "type", value_parser = parse_edge_type)]
        edge_type: EdgeType,
        source: String,
        target: String,
    },
    /// List which nodes an edge from SOURCE may point at
    Targets {
        #[arg(long)]
        user: String,
        #[arg(long)]
        graph: String,
        #[arg(long = "type", value_parser = parse_edge_type)]
        edge_type: EdgeType,
        source: String,
    },
    /// Print the rule validation report of a draft
    Report {
        #[arg(long)]
        user: String,
        #[arg(long)]
        graph: String,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Publish a draft as a new snapshot
    Publish {
        #[arg(long)]
        user: String,
        #[arg(long)]
        graph: String,
        #[arg(long)]
        note: Option<String>,
        /// Make this graph the one students see
        #[arg(long)]
        activate: bool,
    },
    /// Set the graph students see
    Activate { graph_id: String },
    /// Print the graph students currently see
    Show,
    /// Delete a draft
    ClearDraft {
        #[arg(long)]
        user: String,
        #[arg(long)]
        graph: String,
    },
    /// Write a default skillgraph.toml to the current directory
    InitConfig {
        #[arg(long)]
        force: bool,
    },
}

fn parse_edge_type(s: &str) -> Result<EdgeType, String> {
    EdgeType::parse(s).ok_or_else(|| {
        let known: Vec<&str> = EdgeType::ALL.iter().map(EdgeType::as_str).collect();
        format!("unknown edge type '{}', expected one of {}", s, known.join(", "))
    })
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("SKILLGRAPH_LOG")
        .or_else(|_| tracing_subscriber::EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| "skillgraph=info,skillgraph_core=info".into());
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: Option<&PathBuf>) -> color_eyre::Result<Config> {
    match path {
        Some(path) => Config::from_file(path).wrap_err_with(|| format!("loading {}", path.display())),
        None => Config::load().wrap_err("loading configuration"),
    }
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    init_tracing();

    let cli = Cli::parse();
    let config = || load_config(cli.config.as_ref());
    let now = chrono::Utc::now();

    match cli.command {
        Commands::InitConfig { force } => commands::init_config(force),
        Commands::Validate { file, basic } => commands::validate(&file, basic, &config()?),
        Commands::Import { file, user } => commands::import(&mut commands::open(&config()?), &file, &user, now),
        Commands::Sync {
            curriculum,
            user,
            graph_id,
        } => commands::sync(&mut commands::open(&config()?), &curriculum, &user, graph_id.as_deref(), now),
        Commands::Connect {
            user,
            graph,
            edge_type,
            source,
            target,
        } => {
            let mut app = commands::open(&config()?);
            commands::connect(&mut app, &user, &graph, edge_type, &source, &target, now)
        }
        Commands::Targets {
            user,
            graph,
            edge_type,
            source,
        } => commands::targets(&mut commands::open(&config()?), &user, &graph, edge_type, &source),
        Commands::Report { user, graph, json } => commands::report(&mut commands::open(&config()?), &user, &graph, json),
        Commands::Publish {
            user,
            graph,
            note,
            activate,
        } => {
            let mut app = commands::open(&config()?);
            commands::publish(&mut app, &user, &graph, note, activate, now)
        }
        Commands::Activate { graph_id } => {
            commands::open(&config()?).activate(Some(&graph_id));
            println!("Active graph: {}", graph_id);
            Ok(())
        }
        Commands::Show => commands::show(&mut commands::open(&config()?)),
        Commands::ClearDraft { user, graph } => {
            commands::open(&config()?).store_mut().clear_draft(&user, &graph);
            println!("Cleared draft {} for {}", graph, user);
            Ok(())
        }
    }
}
