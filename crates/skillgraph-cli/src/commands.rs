use std::path::Path;

use chrono::{DateTime, Utc};
use color_eyre::eyre::{bail, eyre, WrapErr};
use color_eyre::Result;
use serde_json::Value;
use skillgraph_core::advisor::connectable_targets;
use skillgraph_core::config::DEFAULT_CONFIG_FILE;
use skillgraph_core::curriculum::CurriculumDoc;
use skillgraph_core::rules::{self, ValidationReport};
use skillgraph_core::schema::{self, BasicValidation};
use skillgraph_core::{Config, EdgeType, FileKv, GraphWorkflow, KvGraphStore, PublishOptions};

pub type App = GraphWorkflow<KvGraphStore<FileKv>>;

/// Opens the file-backed workflow described by `config`.
pub fn open(config: &Config) -> App {
    let kv = FileKv::with_config(&config.store);
    tracing::debug!(path = %kv.base_path().display(), namespace = %config.store.namespace, "Opening store");
    GraphWorkflow::with_config(KvGraphStore::with_config(kv, &config.store), config)
}

fn read_json(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path).wrap_err_with(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).wrap_err_with(|| format!("{} is not valid JSON", path.display()))
}

fn print_report(report: &ValidationReport) {
    if report.issues.is_empty() {
        println!("No issues found.");
        return;
    }
    for issue in &report.issues {
        println!("  {}", issue);
    }
    println!(
        "{} error(s), {} warning(s)",
        report.errors().count(),
        report.warnings().count()
    );
}

pub fn validate(file: &Path, basic: bool, config: &Config) -> Result<()> {
    let document = read_json(file)?;

    let graph = match schema::validate_basic(&document) {
        BasicValidation::Ok(graph) => graph,
        BasicValidation::Invalid(issues) => {
            for located in &issues {
                match &located.node_id {
                    Some(id) => println!("  {} (node {})", located.issue, id),
                    None => println!("  {}", located.issue),
                }
            }
            bail!("{} schema issue(s) in {}", issues.len(), file.display());
        }
    };

    let issues = if basic {
        rules::validate_basic_with(&graph, &config.validation)
    } else {
        rules::validate_with(&graph, &config.validation)
    };
    let report = ValidationReport::new(issues);
    print_report(&report);
    if !report.is_valid() {
        bail!("{} failed rule validation", graph.graph_id);
    }
    Ok(())
}

pub fn import(app: &mut App, file: &Path, user: &str, now: DateTime<Utc>) -> Result<()> {
    let document = read_json(file)?;
    let draft = app.import_document(user, &document, now)?;
    println!(
        "Imported {} ({} nodes, {} edges) as draft for {}",
        draft.graph_id,
        draft.graph.nodes.len(),
        draft.graph.edges.len(),
        user
    );
    Ok(())
}

pub fn sync(app: &mut App, curriculum: &Path, user: &str, graph_id: Option<&str>, now: DateTime<Utc>) -> Result<()> {
    let doc = CurriculumDoc::from_file(curriculum)?;
    let outcome = app.sync_curriculum(user, graph_id, &doc, now)?;
    if outcome.changed {
        println!(
            "Synced curriculum into {} ({} nodes, {} edges)",
            outcome.draft.graph_id,
            outcome.draft.graph.nodes.len(),
            outcome.draft.graph.edges.len()
        );
    } else {
        println!("{} is up to date", outcome.draft.graph_id);
    }
    Ok(())
}

pub fn connect(
    app: &mut App,
    user: &str,
    graph: &str,
    edge_type: EdgeType,
    source: &str,
    target: &str,
    now: DateTime<Utc>,
) -> Result<()> {
    app.connect(user, graph, edge_type, source, target, now)?;
    println!("Added {}({} -> {})", edge_type, source, target);
    Ok(())
}

pub fn targets(app: &mut App, user: &str, graph: &str, edge_type: EdgeType, source: &str) -> Result<()> {
    let draft = app.draft(user, graph)?;
    if !draft.graph.has_node(source) {
        return Err(eyre!("node '{}' is not in {}", source, graph));
    }
    for target in connectable_targets(&draft.graph, source, edge_type) {
        match target.reason {
            None => println!("  + {} ({})", target.node.id, target.node.label),
            Some(reason) => println!("  - {} ({}): {}", target.node.id, target.node.label, reason),
        }
    }
    Ok(())
}

pub fn report(app: &mut App, user: &str, graph: &str, json: bool) -> Result<()> {
    let report = app.validation_report(user, graph)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

pub fn publish(
    app: &mut App,
    user: &str,
    graph: &str,
    note: Option<String>,
    activate: bool,
    now: DateTime<Utc>,
) -> Result<()> {
    let options = PublishOptions {
        note,
        set_active: activate,
    };
    match app.publish(user, graph, now, options)? {
        Some(snapshot) => {
            println!("Published {} as {}", snapshot.graph_id, snapshot.published_id);
            if activate {
                println!("  Now visible to students");
            }
            Ok(())
        }
        None => bail!("publishing {} failed; see the log for details", graph),
    }
}

pub fn show(app: &mut App) -> Result<()> {
    match app.student_graph() {
        Some(snapshot) => {
            println!(
                "{} ({}), published {}",
                snapshot.graph.title,
                snapshot.graph_id,
                snapshot.published_at.to_rfc3339()
            );
            if let Some(note) = &snapshot.note {
                println!("  Note: {}", note);
            }
            println!("{}", serde_json::to_string_pretty(&snapshot.graph)?);
        }
        None => println!("No published graph is active. Use 'skillgraph publish --activate' first."),
    }
    Ok(())
}

pub fn init_config(force: bool) -> Result<()> {
    let path = Path::new(DEFAULT_CONFIG_FILE);
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", DEFAULT_CONFIG_FILE);
    }
    std::fs::write(path, Config::default_config_string())
        .wrap_err_with(|| format!("writing {}", DEFAULT_CONFIG_FILE))?;
    println!("Wrote {}", DEFAULT_CONFIG_FILE);
    Ok(())
}
