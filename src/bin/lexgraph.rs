//! lexgraph CLI: recognize, build, discover and enrich.
//!
//! Usage:
//!   lexgraph extract (--text T | --input FILE | --batch DIR) [--output FILE]
//!   lexgraph build [--stats]
//!   lexgraph validate | stats | refresh-stats
//!   lexgraph discover [--sample N] [--apply | --dry-run]
//!   lexgraph enrich (--entities FILE | --chunks DIR) [--dry-run]

use clap::{Args, Parser, Subcommand};
use lexgraph::graph::{validate_document, GraphStats};
use lexgraph::storage::write_json_atomic;
use lexgraph::{
    ApplyMode, EntityRecognizer, GraphBuilder, GraphEnricher, GraphStore, JsonGraphStore, LexConfig,
    RelationshipDiscoverer,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "lexgraph",
    version,
    about = "Knowledge graph of Brazilian legal entities"
)]
struct Cli {
    /// YAML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Graph document to operate on
    #[arg(long, global = true)]
    graph: Option<PathBuf>,
    /// Knowledge-base directory with the curated sources
    #[arg(long, global = true)]
    kb: Option<PathBuf>,
    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recognize legal references in text
    Extract {
        #[command(flatten)]
        source: ExtractSource,
        /// Write JSON here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Build the base graph from the knowledge base
    Build {
        /// Print statistics without writing the graph
        #[arg(long)]
        stats: bool,
    },
    /// Check the graph document for consistency problems
    Validate,
    /// Print node and edge counts by type
    Stats,
    /// Recompute stored statistics after an outside edit
    RefreshStats,
    /// Infer relationships and save a discovery report
    Discover {
        /// Number of discoveries to print
        #[arg(long, default_value_t = 5)]
        sample: usize,
        /// Add the discoveries to the graph
        #[arg(long, conflicts_with = "dry_run")]
        apply: bool,
        /// Show what applying would add
        #[arg(long)]
        dry_run: bool,
    },
    /// Merge recognized entities into the graph
    Enrich {
        #[command(flatten)]
        source: EnrichSource,
        /// Preview without writing or backing up
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct ExtractSource {
    /// Inline text
    #[arg(long)]
    text: Option<String>,
    /// Plain-text file
    #[arg(long)]
    input: Option<PathBuf>,
    /// Directory of JSON chunk files
    #[arg(long)]
    batch: Option<PathBuf>,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct EnrichSource {
    /// Entities file written by `extract --batch`
    #[arg(long)]
    entities: Option<PathBuf>,
    /// Directory of JSON chunk files, recognized first
    #[arg(long)]
    chunks: Option<PathBuf>,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<LexConfig, String> {
    let mut config = LexConfig::discover(cli.config.as_deref()).map_err(|e| format!("Failed to load config: {}", e))?;
    if let Some(graph) = &cli.graph {
        config.graph_path = graph.clone();
    }
    if let Some(kb) = &cli.kb {
        config.knowledge_base_dir = kb.clone();
    }
    Ok(config)
}

fn emit_json<T: Serialize>(value: &T, output: Option<&Path>) -> i32 {
    match output {
        Some(path) => match write_json_atomic(path, value) {
            Ok(()) => {
                println!("Wrote {}", path.display());
                0
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        },
        None => match serde_json::to_string_pretty(value) {
            Ok(text) => {
                println!("{}", text);
                0
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        },
    }
}

fn print_stats(stats: &GraphStats) {
    println!("Nodes: {}", stats.total_nodes);
    for (node_type, count) in &stats.nodes_by_type {
        println!("  {:<12} {:>6}", node_type, count);
    }
    println!("Edges: {}", stats.total_edges);
    for (edge_type, count) in &stats.edges_by_type {
        println!("  {:<12} {:>6}", edge_type, count);
    }
}

fn cmd_extract(config: &LexConfig, source: &ExtractSource, output: Option<&Path>) -> i32 {
    let recognizer = EntityRecognizer::new(config);
    if let Some(text) = &source.text {
        return emit_json(&recognizer.extract(text), output);
    }
    if let Some(input) = &source.input {
        return match recognizer.extract_file(input) {
            Ok(extraction) => emit_json(&extraction, output),
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        };
    }
    if let Some(dir) = &source.batch {
        return match recognizer.extract_chunk_dir(dir) {
            Ok(chunks) => emit_json(&chunks, output),
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        };
    }
    eprintln!("Error: one of --text, --input or --batch is required");
    2
}

fn cmd_build(config: &LexConfig, store: &JsonGraphStore, stats_only: bool) -> i32 {
    let builder = GraphBuilder::new(config);
    if stats_only {
        let output = builder.build();
        print_stats(&output.graph.metadata.stats);
        return 0;
    }
    match builder.build_and_save(store) {
        Ok((output, backup)) => {
            if let Some(backup) = backup {
                println!("Previous graph backed up to {}", backup.display());
            }
            println!(
                "Built {} nodes and {} edges into {}",
                output.graph.node_count(),
                output.graph.edge_count(),
                store.path().display()
            );
            for finding in &output.findings {
                println!("  finding: {}", finding);
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_validate(store: &JsonGraphStore) -> i32 {
    let graph = match store.load() {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let findings = validate_document(&graph);
    if findings.is_empty() {
        println!(
            "Graph is valid ({} nodes, {} edges)",
            graph.node_count(),
            graph.edge_count()
        );
        return 0;
    }
    for finding in &findings {
        println!("{}", finding);
    }
    println!("{} finding(s)", findings.len());
    1
}

fn cmd_stats(store: &JsonGraphStore) -> i32 {
    match store.load() {
        Ok(graph) => {
            print_stats(&graph.compute_stats());
            if !graph.stats_are_current() {
                println!("Stored statistics are stale; run refresh-stats");
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_refresh_stats(store: &JsonGraphStore) -> i32 {
    let mut graph = match store.load() {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    if graph.stats_are_current() {
        println!("Statistics already current");
        return 0;
    }
    let result = store.backup().and_then(|_| {
        graph.recompute_stats();
        graph.touch();
        store.save(&graph)
    });
    match result {
        Ok(()) => {
            print_stats(&graph.metadata.stats);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_discover(config: &LexConfig, store: &JsonGraphStore, sample: usize, apply: bool, dry_run: bool) -> i32 {
    let mode = if apply {
        ApplyMode::Apply
    } else if dry_run {
        ApplyMode::DryRun
    } else {
        ApplyMode::ReportOnly
    };
    let outcome = match RelationshipDiscoverer::new(config).run(store, mode) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let report = &outcome.report;
    println!("Discovered {} relationships", report.total_relationships);
    for (edge_type, count) in &report.by_type {
        println!("  {:<12} {:>6}", edge_type, count);
    }
    println!("By method:");
    for (method, count) in &report.by_discovery_method {
        println!("  {:<22} {:>6}", method, count);
    }
    for edge in report.relationships.iter().take(sample) {
        println!("  {} --[{}]--> {}", edge.source, edge.edge_type, edge.target);
    }
    println!("Report saved to {}", config.discoveries_path.display());

    if let Some(preview) = &outcome.preview {
        println!("[DRY RUN] Would add {} relationships", preview.relationships_to_add);
        for (edge_type, count) in &preview.by_type {
            println!("  {:<12} {:>6}", edge_type, count);
        }
    }
    if let Some(summary) = &outcome.applied {
        println!(
            "Applied: {} added, {} already present, {} rejected",
            summary.edges_added, summary.edges_duplicate, summary.edges_rejected
        );
    }
    0
}

fn cmd_enrich(config: &LexConfig, store: &JsonGraphStore, source: &EnrichSource, dry_run: bool) -> i32 {
    let enricher = GraphEnricher::new(config);
    let chunks = match (&source.entities, &source.chunks) {
        (Some(path), _) => GraphEnricher::load_entities_file(path),
        (None, Some(dir)) => enricher.extract_chunks(dir),
        (None, None) => {
            eprintln!("Error: one of --entities or --chunks is required");
            return 2;
        }
    };
    let chunks = match chunks {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let report = match enricher.run(store, &chunks, dry_run) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    for (key, value) in report.stats.to_map() {
        println!("  {:<18} {:>6}", key, value);
    }
    if report.dry_run {
        println!("[DRY RUN] Changes that would be made:");
        println!("  New nodes: {}", report.new_nodes);
        println!("  New edges: {}", report.new_edges);
        for node in &report.preview_nodes {
            println!("    - {} ({})", node.id, node.node_type);
        }
        for edge in &report.preview_edges {
            println!("    - {} --[{}]--> {}", edge.source, edge.edge_type, edge.target);
        }
    } else {
        println!(
            "Enriched {}: {} nodes, {} edges added",
            store.path().display(),
            report.new_nodes,
            report.new_edges
        );
    }
    0
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match load_config(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    let store = JsonGraphStore::from_config(&config);

    let code = match &cli.command {
        Commands::Extract { source, output } => cmd_extract(&config, source, output.as_deref()),
        Commands::Build { stats } => cmd_build(&config, &store, *stats),
        Commands::Validate => cmd_validate(&store),
        Commands::Stats => cmd_stats(&store),
        Commands::RefreshStats => cmd_refresh_stats(&store),
        Commands::Discover { sample, apply, dry_run } => cmd_discover(&config, &store, *sample, *apply, *dry_run),
        Commands::Enrich { source, dry_run } => cmd_enrich(&config, &store, source, *dry_run),
    };
    std::process::exit(code);
}
