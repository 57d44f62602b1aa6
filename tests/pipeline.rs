//! End-to-end runs over a temp project: build, discover, enrich, validate.

mod common;

use common::Fixture;
use lexgraph::graph::validate_document;
use lexgraph::ValidationFinding;
use lexgraph::storage::read_json;
use lexgraph::{
    ApplyMode, DiscoveryReport, EdgeType, GraphBuilder, GraphEnricher, GraphStore, JsonGraphStore, NodeId,
    RelationshipDiscoverer,
};
use serde_json::json;
use std::fs;

fn built(fixture: &Fixture) -> JsonGraphStore {
    let store = JsonGraphStore::from_config(&fixture.config);
    let (output, backup) = GraphBuilder::new(&fixture.config).build_and_save(&store).unwrap();
    assert!(output.findings.is_empty(), "{:?}", output.findings);
    assert!(backup.is_none());
    store
}

fn has_edge(store: &JsonGraphStore, source: &str, target: &str, edge_type: EdgeType) -> bool {
    store
        .load()
        .unwrap()
        .has_edge(&NodeId::from(source), &NodeId::from(target), &edge_type)
}

#[test]
fn build_writes_a_valid_graph() {
    let fixture = Fixture::new();
    let store = built(&fixture);
    let graph = store.load().unwrap();

    // 3 súmulas, 1 tema, 3 domains, 8 articles, 5 concepts
    assert_eq!(graph.node_count(), 20);
    assert!(validate_document(&graph).is_empty());
    assert!(has_edge(&store, "DOMINIO_direito_bancario", "STJ_297", EdgeType::Requires));
    assert!(has_edge(&store, "STJ_297", "STJ_381", EdgeType::RelatedTo));
    assert!(has_edge(&store, "TEMA_1368", "STJ_54", EdgeType::Modifies));
    assert!(has_edge(&store, "STJ_297", "ARTIGO_CDC_Art14", EdgeType::Cites));
    // curated edge whose source is absent from this knowledge base
    assert!(!graph.nodes.contains_key(&NodeId::from("STJ_469")));
}

#[test]
fn build_reports_missing_principal_references() {
    let fixture = Fixture::new();
    common::write_json(
        &fixture.config.domains_path(),
        &json!({"domains": {
            "direito_bancario": {"sumulas_principais": ["297", "999"], "temas_principais": ["1368", "7"]}
        }}),
    );
    let store = JsonGraphStore::from_config(&fixture.config);
    let (output, _) = GraphBuilder::new(&fixture.config).build_and_save(&store).unwrap();

    let mut missing: Vec<&str> = output
        .findings
        .iter()
        .filter_map(|f| match f {
            ValidationFinding::DanglingTarget { key } => Some(key.1.as_str()),
            _ => None,
        })
        .collect();
    missing.sort();
    assert_eq!(missing, vec!["STJ_999", "TEMA_7"]);

    let graph = store.load().unwrap();
    assert!(validate_document(&graph).is_empty());
    assert!(has_edge(&store, "DOMINIO_direito_bancario", "TEMA_1368", EdgeType::Requires));
}

#[test]
fn rebuild_backs_up_previous_document() {
    let fixture = Fixture::new();
    let store = built(&fixture);
    let (_, backup) = GraphBuilder::new(&fixture.config).build_and_save(&store).unwrap();
    let backup = backup.expect("backup of the first build");
    assert!(backup.starts_with(&fixture.config.backup_dir));
    assert!(backup.is_file());
}

#[test]
fn discovery_dry_run_then_apply() {
    let fixture = Fixture::new();
    let store = built(&fixture);
    let discoverer = RelationshipDiscoverer::new(&fixture.config);
    let before = fs::read(store.path()).unwrap();

    let outcome = discoverer.run(&store, ApplyMode::DryRun).unwrap();
    assert_eq!(fs::read(store.path()).unwrap(), before);
    let found: Vec<_> = outcome
        .report
        .relationships
        .iter()
        .map(|e| (e.source.as_str(), e.target.as_str(), e.edge_type.clone()))
        .collect();
    assert_eq!(found, vec![("STJ_297", "STJ_381", EdgeType::Cites)]);
    assert_eq!(outcome.preview.unwrap().relationships_to_add, 1);

    let report: DiscoveryReport = read_json(&fixture.config.discoveries_path).unwrap();
    assert_eq!(report.total_relationships, 1);
    assert_eq!(report.by_discovery_method["text_analysis"], 1);

    discoverer.run(&store, ApplyMode::Apply).unwrap();
    let graph = store.load().unwrap();
    assert_eq!(graph.metadata.relationships_added, Some(1));
    assert!(validate_document(&graph).is_empty());

    let again = discoverer.run(&store, ApplyMode::ReportOnly).unwrap();
    assert_eq!(again.report.total_relationships, 0);
}

#[test]
fn enrichment_from_chunks_is_idempotent() {
    let fixture = Fixture::new();
    let store = built(&fixture);
    let enricher = GraphEnricher::new(&fixture.config);
    let chunks = enricher.extract_chunks(&fixture.chunk_dir()).unwrap();
    assert_eq!(chunks.len(), 2);

    let first = enricher.run(&store, &chunks, false).unwrap();
    assert_eq!(first.new_nodes, 1);
    assert_eq!(first.stats.sumulas_added, 1);
    assert_eq!(first.new_edges, 3);
    assert_eq!(first.stats.edges_governs, 1);
    assert!(has_edge(&store, "STJ_54", "ARTIGO_CC_Art406", EdgeType::Cites));
    assert!(has_edge(&store, "STJ_479", "CONCEITO_responsabilidade_objetiva", EdgeType::Governs));

    let second = enricher.run(&store, &chunks, false).unwrap();
    assert_eq!(second.new_nodes, 0);
    assert_eq!(second.new_edges, 0);

    let graph = store.load().unwrap();
    assert!(validate_document(&graph).is_empty());
    assert_eq!(graph.metadata.enrichment_stats.unwrap()["sumulas_added"], 0);
}

#[test]
fn enrichment_from_entities_file_and_dry_run() {
    let fixture = Fixture::new();
    let store = built(&fixture);
    let enricher = GraphEnricher::new(&fixture.config);

    let entities_path = fixture.dir.path().join("entities.json");
    let chunks = enricher.extract_chunks(&fixture.chunk_dir()).unwrap();
    lexgraph::storage::write_json_atomic(&entities_path, &chunks).unwrap();
    let loaded = GraphEnricher::load_entities_file(&entities_path).unwrap();
    assert_eq!(loaded, chunks);

    let before = fs::read(store.path()).unwrap();
    let preview = enricher.run(&store, &loaded, true).unwrap();
    assert!(preview.dry_run);
    assert_eq!(preview.new_nodes, 1);
    assert_eq!(preview.preview_nodes[0].id.as_str(), "STJ_479");
    assert_eq!(fs::read(store.path()).unwrap(), before);
    assert!(!fixture.config.backup_dir.exists());
}
