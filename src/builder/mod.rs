//! Graph Builder: curated knowledge-base records to the canonical base graph.
//!
//! Nodes come from the súmula, tema and domain sources plus a fixed
//! catalog of articles and concepts. Edges are derived (REQUIRES, GOVERNS,
//! RELATED_TO) or seeded from curated tables (MODIFIES, APPLIES_TO, CITES).
//! An edge is only emitted when both endpoints exist, so a built graph has
//! no dangling edges. A domain REQUIRES reference to a súmula or tema that
//! is not in the knowledge base is reported as a dangling finding instead;
//! the validation pass then runs and its findings are appended.

mod catalog;
mod sources;

pub use catalog::{curated_edges, ArticleEntry, ConceptEntry, ARTICLES, CONCEPTS};
pub use sources::{
    load_domains, load_sumulas, load_temas, Detalhamento, DomainEntry, DomainRecord, KnowledgeBase, SumulaEntry,
    SumulaRecord, TemaEntry, TemaRecord,
};

use crate::config::LexConfig;
use crate::graph::{ids, validate, Edge, EdgeType, Graph, GraphDelta, Node, NodeId, NodeType, ValidationFinding};
use crate::storage::{GraphStore, StorageResult};
use serde_json::Value;
use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// RELATED_TO needs at least this many shared domains...
pub const MIN_SHARED_DOMAINS: usize = 1;
/// ...and at least this many shared keywords.
pub const MIN_SHARED_KEYWORDS: usize = 2;
/// Shared keywords recorded on a RELATED_TO edge
const SHARED_KEYWORDS_KEPT: usize = 5;

/// A freshly built graph and what validation found in it
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub graph: Graph,
    pub findings: Vec<ValidationFinding>,
}

pub struct GraphBuilder {
    config: LexConfig,
}

impl GraphBuilder {
    pub fn new(config: &LexConfig) -> Self {
        Self { config: config.clone() }
    }

    /// Load the configured sources and build.
    pub fn build(&self) -> BuildOutput {
        let kb = KnowledgeBase::load(&self.config);
        self.build_from(&kb)
    }

    /// Build from already loaded records.
    pub fn build_from(&self, kb: &KnowledgeBase) -> BuildOutput {
        let mut nodes: Vec<Node> = Vec::new();
        nodes.extend(kb.sumulas.iter().map(sumula_node));
        nodes.extend(kb.temas.iter().map(tema_node));
        nodes.extend(kb.domains.iter().map(domain_node));
        nodes.extend(ARTICLES.iter().map(ArticleEntry::to_node));
        nodes.extend(CONCEPTS.iter().map(ConceptEntry::to_node));

        let mut known: HashSet<NodeId> = HashSet::new();
        let mut delta = GraphDelta::new();
        for node in nodes {
            if known.insert(node.id.clone()) {
                delta.nodes.push(node);
            } else {
                warn!(id = %node.id, "duplicate node id in sources, keeping first");
            }
        }

        let mut findings = Vec::new();
        for edge in requires_edges(&kb.domains) {
            let dangling = dangling_findings(&edge, &known);
            if dangling.is_empty() {
                delta.edges.push(edge);
                continue;
            }
            for finding in &dangling {
                warn!(%finding, "required reference not in knowledge base");
            }
            findings.extend(dangling);
        }

        let mut edges = Vec::new();
        edges.extend(governs_edges(&delta.nodes, &known));
        edges.extend(related_edges(&delta.nodes));
        edges.extend(curated_edges());

        let candidates = edges.len();
        let required = delta.edges.len();
        delta
            .edges
            .extend(edges.into_iter().filter(|e| known.contains(&e.source) && known.contains(&e.target)));
        debug!(
            skipped = candidates - (delta.edges.len() - required),
            "edges without both endpoints skipped"
        );

        let (graph, summary) = Graph::new().merge(delta);
        let validation = validate(&graph);
        for finding in &validation {
            warn!(%finding, "validation finding");
        }
        findings.extend(validation);
        info!(
            nodes = summary.nodes_added,
            edges = summary.edges_added,
            findings = findings.len(),
            "graph built"
        );
        BuildOutput { graph, findings }
    }

    /// Build and write the graph, backing up any existing document first.
    /// Returns the output and the backup path, if one was taken.
    pub fn build_and_save(&self, store: &dyn GraphStore) -> StorageResult<(BuildOutput, Option<PathBuf>)> {
        let output = self.build();
        let backup = if store.exists() { Some(store.backup()?) } else { None };
        store.save(&output.graph)?;
        Ok((output, backup))
    }
}

/// Underscores to spaces, each word capitalized.
fn title_case(name: &str) -> String {
    name.split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Integer when the key is numeric, the key itself otherwise
pub fn numero_value(numero: &str) -> Value {
    numero
        .parse::<u64>()
        .map(Value::from)
        .unwrap_or_else(|_| Value::from(numero))
}

fn sumula_node(entry: &SumulaEntry) -> Node {
    Node::new(entry.id(), NodeType::Sumula)
        .with_attribute("tribunal", entry.tribunal.as_str())
        .with_attribute("numero", numero_value(&entry.numero))
        .with_attribute("texto", ids::strip_diacritics(&entry.record.texto))
        .with_attribute("domains", entry.record.domains.clone())
        .with_attribute("keywords", entry.record.keywords.clone())
}

fn tema_node(entry: &TemaEntry) -> Node {
    let record = &entry.record;
    let mut node = Node::new(entry.id(), NodeType::Tema)
        .with_attribute(
            "tribunal",
            record.tribunal.clone().unwrap_or_else(|| ids::DEFAULT_TRIBUNAL.to_string()),
        )
        .with_attribute("numero", numero_value(&entry.numero))
        .with_attribute(
            "situacao",
            record.situacao.clone().unwrap_or_else(|| "AFETADO".to_string()),
        )
        .with_attribute("tese", ids::strip_diacritics(&record.tese))
        .with_attribute("domains", record.domains.clone())
        .with_attribute("keywords", record.keywords.clone())
        .with_attribute("aplicacao", record.aplicacao.as_str());

    if let Some(detail) = &record.detalhamento {
        let parts = [
            ("cenarios", &detail.cenarios),
            ("vedacoes", &detail.vedacoes),
            ("requisitos", &detail.requisitos),
            ("efeitos", &detail.efeitos),
        ];
        for (key, value) in parts {
            if let Some(value) = value {
                node = node.with_attribute(key, value.clone());
            }
        }
    }
    node
}

fn domain_node(entry: &DomainEntry) -> Node {
    Node::new(entry.id(), NodeType::Dominio)
        .with_attribute("nome", title_case(&entry.name))
        .with_attribute("agente", entry.record.agente_especializado.as_str())
        .with_attribute("keywords", entry.record.keywords.clone())
        .with_attribute("base_legal", entry.record.base_legal.clone())
}

/// Domain → principal súmulas (`SEMPRE`) and temas (`QUANDO_APLICAVEL`),
/// `prioridade` counting from 1 in list order.
fn requires_edges(domains: &[DomainEntry]) -> Vec<Edge> {
    let mut edges = Vec::new();
    for domain in domains {
        let source = domain.id();
        for (i, target) in domain
            .record
            .sumula_refs()
            .iter()
            .filter_map(|r| ids::sumula_ref_id(r))
            .enumerate()
        {
            edges.push(
                Edge::new(source.as_str(), target, EdgeType::Requires)
                    .with_property("obrigatoriedade", "SEMPRE")
                    .with_property("prioridade", i + 1),
            );
        }
        for (i, tema) in domain.record.tema_refs().iter().enumerate() {
            edges.push(
                Edge::new(source.as_str(), ids::tema_id(tema), EdgeType::Requires)
                    .with_property("obrigatoriedade", "QUANDO_APLICAVEL")
                    .with_property("prioridade", i + 1),
            );
        }
    }
    edges
}

/// Súmula/tema → each domain named in its own `domains` attribute
fn governs_edges(nodes: &[Node], known: &HashSet<NodeId>) -> Vec<Edge> {
    let mut edges = Vec::new();
    for node in nodes.iter().filter(|n| is_precedent(n)) {
        let numero = match node.attribute("numero") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        };
        for domain in node.string_list("domains") {
            let target = NodeId::from_string(ids::dominio_id(&domain));
            if !known.contains(&target) {
                continue;
            }
            let descricao = format!("{} {} governa o dominio {}", node.node_type, numero, domain);
            edges.push(
                Edge::new(node.id.clone(), target, EdgeType::Governs).with_property("descricao", descricao),
            );
        }
    }
    edges
}

/// One finding per endpoint of `edge` missing from `known`
fn dangling_findings(edge: &Edge, known: &HashSet<NodeId>) -> Vec<ValidationFinding> {
    let mut findings = Vec::new();
    if !known.contains(&edge.source) {
        findings.push(ValidationFinding::DanglingSource { key: edge.key() });
    }
    if !known.contains(&edge.target) {
        findings.push(ValidationFinding::DanglingTarget { key: edge.key() });
    }
    findings
}

fn is_precedent(node: &Node) -> bool {
    matches!(node.node_type, NodeType::Sumula | NodeType::Tema)
}

/// Pairwise over every súmula/tema: an edge when the pair shares at least
/// [`MIN_SHARED_DOMAINS`] domains and [`MIN_SHARED_KEYWORDS`] keywords.
///
/// Quadratic in the number of precedents, which is fine for a curated
/// knowledge base of a few hundred entries.
fn related_edges(nodes: &[Node]) -> Vec<Edge> {
    let mut precedents: Vec<(&Node, BTreeSet<String>, BTreeSet<String>)> = nodes
        .iter()
        .filter(|n| is_precedent(n))
        .map(|n| {
            (
                n,
                n.string_list("domains").into_iter().collect(),
                n.string_list("keywords").into_iter().collect(),
            )
        })
        .collect();
    precedents.sort_by(|a, b| a.0.id.cmp(&b.0.id));

    let mut edges = Vec::new();
    for (i, (first, domains_a, keywords_a)) in precedents.iter().enumerate() {
        for (second, domains_b, keywords_b) in &precedents[i + 1..] {
            let shared_domains: Vec<&String> = domains_a.intersection(domains_b).collect();
            let shared_keywords: Vec<&String> = keywords_a.intersection(keywords_b).collect();
            if shared_domains.len() < MIN_SHARED_DOMAINS || shared_keywords.len() < MIN_SHARED_KEYWORDS {
                continue;
            }
            let kept: Vec<&String> = shared_keywords.into_iter().take(SHARED_KEYWORDS_KEPT).collect();
            edges.push(
                Edge::new(first.id.clone(), second.id.clone(), EdgeType::RelatedTo)
                    .with_property("shared_domains", Value::from(to_values(&shared_domains)))
                    .with_property("shared_keywords", Value::from(to_values(&kept))),
            );
        }
    }
    edges
}

fn to_values(items: &[&String]) -> Vec<Value> {
    items.iter().map(|s| Value::from(s.as_str())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sumula(tribunal: &str, numero: &str, domains: &[&str], keywords: &[&str]) -> SumulaEntry {
        SumulaEntry {
            tribunal: tribunal.to_string(),
            numero: numero.to_string(),
            record: SumulaRecord {
                texto: format!("Texto da súmula {}", numero),
                domains: domains.iter().map(|s| s.to_string()).collect(),
                keywords: keywords.iter().map(|s| s.to_string()).collect(),
            },
        }
    }

    fn tema(numero: &str, domains: &[&str], keywords: &[&str]) -> TemaEntry {
        TemaEntry {
            numero: numero.to_string(),
            record: TemaRecord {
                tese: "Tese firmada".to_string(),
                domains: domains.iter().map(|s| s.to_string()).collect(),
                keywords: keywords.iter().map(|s| s.to_string()).collect(),
                ..Default::default()
            },
        }
    }

    fn domain(name: &str, record: serde_json::Value) -> DomainEntry {
        DomainEntry {
            name: name.to_string(),
            record: serde_json::from_value(record).unwrap(),
        }
    }

    fn builder() -> GraphBuilder {
        GraphBuilder::new(&LexConfig::rooted_at("/nonexistent"))
    }

    fn find<'a>(graph: &'a Graph, source: &str, target: &str, edge_type: EdgeType) -> Option<&'a Edge> {
        graph
            .edges
            .iter()
            .find(|e| e.source.as_str() == source && e.target.as_str() == target && e.edge_type == edge_type)
    }

    #[test]
    fn test_domain_requires_principal_sumula() {
        let kb = KnowledgeBase {
            sumulas: vec![sumula("STJ", "297", &["direito_bancario"], &[])],
            temas: vec![],
            domains: vec![domain(
                "direito_bancario",
                json!({"agente_especializado": "agente_bancario", "sumulas_principais": ["297"]}),
            )],
        };
        let output = builder().build_from(&kb);

        let edge = find(&output.graph, "DOMINIO_direito_bancario", "STJ_297", EdgeType::Requires)
            .expect("REQUIRES edge");
        assert_eq!(edge.property_str("obrigatoriedade"), Some("SEMPRE"));
        assert_eq!(edge.properties["prioridade"], json!(1));

        let node = output.graph.node(&NodeId::from("DOMINIO_direito_bancario")).unwrap();
        assert_eq!(node.text("nome"), Some("Direito Bancario"));
        assert_eq!(node.text("agente"), Some("agente_bancario"));
    }

    #[test]
    fn test_tema_requires_and_priorities() {
        let kb = KnowledgeBase {
            sumulas: vec![sumula("STJ", "30", &[], &[]), sumula("STJ", "382", &[], &[])],
            temas: vec![tema("1368", &[], &[])],
            domains: vec![domain(
                "direito_bancario",
                json!({"sumulas_principais": ["382", 30, "999"], "temas_principais": ["1368"]}),
            )],
        };
        let output = builder().build_from(&kb);
        let graph = &output.graph;

        let second = find(graph, "DOMINIO_direito_bancario", "STJ_30", EdgeType::Requires).unwrap();
        assert_eq!(second.properties["prioridade"], json!(2));
        let tema = find(graph, "DOMINIO_direito_bancario", "TEMA_1368", EdgeType::Requires).unwrap();
        assert_eq!(tema.property_str("obrigatoriedade"), Some("QUANDO_APLICAVEL"));
        assert!(find(graph, "DOMINIO_direito_bancario", "STJ_999", EdgeType::Requires).is_none());
        assert_eq!(
            output.findings,
            vec![ValidationFinding::DanglingTarget {
                key: (
                    NodeId::from("DOMINIO_direito_bancario"),
                    NodeId::from("STJ_999"),
                    EdgeType::Requires
                ),
            }]
        );
    }

    #[test]
    fn test_missing_required_references_become_findings() {
        let kb = KnowledgeBase {
            sumulas: vec![sumula("STJ", "297", &[], &[])],
            temas: vec![],
            domains: vec![domain(
                "direito_bancario",
                json!({"sumulas_principais": ["297", "999"], "temas_principais": ["1368"]}),
            )],
        };
        let output = builder().build_from(&kb);

        let requires = output
            .graph
            .edges
            .iter()
            .filter(|e| e.edge_type == EdgeType::Requires)
            .count();
        assert_eq!(requires, 1);

        let missing: Vec<&str> = output
            .findings
            .iter()
            .filter_map(|f| match f {
                ValidationFinding::DanglingTarget { key } => Some(key.1.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(missing, vec!["STJ_999", "TEMA_1368"]);
        assert_eq!(
            output.findings[0].to_string(),
            "Dangling edge target: STJ_999 in (DOMINIO_direito_bancario, STJ_999, REQUIRES)"
        );
        assert!(validate(&output.graph).is_empty());
    }

    #[test]
    fn test_governs_each_listed_domain() {
        let kb = KnowledgeBase {
            sumulas: vec![sumula("STJ", "297", &["direito_bancario", "consumidor", "inexistente"], &[])],
            temas: vec![],
            domains: vec![
                domain("direito_bancario", json!({})),
                domain("consumidor", json!({})),
            ],
        };
        let graph = builder().build_from(&kb).graph;
        let governs: Vec<_> = graph
            .edges
            .iter()
            .filter(|e| e.edge_type == EdgeType::Governs)
            .map(|e| e.target.as_str())
            .collect();
        assert_eq!(governs, vec!["DOMINIO_direito_bancario", "DOMINIO_consumidor"]);
        assert_eq!(
            graph.edges[0].property_str("descricao"),
            Some("Sumula 297 governa o dominio direito_bancario")
        );
    }

    #[test]
    fn test_related_requires_both_thresholds() {
        let kb = KnowledgeBase {
            sumulas: vec![
                sumula("STJ", "30", &["bancario"], &["juros", "correcao", "mora"]),
                sumula("STJ", "54", &["bancario"], &["juros", "correcao"]),
                sumula("STJ", "297", &["bancario"], &["juros"]),
                sumula("STJ", "362", &["civil"], &["juros", "correcao"]),
            ],
            temas: vec![],
            domains: vec![],
        };
        let graph = builder().build_from(&kb).graph;
        let related: Vec<_> = graph
            .edges
            .iter()
            .filter(|e| e.edge_type == EdgeType::RelatedTo)
            .collect();

        assert_eq!(related.len(), 1);
        assert_eq!(related[0].source.as_str(), "STJ_30");
        assert_eq!(related[0].target.as_str(), "STJ_54");
        assert_eq!(related[0].properties["shared_domains"], json!(["bancario"]));
        assert_eq!(related[0].properties["shared_keywords"], json!(["correcao", "juros"]));
    }

    #[test]
    fn test_curated_edges_need_both_endpoints() {
        let kb = KnowledgeBase {
            sumulas: vec![sumula("STJ", "297", &[], &[]), sumula("STJ", "54", &[], &[])],
            temas: vec![],
            domains: vec![],
        };
        let output = builder().build_from(&kb);
        let graph = &output.graph;

        assert!(find(graph, "STJ_297", "ARTIGO_CDC_Art6", EdgeType::Cites).is_some());
        assert!(find(graph, "STJ_297", "ARTIGO_CDC_Art14", EdgeType::Cites).is_some());
        assert!(find(graph, "STJ_469", "ARTIGO_CDC_Art6", EdgeType::Cites).is_none());
        assert!(find(graph, "TEMA_1368", "STJ_54", EdgeType::Modifies).is_none());
        assert!(output.findings.is_empty());
    }

    #[test]
    fn test_missing_sources_still_build_catalog() {
        let output = builder().build();
        let stats = &output.graph.metadata.stats;
        assert_eq!(stats.nodes_by_type.get("Artigo"), Some(&8));
        assert_eq!(stats.nodes_by_type.get("Conceito"), Some(&5));
        assert_eq!(stats.total_nodes, 13);
        assert_eq!(stats.total_edges, 0);
        assert!(output.findings.is_empty());
    }

    #[test]
    fn test_texts_are_stripped_of_diacritics() {
        let mut entry = sumula("STJ", "297", &[], &[]);
        entry.record.texto = "O Código de Defesa do Consumidor é aplicável às instituições financeiras.".to_string();
        let kb = KnowledgeBase {
            sumulas: vec![entry],
            ..Default::default()
        };
        let graph = builder().build_from(&kb).graph;
        let node = graph.node(&NodeId::from("STJ_297")).unwrap();
        assert_eq!(
            node.text("texto"),
            Some("O Codigo de Defesa do Consumidor e aplicavel as instituicoes financeiras.")
        );
        assert_eq!(node.attribute("numero"), Some(&json!(297)));
    }

    #[test]
    fn test_tema_defaults_and_detail() {
        let entry = TemaEntry {
            numero: "1368".to_string(),
            record: serde_json::from_value(json!({
                "tese": "Correção pela SELIC",
                "detalhamento": {"cenarios": ["condenacao civil"], "efeitos": "ex nunc"}
            }))
            .unwrap(),
        };
        let kb = KnowledgeBase {
            temas: vec![entry],
            ..Default::default()
        };
        let graph = builder().build_from(&kb).graph;
        let node = graph.node(&NodeId::from("TEMA_1368")).unwrap();
        assert_eq!(node.text("tribunal"), Some("STJ"));
        assert_eq!(node.text("situacao"), Some("AFETADO"));
        assert_eq!(node.text("tese"), Some("Correcao pela SELIC"));
        assert_eq!(node.attribute("cenarios"), Some(&json!(["condenacao civil"])));
        assert_eq!(node.text("efeitos"), Some("ex nunc"));
        assert!(node.attribute("vedacoes").is_none());
    }

    #[test]
    fn test_build_is_deterministic() {
        let kb = KnowledgeBase {
            sumulas: vec![
                sumula("STJ", "30", &["bancario"], &["juros", "correcao"]),
                sumula("STJ", "54", &["bancario"], &["juros", "correcao"]),
            ],
            temas: vec![tema("1368", &["bancario"], &["juros", "correcao"])],
            domains: vec![domain("bancario", json!({"sumulas_principais": ["30"]}))],
        };
        let first = builder().build_from(&kb).graph;
        let second = builder().build_from(&kb).graph;
        assert_eq!(
            first.nodes.keys().collect::<Vec<_>>(),
            second.nodes.keys().collect::<Vec<_>>()
        );
        assert_eq!(first.edges, second.edges);
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("direito_bancario"), "Direito Bancario");
        assert_eq!(title_case("mandado_seguranca"), "Mandado Seguranca");
    }
}
