//! Pattern-based recognition of Brazilian legal references
//!
//! The recognizer is stateless: text in, typed mentions out. Every mention
//! carries a normalized id that is also the id of the graph node it refers
//! to (see [`crate::graph::ids`]).

mod batch;
mod mention;
mod patterns;

pub use batch::{ChunkExtraction, FileExtraction};
pub use mention::{EntityKind, EntityMention, ExtractedEntities};
pub use patterns::{canonical_code, ARTICLE_REFERENCE, SUMULA_REFERENCE, TEMA_REFERENCE};

use crate::config::LexConfig;
use patterns::Candidate;
use std::collections::HashSet;

/// Characters of context kept on each side of a mention by default
pub const DEFAULT_CONTEXT_WINDOW: usize = 50;

const ELLIPSIS: &str = "...";

#[derive(Debug, Clone)]
pub struct EntityRecognizer {
    context_window: usize,
    text_fields: Vec<String>,
    id_field: String,
}

impl Default for EntityRecognizer {
    fn default() -> Self {
        Self::new(&LexConfig::default())
    }
}

impl EntityRecognizer {
    pub fn new(config: &LexConfig) -> Self {
        Self {
            context_window: config.context_window,
            text_fields: config.text_fields.clone(),
            id_field: config.id_field.clone(),
        }
    }

    pub fn with_context_window(mut self, window: usize) -> Self {
        self.context_window = window;
        self
    }

    /// Every mention in `text`, grouped by type. All types are present in the
    /// result, empty when nothing matched.
    pub fn extract(&self, text: &str) -> ExtractedEntities {
        let mut entities = ExtractedEntities::default();
        for kind in EntityKind::ALL {
            *entities.get_mut(kind) = self.extract_kind(kind, text);
        }
        entities
    }

    /// Deduplicated mentions of a single type
    pub fn extract_kind(&self, kind: EntityKind, text: &str) -> Vec<EntityMention> {
        let mentions = patterns::find_candidates(kind, text)
            .into_iter()
            .map(|candidate| self.to_mention(kind, text, candidate))
            .collect();
        deduplicate(mentions)
    }

    /// All mentions as a flat list ordered by position in the text.
    /// Ties at the same offset keep [`EntityKind::ALL`] order.
    pub fn extract_all(&self, text: &str) -> Vec<EntityMention> {
        let mut all: Vec<EntityMention> = self.extract(text).iter().cloned().collect();
        all.sort_by_key(|m| (m.start_offset, m.kind));
        all
    }

    fn to_mention(&self, kind: EntityKind, text: &str, candidate: Candidate) -> EntityMention {
        let context_snippet = context_snippet(text, candidate.start, candidate.end, self.context_window);
        EntityMention {
            kind,
            raw_value: candidate.raw_value,
            label: candidate.label,
            tribunal: candidate.tribunal,
            number: candidate.number,
            code: candidate.code,
            normalized_id: candidate.normalized_id,
            start_offset: candidate.start,
            end_offset: candidate.end,
            context_snippet,
        }
    }
}

/// Overlap and identity suppression.
///
/// Sorted by start ascending, end descending, so at equal starts the longer
/// match is seen first. A mention is dropped if it starts before the end of
/// the last accepted one, or if its id was already accepted.
pub fn deduplicate(mut mentions: Vec<EntityMention>) -> Vec<EntityMention> {
    mentions.sort_by(|a, b| {
        a.start_offset
            .cmp(&b.start_offset)
            .then(b.end_offset.cmp(&a.end_offset))
    });

    let mut accepted = Vec::with_capacity(mentions.len());
    let mut seen = HashSet::new();
    let mut last_end = 0;
    for mention in mentions {
        if mention.start_offset < last_end {
            continue;
        }
        if !seen.insert(mention.normalized_id.clone()) {
            continue;
        }
        last_end = mention.end_offset;
        accepted.push(mention);
    }
    accepted
}

/// Up to `window` characters either side of `[start, end)`, newlines
/// flattened. Truncated sides are marked with `...`.
pub fn context_snippet(text: &str, start: usize, end: usize, window: usize) -> String {
    let start = start.min(text.len());
    let end = end.clamp(start, text.len());

    let left = if window == 0 {
        start
    } else {
        text[..start]
            .char_indices()
            .rev()
            .take(window)
            .last()
            .map(|(i, _)| i)
            .unwrap_or(start)
    };
    let right = text[end..]
        .char_indices()
        .nth(window)
        .map(|(i, _)| end + i)
        .unwrap_or(text.len());

    let body = text[left..right].replace(['\n', '\r'], " ");
    let mut snippet = String::with_capacity(body.len() + 2 * ELLIPSIS.len());
    if left > 0 {
        snippet.push_str(ELLIPSIS);
    }
    snippet.push_str(body.trim());
    if right < text.len() {
        snippet.push_str(ELLIPSIS);
    }
    snippet
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(mentions: &[EntityMention]) -> Vec<&str> {
        mentions.iter().map(|m| m.normalized_id.as_str()).collect()
    }

    fn mention(id: &str, start: usize, end: usize) -> EntityMention {
        EntityMention {
            kind: EntityKind::Sumula,
            raw_value: String::new(),
            label: id.to_string(),
            tribunal: None,
            number: None,
            code: None,
            normalized_id: id.to_string(),
            start_offset: start,
            end_offset: end,
            context_snippet: String::new(),
        }
    }

    #[test]
    fn test_sumula_and_tema_default_to_stj() {
        let text = "Aplica-se a Sumula 297 do STJ às instituições financeiras, \
                    e o Tema 1368 do STJ unificou a correção monetária.";
        let entities = EntityRecognizer::default().extract(text);

        assert_eq!(ids(&entities.sumulas), vec!["STJ_297"]);
        assert_eq!(ids(&entities.temas), vec!["TEMA_1368"]);
        assert_eq!(entities.sumulas[0].tribunal.as_deref(), Some("STJ"));
        assert_eq!(entities.temas[0].tribunal.as_deref(), Some("STJ"));
        assert_eq!(entities.sumulas[0].label, "Sumula 297/STJ");
    }

    #[test]
    fn test_phrasings_resolve_to_one_entity() {
        let text = "Súmula 297 do STJ. Ver também Súmula n. 297/STJ e a referida súmula 297.";
        let entities = EntityRecognizer::default().extract(text);
        assert_eq!(ids(&entities.sumulas), vec!["STJ_297"]);
    }

    #[test]
    fn test_longer_match_wins_at_same_start() {
        let kept = deduplicate(vec![
            mention("STJ_297_short", 0, 10),
            mention("STJ_297", 0, 17),
            mention("STJ_30", 5, 12),
        ]);
        assert_eq!(ids(&kept), vec!["STJ_297"]);
    }

    #[test]
    fn test_identity_suppression_keeps_first_position() {
        let kept = deduplicate(vec![mention("STJ_297", 40, 50), mention("STJ_297", 0, 10)]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].start_offset, 0);
    }

    #[test]
    fn test_overlapping_patterns_yield_one_mention() {
        let text = "conforme a referida Súmula 297 do STJ";
        let sumulas = EntityRecognizer::default().extract_kind(EntityKind::Sumula, text);
        assert_eq!(sumulas.len(), 1);
        assert_eq!(sumulas[0].normalized_id, "STJ_297");
    }

    #[test]
    fn test_statute_normalization() {
        let recognizer = EntityRecognizer::default();
        assert_eq!(ids(&recognizer.extract("Lei 8.078/90").leis), vec!["LEI_8078_1990"]);
        assert_eq!(ids(&recognizer.extract("Lei 12.016/2009").leis), vec!["LEI_12016_2009"]);
        assert_eq!(
            ids(&recognizer.extract("nos termos do Decreto-Lei 911/69").leis),
            vec!["DL_911_1969"]
        );
    }

    #[test]
    fn test_code_aliases_and_incisos() {
        let text = "Violação ao art. 186 do Código Civil, ao art. 14 do CDC \
                    e ao art. 5º, LXIX da CF, bem como ao art. 42 da Lei 8.078/90.";
        let artigos = EntityRecognizer::default().extract(text).artigos;
        assert_eq!(
            ids(&artigos),
            vec![
                "ARTIGO_CC_Art186",
                "ARTIGO_CDC_Art14",
                "ARTIGO_CF_Art5_LXIX",
                "ARTIGO_LEI_8078_1990_Art42",
            ]
        );
        assert_eq!(artigos[0].code.as_deref(), Some("CC"));
    }

    #[test]
    fn test_article_without_code() {
        let artigos = EntityRecognizer::default().extract("nos termos do art. 927, parágrafo").artigos;
        assert_eq!(ids(&artigos), vec!["ARTIGO_Art927"]);
    }

    #[test]
    fn test_article_pair() {
        let artigos = EntityRecognizer::default().extract("arts. 186 e 927 do CC").artigos;
        assert_eq!(ids(&artigos), vec!["ARTIGO_CC_Art186", "ARTIGO_CC_Art927"]);
    }

    #[test]
    fn test_vinculante_and_processo() {
        let text = "A Súmula Vinculante 61 foi aplicada no REsp 1.234.567/SP e no AgInt no AREsp 98.765.";
        let entities = EntityRecognizer::default().extract(text);
        assert_eq!(ids(&entities.sumulas), vec!["STF_SV61"]);
        assert_eq!(ids(&entities.processos), vec!["RESP_1234567_SP", "AGINT_NO_ARESP_98765"]);
    }

    #[test]
    fn test_concepts_and_tribunals() {
        let text = "O Superior Tribunal de Justiça reconhece o dano moral in re ipsa \
                    e a responsabilidade objetiva; o STJ também veda a venda casada.";
        let entities = EntityRecognizer::default().extract(text);
        assert_eq!(
            ids(&entities.conceitos),
            vec![
                "CONCEITO_dano_moral_in_re_ipsa",
                "CONCEITO_responsabilidade_objetiva",
                "CONCEITO_venda_casada",
            ]
        );
        assert_eq!(ids(&entities.tribunais), vec!["TRIBUNAL_STJ"]);
    }

    #[test]
    fn test_empty_text_has_every_type() {
        let entities = EntityRecognizer::default().extract("");
        assert!(entities.is_empty());
        let counts = entities.counts();
        assert_eq!(counts.len(), 7);
        assert!(counts.values().all(|&n| n == 0));

        let json = serde_json::to_value(&entities).unwrap();
        for kind in EntityKind::ALL {
            assert_eq!(json[kind.plural()], serde_json::json!([]));
        }
    }

    #[test]
    fn test_context_window_marks_truncation() {
        let text = format!("{} Súmula 297 do STJ {}", "a".repeat(80), "b".repeat(80));
        let sumulas = EntityRecognizer::default()
            .with_context_window(10)
            .extract_kind(EntityKind::Sumula, &text);
        let context = &sumulas[0].context_snippet;
        assert_eq!(context, "...aaaaaaaaa Súmula 297 do STJ bbbbbbbbb...");
    }

    #[test]
    fn test_context_at_document_edges() {
        let text = "Súmula 297";
        let sumulas = EntityRecognizer::default().extract_kind(EntityKind::Sumula, text);
        assert_eq!(sumulas[0].context_snippet, "Súmula 297");
    }

    #[test]
    fn test_context_is_char_boundary_safe() {
        let text = "ção ção Súmula 1 ção";
        let start = text.find("Súmula").unwrap();
        let snippet = context_snippet(text, start, start + "Súmula 1".len(), 3);
        assert_eq!(snippet, "...ão Súmula 1 çã...");
        assert!(snippet.starts_with("..."));
        assert!(snippet.ends_with("..."));
    }

    #[test]
    fn test_recognition_is_deterministic() {
        let text = "Súmula 479 do STJ, Tema 972, art. 6 do CDC, anatocismo, Lei 9.099/95";
        let recognizer = EntityRecognizer::default();
        assert_eq!(recognizer.extract(text), recognizer.extract(text));
    }

    #[test]
    fn test_extract_all_is_positional() {
        let text = "Tema 1368 altera a Súmula 54";
        let all = EntityRecognizer::default().extract_all(text);
        let kinds: Vec<_> = all.iter().map(|m| m.kind).collect();
        assert_eq!(kinds, vec![EntityKind::Tema, EntityKind::Sumula]);
    }
}
