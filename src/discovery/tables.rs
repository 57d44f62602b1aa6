//! Fixed domain knowledge consulted by the discovery heuristics

/// Topic label → node ids believed to share that subject
pub const SUBJECT_CLUSTERS: &[(&str, &[&str])] = &[
    (
        "bancario_juros",
        &["STJ_30", "STJ_379", "STJ_382", "STJ_472", "STJ_539", "STJ_541"],
    ),
    ("bancario_cdc", &["STJ_297", "STJ_381"]),
    ("dano_moral", &["STJ_362", "STJ_387", "STJ_388", "TEMA_1368"]),
    ("responsabilidade_objetiva", &["STJ_479", "STJ_523", "STJ_595"]),
    ("plano_saude", &["STJ_302", "STJ_608", "STJ_609"]),
    (
        "execucao_fiscal",
        &["STJ_392", "STJ_393", "STJ_409", "STJ_452", "STJ_559"],
    ),
];

/// A legal concept and the precedents that instantiate it
pub struct ConceptMapping {
    pub concept: &'static str,
    pub concept_id: &'static str,
    /// Linked with GOVERNS
    pub sumulas: &'static [&'static str],
    /// Linked with APPLIES_TO
    pub temas: &'static [&'static str],
}

pub const CONCEPT_MAPPINGS: &[ConceptMapping] = &[
    ConceptMapping {
        concept: "anatocismo",
        concept_id: "CONCEITO_capitalizacao_de_juros",
        sumulas: &["STJ_472", "STJ_539", "STJ_541"],
        temas: &[],
    },
    ConceptMapping {
        concept: "dano_moral_in_re_ipsa",
        concept_id: "CONCEITO_dano_moral_in_re_ipsa",
        sumulas: &["STJ_387", "STJ_388", "STJ_403"],
        temas: &[],
    },
    ConceptMapping {
        concept: "fortuito_interno",
        concept_id: "CONCEITO_fortuito_interno",
        sumulas: &["STJ_479"],
        temas: &[],
    },
    ConceptMapping {
        concept: "correcao_monetaria",
        concept_id: "CONCEITO_correcao_monetaria",
        sumulas: &["STJ_30", "STJ_362", "STJ_54"],
        temas: &["TEMA_1368"],
    },
    ConceptMapping {
        concept: "responsabilidade_objetiva",
        concept_id: "CONCEITO_responsabilidade_objetiva",
        sumulas: &["STJ_479", "STJ_523", "STJ_595", "STJ_643"],
        temas: &[],
    },
    ConceptMapping {
        concept: "selic",
        concept_id: "CONCEITO_selic",
        sumulas: &[],
        temas: &["TEMA_1368"],
    },
];

/// Explicit "source modifies target" facts
pub struct Supersession {
    pub source: &'static str,
    pub target: &'static str,
    pub reason: &'static str,
}

pub const SUPERSESSIONS: &[Supersession] = &[Supersession {
    source: "TEMA_1368",
    target: "STJ_54",
    reason: "Tema 1368 unifica correção monetária, superando parcialmente Súmula 54",
}];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ids;

    #[test]
    fn concept_ids_match_recognizer_ids() {
        for mapping in CONCEPT_MAPPINGS.iter().skip(1) {
            assert_eq!(ids::conceito_id(mapping.concept), mapping.concept_id);
        }
        assert_eq!(
            ids::conceito_id("capitalização de juros"),
            CONCEPT_MAPPINGS[0].concept_id
        );
    }
}
