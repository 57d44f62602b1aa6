//! Fixed catalog of statutory articles and legal concepts, and the
//! hand-curated relationships between them and the precedents.

use crate::graph::{ids, Edge, EdgeType, Node, NodeType};

pub struct ArticleEntry {
    pub code: &'static str,
    pub numero: &'static str,
    pub inciso: Option<&'static str>,
    pub texto: &'static str,
}

impl ArticleEntry {
    pub fn id(&self) -> String {
        ids::artigo_id(Some(self.code), self.numero, self.inciso)
    }

    pub fn to_node(&self) -> Node {
        let mut node = Node::new(self.id(), NodeType::Artigo)
            .with_attribute("codigo", self.code)
            .with_attribute("numero", self.numero)
            .with_attribute("texto", self.texto);
        if let Some(inciso) = self.inciso {
            node = node.with_attribute("inciso", inciso);
        }
        node
    }
}

pub struct ConceptEntry {
    pub nome: &'static str,
    pub descricao: &'static str,
    pub exemplos: &'static [&'static str],
}

impl ConceptEntry {
    pub fn id(&self) -> String {
        ids::conceito_id(self.nome)
    }

    pub fn to_node(&self) -> Node {
        Node::new(self.id(), NodeType::Conceito)
            .with_attribute("nome", self.nome)
            .with_attribute("descricao", self.descricao)
            .with_attribute("exemplos", self.exemplos.to_vec())
    }
}

pub const ARTICLES: &[ArticleEntry] = &[
    ArticleEntry {
        code: "CC",
        numero: "186",
        inciso: None,
        texto: "Aquele que, por acao ou omissao voluntaria, negligencia ou imprudencia, violar direito e causar dano a outrem, ainda que exclusivamente moral, comete ato ilicito",
    },
    ArticleEntry {
        code: "CC",
        numero: "187",
        inciso: None,
        texto: "Tambem comete ato ilicito o titular de um direito que, ao exerce-lo, excede manifestamente os limites impostos pelo seu fim economico ou social, pela boa-fe ou pelos bons costumes",
    },
    ArticleEntry {
        code: "CC",
        numero: "927",
        inciso: None,
        texto: "Aquele que, por ato ilicito, causar dano a outrem, fica obrigado a repara-lo",
    },
    ArticleEntry {
        code: "CC",
        numero: "406",
        inciso: None,
        texto: "Quando os juros moratorios nao forem convencionados, ou o forem sem taxa estipulada, ou quando provierem de determinacao da lei, serao fixados segundo a taxa que estiver em vigor para a mora do pagamento de impostos devidos a Fazenda Nacional",
    },
    ArticleEntry {
        code: "CDC",
        numero: "6",
        inciso: None,
        texto: "Sao direitos basicos do consumidor: [...] VI - a efetiva prevencao e reparacao de danos patrimoniais e morais, individuais, coletivos e difusos",
    },
    ArticleEntry {
        code: "CDC",
        numero: "14",
        inciso: None,
        texto: "O fornecedor de servicos responde, independentemente da existencia de culpa, pela reparacao dos danos causados aos consumidores por defeitos relativos a prestacao dos servicos",
    },
    ArticleEntry {
        code: "CF",
        numero: "196",
        inciso: None,
        texto: "A saude e direito de todos e dever do Estado, garantido mediante politicas sociais e economicas que visem a reducao do risco de doenca e de outros agravos e ao acesso universal e igualitario as acoes e servicos para sua promocao, protecao e recuperacao",
    },
    ArticleEntry {
        code: "CF",
        numero: "5",
        inciso: Some("LXIX"),
        texto: "Conceder-se-a mandado de seguranca para proteger direito liquido e certo, nao amparado por habeas corpus ou habeas data, quando o responsavel pela ilegalidade ou abuso de poder for autoridade publica ou agente de pessoa juridica no exercicio de atribuicoes do Poder Publico",
    },
];

pub const CONCEPTS: &[ConceptEntry] = &[
    ConceptEntry {
        nome: "Dano Moral In Re Ipsa",
        descricao: "Dano moral presumido que decorre da propria natureza do ato ilicito, dispensando prova do efetivo prejuizo",
        exemplos: &[
            "negativacao indevida",
            "devolucao indevida de cheque",
            "uso nao autorizado de imagem",
        ],
    },
    ConceptEntry {
        nome: "Responsabilidade Objetiva",
        descricao: "Responsabilidade civil que independe de culpa, baseada na teoria do risco",
        exemplos: &[
            "relacoes de consumo",
            "atividades de risco",
            "responsabilidade do Estado",
        ],
    },
    ConceptEntry {
        nome: "Venda Casada",
        descricao: "Pratica abusiva que condiciona a aquisicao de um produto ou servico a aquisicao de outro",
        exemplos: &["seguro em financiamento", "pacote de servicos bancarios"],
    },
    ConceptEntry {
        nome: "Anatocismo",
        descricao: "Capitalizacao de juros, cobranca de juros sobre juros",
        exemplos: &["juros compostos em contratos bancarios"],
    },
    ConceptEntry {
        nome: "Direito Liquido e Certo",
        descricao: "Direito que pode ser comprovado de plano, mediante prova pre-constituida, sem necessidade de dilacao probatoria",
        exemplos: &[
            "direito a nomeacao em concurso publico dentro das vagas",
            "direito a posse em cargo publico",
        ],
    },
];

/// (source, target, properties) rows of one curated edge type
type CuratedRows = &'static [(&'static str, &'static str, &'static [(&'static str, &'static str)])];

const MODIFIES: CuratedRows = &[(
    "TEMA_1368",
    "STJ_54",
    &[
        ("tipo", "SUPERA_PARCIALMENTE"),
        ("descricao", "Tema 1368 modifica aplicacao da Sumula 54 para juros"),
    ],
)];

const APPLIES_TO: CuratedRows = &[
    ("STJ_479", "CONCEITO_responsabilidade_objetiva", &[("contexto", "fraude bancaria")]),
    ("STJ_388", "CONCEITO_dano_moral_in_re_ipsa", &[("contexto", "devolucao indevida de cheque")]),
    ("STJ_403", "CONCEITO_dano_moral_in_re_ipsa", &[("contexto", "uso nao autorizado de imagem")]),
    ("TEMA_972", "CONCEITO_venda_casada", &[("contexto", "seguro em financiamento")]),
    ("STJ_539", "CONCEITO_anatocismo", &[("contexto", "capitalizacao no SFN")]),
    (
        "DOMINIO_mandado_seguranca",
        "CONCEITO_direito_liquido_e_certo",
        &[("contexto", "requisito do MS")],
    ),
];

const CITES: CuratedRows = &[
    ("STJ_297", "ARTIGO_CDC_Art6", &[("tipo", "BASE_LEGAL")]),
    ("STJ_297", "ARTIGO_CDC_Art14", &[("tipo", "BASE_LEGAL")]),
    ("STJ_469", "ARTIGO_CDC_Art6", &[("tipo", "BASE_LEGAL")]),
    ("STJ_362", "ARTIGO_CC_Art186", &[("tipo", "BASE_LEGAL")]),
    ("TEMA_1368", "ARTIGO_CC_Art406", &[("tipo", "BASE_LEGAL")]),
    ("TEMA_1062", "ARTIGO_CC_Art186", &[("tipo", "BASE_LEGAL")]),
];

/// The curated MODIFIES, APPLIES_TO and CITES edges, in that order.
/// Endpoints are not checked here.
pub fn curated_edges() -> Vec<Edge> {
    [
        (EdgeType::Modifies, MODIFIES),
        (EdgeType::AppliesTo, APPLIES_TO),
        (EdgeType::Cites, CITES),
    ]
    .into_iter()
    .flat_map(|(edge_type, rows)| {
        rows.iter().map(move |(source, target, properties)| {
            properties.iter().fold(
                Edge::new(*source, *target, edge_type.clone()),
                |edge, (key, value)| edge.with_property(*key, *value),
            )
        })
    })
    .collect()
}
