//! Pattern tables for each entity type.
//!
//! Each type has an ordered list of regexes. Patterns use named groups
//! (`num`, `trib`, `code`, ...) so a single capture function per type turns
//! any of its matches into candidates. Earlier patterns win ties.

use super::mention::EntityKind;
use crate::graph::ids;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// A match before context and dedup are applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Candidate {
    pub start: usize,
    pub end: usize,
    pub raw_value: String,
    pub label: String,
    pub tribunal: Option<String>,
    pub number: Option<String>,
    pub code: Option<String>,
    pub normalized_id: String,
}

impl Candidate {
    fn spanning(caps: &Captures<'_>, label: String, normalized_id: String) -> Self {
        let whole = caps.get(0).map(|m| (m.start(), m.end(), m.as_str())).unwrap_or((0, 0, ""));
        Self {
            start: whole.0,
            end: whole.1,
            raw_value: whole.2.to_string(),
            label,
            tribunal: None,
            number: None,
            code: None,
            normalized_id,
        }
    }

    fn with_tribunal(mut self, tribunal: impl Into<String>) -> Self {
        self.tribunal = Some(tribunal.into());
        self
    }

    fn with_number(mut self, number: impl Into<String>) -> Self {
        self.number = Some(number.into());
        self
    }

    fn with_code(mut self, code: Option<String>) -> Self {
        self.code = code;
        self
    }
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static entity pattern")
}

/// Code alternation shared by the article patterns. Long forms first.
const CODE: &str = r"(?P<code>c[óo]digo\s+de\s+defesa\s+do\s+consumidor|c[óo]digo\s+de\s+processo\s+civil|c[óo]digo\s+tribut[áa]rio\s+nacional|c[óo]digo\s+civil|constitui[çc][ãa]o\s+federal|lei\s+(?:n[º°.]?\s*)?\d[\d.]*(?:/(?:\d{4}|\d{2}))?|CDC|CPC|CTN|CLT|ECA|LEF|CF|CC)\b";

/// Optional `nº` / `n.` marker before a number
const NUM_MARK: &str = r"(?:n[º°.]?\s*)?";

/// Canonical abbreviations for code names, matched unaccented and uppercased.
const CODE_ALIASES: &[(&str, &str)] = &[
    ("CODIGO DE DEFESA DO CONSUMIDOR", "CDC"),
    ("CODIGO DE PROCESSO CIVIL", "CPC"),
    ("CODIGO TRIBUTARIO NACIONAL", "CTN"),
    ("CODIGO CIVIL", "CC"),
    ("CONSTITUICAO FEDERAL", "CF"),
];

static LEI_AS_CODE: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)^lei\s+(?:n[º°.]?\s*)?(\d[\d.]*)(?:/(\d{4}|\d{2}))?$"));

static SUMULA_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        compile(&format!(
            r"(?i)\bs[úu]mula\s+(?P<sv>vinculante\s+)?{NUM_MARK}(?P<num>\d+)(?:\s*(?:do|da|/|-)\s*(?P<trib>STJ|STF)\b)?"
        )),
        compile(&format!(
            r"(?i)\benunciado\s+{NUM_MARK}(?P<num>\d+)\s+d[ao]\s+s[úu]mula\s+d[ao]\s+(?P<trib>STJ|STF)\b"
        )),
        compile(&format!(r"(?i)\b(?:a\s+)?referida\s+s[úu]mula\s+{NUM_MARK}(?P<num>\d+)")),
    ]
});

static TEMA_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        compile(&format!(
            r"(?i)\btema\s+(?:repetitivo\s+)?{NUM_MARK}(?P<num>\d+)(?:\s*(?:do|da|/|-)\s*(?P<trib>STJ|STF)\b)?"
        )),
        compile(r"(?i)\brecursos?\s+repetitivos?\s*[-–]\s*tema\s+(?P<num>\d+)"),
        compile(&format!(r"(?i)\bjulgamento\s+d[oa]\s+tema\s+{NUM_MARK}(?P<num>\d+)")),
    ]
});

static ARTIGO_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        compile(&format!(
            r"(?i)(?:§\s*|\bpar(?:[áa]grafo)?\.?\s*)(?P<par>[úu]nico|\d+)[º°]?\s+d[oa]\s+art(?:igo)?\.?\s*(?P<num>\d+)[º°]?(?:\s+d[oa]\s+{CODE})?"
        )),
        compile(&format!(
            r"(?i)\barts\.?\s*(?P<num>\d+)[º°]?\s+e\s+(?P<num2>\d+)[º°]?(?:\s+d[oa]\s+{CODE})?"
        )),
        compile(&format!(
            r"(?i)\bart(?:igo)?\.?\s*(?P<num>\d+)[º°]?(?:\s*,\s*(?P<inciso>(?-i:[IVXLCDM]+)|\d+)\b)?(?:\s+d[oa]\s+{CODE})?"
        )),
    ]
});

static LEI_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        compile(&format!(
            r"(?i)\b(?P<dl>decreto-?lei|DL)\s+{NUM_MARK}(?P<num>\d[\d.]*)(?:/(?P<year>\d{{4}}|\d{{2}})\b)?"
        )),
        compile(&format!(
            r"(?i)\b(?P<mp>medida\s+provis[óo]ria|MP)\s+{NUM_MARK}(?P<num>\d[\d.\-]*)(?:/(?P<year>\d{{4}}|\d{{2}})\b)?"
        )),
        compile(&format!(
            r"(?i)\blei\s+(?:federal\s+)?{NUM_MARK}(?P<num>\d[\d.]*)(?:/(?P<year>\d{{4}}|\d{{2}})\b)?"
        )),
    ]
});

static PROCESSO_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        compile(&format!(
            r"(?i)\b(?P<tipo>(?:Ag(?:Rg|Int)?\s+n[oa]s?\s+)?(?:AREsp|REsp|AgRg|AgInt|ADPF|ADI|ADC|ARE|RHC|HC|MS|AI|RE))\s*{NUM_MARK}(?P<num>\d[\d.]*\d|\d)(?:\s*/\s*(?P<uf>[A-Z]{{2}})\b)?"
        )),
        compile(&format!(r"(?i)\bprocesso\s+{NUM_MARK}(?P<num>\d[\d.\-]*\d)")),
        compile(&format!(
            r"(?i)\b(?P<acp>a[çc][ãa]o\s+civil\s+p[úu]blica)\s+{NUM_MARK}(?P<num>\d[\d.\-]*\d|\d)"
        )),
    ]
});

static CONCEITO_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![compile(
        r"(?i)\b(?P<term>dano\s+moral\s+in\s+re\s+ipsa|responsabilidade\s+(?:objetiva|subjetiva)|venda\s+casada|anatocismo|capitaliza[çc][ãa]o\s+de\s+juros|direito\s+l[íi]quido\s+e\s+certo|fortuito\s+interno|boa[-\s]?f[ée](?:\s+objetiva)?|juros\s+(?:morat[óo]rios|compensat[óo]rios|remunerat[óo]rios)|corre[çc][ãa]o\s+monet[áa]ria|SELIC|IPCA(?:-E)?|IGP-?M)\b",
    )]
});

static TRIBUNAL_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        compile(r"\b(?P<acr>STJ|STF|TST|TSE|STM|TRF\d|TJ[A-Z]{2})\b"),
        compile(r"(?i)\b(?P<stj>superior\s+tribunal\s+de\s+justi[çc]a)\b"),
        compile(r"(?i)\b(?P<stf>supremo\s+tribunal\s+federal)\b"),
    ]
});

/// Súmula mentions in free text, number in group 1
pub static SUMULA_REFERENCE: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)\bs[úu]mula\s+(?:n[º°.]?\s*)?(\d+)"));

/// Tema mentions in free text, number in group 1
pub static TEMA_REFERENCE: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)\btema\s+(?:repetitivo\s+)?(?:n[º°.]?\s*)?(\d+)"));

/// `art. 186 do CC`: number in group 1, code in group 2
pub static ARTICLE_REFERENCE: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)\bart\.?\s*(\d+)\s+d[oa]\s+(CC|CDC|CPC|CF)\b"));

pub(crate) fn patterns(kind: EntityKind) -> &'static [Regex] {
    match kind {
        EntityKind::Sumula => SUMULA_PATTERNS.as_slice(),
        EntityKind::Tema => TEMA_PATTERNS.as_slice(),
        EntityKind::Artigo => ARTIGO_PATTERNS.as_slice(),
        EntityKind::Lei => LEI_PATTERNS.as_slice(),
        EntityKind::Processo => PROCESSO_PATTERNS.as_slice(),
        EntityKind::Conceito => CONCEITO_PATTERNS.as_slice(),
        EntityKind::Tribunal => TRIBUNAL_PATTERNS.as_slice(),
    }
}

/// Run every pattern of `kind` over `text`, in table order.
pub(crate) fn find_candidates(kind: EntityKind, text: &str) -> Vec<Candidate> {
    let mut found = Vec::new();
    for pattern in patterns(kind) {
        for caps in pattern.captures_iter(text) {
            found.extend(capture(kind, &caps));
        }
    }
    found
}

fn capture(kind: EntityKind, caps: &Captures<'_>) -> Vec<Candidate> {
    match kind {
        EntityKind::Sumula => capture_sumula(caps).into_iter().collect(),
        EntityKind::Tema => capture_tema(caps).into_iter().collect(),
        EntityKind::Artigo => capture_artigo(caps),
        EntityKind::Lei => capture_lei(caps).into_iter().collect(),
        EntityKind::Processo => capture_processo(caps).into_iter().collect(),
        EntityKind::Conceito => capture_conceito(caps).into_iter().collect(),
        EntityKind::Tribunal => capture_tribunal(caps).into_iter().collect(),
    }
}

fn group<'t>(caps: &Captures<'t>, name: &str) -> Option<&'t str> {
    caps.name(name).map(|m| m.as_str())
}

fn capture_sumula(caps: &Captures<'_>) -> Option<Candidate> {
    let numero = group(caps, "num")?;
    if group(caps, "sv").is_some() {
        return Some(
            Candidate::spanning(
                caps,
                format!("Sumula Vinculante {}/STF", numero),
                ids::sumula_vinculante_id(numero),
            )
            .with_tribunal("STF")
            .with_number(numero),
        );
    }
    let tribunal = group(caps, "trib")
        .map(str::to_uppercase)
        .unwrap_or_else(|| ids::DEFAULT_TRIBUNAL.to_string());
    Some(
        Candidate::spanning(
            caps,
            format!("Sumula {}/{}", numero, tribunal),
            ids::sumula_id(&tribunal, numero),
        )
        .with_tribunal(tribunal)
        .with_number(numero),
    )
}

fn capture_tema(caps: &Captures<'_>) -> Option<Candidate> {
    let numero = group(caps, "num")?;
    let tribunal = group(caps, "trib")
        .map(str::to_uppercase)
        .unwrap_or_else(|| ids::DEFAULT_TRIBUNAL.to_string());
    Some(
        Candidate::spanning(caps, format!("Tema {}/{}", numero, tribunal), ids::tema_id(numero))
            .with_tribunal(tribunal)
            .with_number(numero),
    )
}

/// Map a matched code name to its canonical abbreviation.
/// Statutes cited as codes become their statute id (`LEI_8078_1990`).
pub fn canonical_code(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if let Some(caps) = LEI_AS_CODE.captures(&collapsed) {
        let numero = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        return ids::lei_id("LEI", numero, caps.get(2).map(|m| m.as_str()));
    }
    let upper = ids::strip_diacritics(&collapsed).to_uppercase();
    CODE_ALIASES
        .iter()
        .find(|(long, _)| *long == upper)
        .map(|(_, short)| short.to_string())
        .unwrap_or(upper)
}

fn artigo_label(numero: &str, inciso: Option<&str>, code: Option<&str>) -> String {
    let mut label = format!("Art. {}", numero);
    if let Some(inciso) = inciso {
        label.push_str(", ");
        label.push_str(inciso);
    }
    if let Some(code) = code {
        label.push_str(" do ");
        label.push_str(code);
    }
    label
}

fn capture_artigo(caps: &Captures<'_>) -> Vec<Candidate> {
    let Some(num) = caps.name("num") else {
        return Vec::new();
    };
    let code = group(caps, "code").map(canonical_code);

    // `§ 6º do art. 37`
    if let Some(par) = group(caps, "par") {
        let segment = format!("par{}", ids::slug(par));
        let label = format!("{}, § {}", artigo_label(num.as_str(), None, code.as_deref()), par);
        let id = ids::artigo_id(code.as_deref(), num.as_str(), Some(&segment));
        return vec![Candidate::spanning(caps, label, id)
            .with_number(num.as_str())
            .with_code(code)];
    }

    // `arts. 186 e 927 do CC`: one candidate per number, spans split at the
    // second number so the two don't overlap
    if let Some(num2) = caps.name("num2") {
        let whole = caps.get(0).map(|m| (m.start(), m.end())).unwrap_or_default();
        let mut first = Candidate::spanning(
            caps,
            artigo_label(num.as_str(), None, code.as_deref()),
            ids::artigo_id(code.as_deref(), num.as_str(), None),
        )
        .with_number(num.as_str())
        .with_code(code.clone());
        first.end = num.end();
        first.raw_value = caps[0][..num.end() - whole.0].to_string();

        let mut second = Candidate::spanning(
            caps,
            artigo_label(num2.as_str(), None, code.as_deref()),
            ids::artigo_id(code.as_deref(), num2.as_str(), None),
        )
        .with_number(num2.as_str())
        .with_code(code);
        second.start = num2.start();
        second.raw_value = caps[0][num2.start() - whole.0..].to_string();
        return vec![first, second];
    }

    let inciso = group(caps, "inciso");
    vec![Candidate::spanning(
        caps,
        artigo_label(num.as_str(), inciso, code.as_deref()),
        ids::artigo_id(code.as_deref(), num.as_str(), inciso),
    )
    .with_number(num.as_str())
    .with_code(code)]
}

fn capture_lei(caps: &Captures<'_>) -> Option<Candidate> {
    let numero = group(caps, "num")?;
    let (prefix, title) = if group(caps, "dl").is_some() {
        ("DL", "Decreto-Lei")
    } else if group(caps, "mp").is_some() {
        ("MP", "MP")
    } else {
        ("LEI", "Lei")
    };
    let year = group(caps, "year");
    let numero = numero.trim_end_matches(|c: char| c == '.' || c == '-');
    let label = match year {
        Some(year) => format!("{} {}/{}", title, numero, ids::expand_year(year)),
        None => format!("{} {}", title, numero),
    };
    Some(
        Candidate::spanning(caps, label, ids::lei_id(prefix, numero, year))
            .with_number(ids::statute_number(numero))
            .with_code(Some(prefix.to_string())),
    )
}

fn capture_processo(caps: &Captures<'_>) -> Option<Candidate> {
    let numero = group(caps, "num")?;
    let digits: String = numero.chars().filter(|c| c.is_ascii_digit()).collect();
    let tipo = if let Some(tipo) = group(caps, "tipo") {
        tipo.split_whitespace().collect::<Vec<_>>().join("_").to_uppercase()
    } else if group(caps, "acp").is_some() {
        "ACP".to_string()
    } else {
        "PROCESSO".to_string()
    };
    let uf = group(caps, "uf").map(str::to_uppercase);

    let label = match &uf {
        Some(uf) => format!("{} {}/{}", tipo.replace('_', " "), digits, uf),
        None => format!("{} {}", tipo.replace('_', " "), digits),
    };
    let id = match &uf {
        Some(uf) => format!("{}_{}_{}", tipo, digits, uf),
        None => format!("{}_{}", tipo, digits),
    };
    Some(
        Candidate::spanning(caps, label, id)
            .with_number(digits)
            .with_code(Some(tipo)),
    )
}

fn capture_conceito(caps: &Captures<'_>) -> Option<Candidate> {
    let term = group(caps, "term")?;
    let value = term.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    let id = ids::conceito_id(&value);
    Some(Candidate::spanning(caps, value, id))
}

fn capture_tribunal(caps: &Captures<'_>) -> Option<Candidate> {
    let acronym = if let Some(acr) = group(caps, "acr") {
        acr.to_string()
    } else if group(caps, "stj").is_some() {
        "STJ".to_string()
    } else if group(caps, "stf").is_some() {
        "STF".to_string()
    } else {
        return None;
    };
    let id = format!("TRIBUNAL_{}", acronym);
    Some(Candidate::spanning(caps, acronym.clone(), id).with_tribunal(acronym))
}
