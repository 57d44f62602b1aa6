//! Deterministic node identity.
//!
//! Every node id is a pure function of the entity's identifying fields, so
//! the Builder, the Recognizer and the Discoverer's fixed tables all agree
//! on the id of the same legal entity.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Tribunal assumed when a reference names none.
pub const DEFAULT_TRIBUNAL: &str = "STJ";

/// Decompose to base letters + combining marks and drop the marks.
pub fn strip_diacritics(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// `STJ_297`, `STF_SV61`
pub fn sumula_id(tribunal: &str, numero: &str) -> String {
    format!("{}_{}", tribunal.trim().to_uppercase(), numero.trim())
}

/// Súmula Vinculante ids live under STF with an `SV` prefix on the number,
/// so `SV 61` and the STJ's súmula 61 never share an id.
pub fn sumula_vinculante_id(numero: &str) -> String {
    format!("STF_SV{}", numero.trim())
}

/// `TEMA_1368`. The tribunal is not part of the id.
pub fn tema_id(numero: &str) -> String {
    format!("TEMA_{}", numero.trim())
}

/// `DOMINIO_direito_bancario`
pub fn dominio_id(name: &str) -> String {
    format!("DOMINIO_{}", name.trim())
}

/// `ARTIGO_CC_Art186`, `ARTIGO_CF_Art5_LXIX`, or `ARTIGO_Art14` when no
/// code is known.
pub fn artigo_id(code: Option<&str>, numero: &str, inciso: Option<&str>) -> String {
    let mut id = String::from("ARTIGO_");
    if let Some(code) = code.filter(|c| !c.is_empty()) {
        id.push_str(code);
        id.push('_');
    }
    id.push_str("Art");
    id.push_str(numero.trim());
    if let Some(inciso) = inciso.filter(|i| !i.is_empty()) {
        id.push('_');
        id.push_str(inciso.trim());
    }
    id
}

/// `CONCEITO_dano_moral_in_re_ipsa`
pub fn conceito_id(name: &str) -> String {
    format!("CONCEITO_{}", slug(name))
}

/// Statute ids: `LEI_8078_1990`, or `LEI_8078` when the year is absent.
pub fn lei_id(prefix: &str, numero: &str, ano: Option<&str>) -> String {
    let numero = statute_number(numero);
    match ano {
        Some(ano) => format!("{}_{}_{}", prefix, numero, expand_year(ano)),
        None => format!("{}_{}", prefix, numero),
    }
}

/// Lowercase, unaccented, words joined by `_`.
pub fn slug(name: &str) -> String {
    strip_diacritics(name)
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Drop thousands separators; hyphenated suffixes (`2.170-36`) become `_`.
pub fn statute_number(raw: &str) -> String {
    raw.trim_matches(|c: char| c == '.' || c == '-')
        .replace('.', "")
        .replace('-', "_")
}

/// Two-digit years pivot at 50: `90` → `1990`, `09` → `2009`.
/// Anything else is returned unchanged.
pub fn expand_year(ano: &str) -> String {
    if ano.len() == 2 {
        if let Ok(yy) = ano.parse::<u32>() {
            return if yy >= 50 {
                format!("19{:02}", yy)
            } else {
                format!("20{:02}", yy)
            };
        }
    }
    ano.to_string()
}

/// Resolve a súmula reference as written in curated domain lists.
///
/// `"297"` → `STJ_297`, `"SV-61"`/`"SV61"` → `STF_SV61`,
/// `"297-STF"`/`"STF-297"` → `STF_297`. Anything else is taken as an STJ
/// number.
pub fn sumula_ref_id(reference: &str) -> Option<String> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }
    if reference.chars().all(|c| c.is_ascii_digit()) {
        return Some(sumula_id(DEFAULT_TRIBUNAL, reference));
    }

    let upper = reference.to_uppercase();
    if let Some(rest) = upper.strip_prefix("SV") {
        let numero = rest.trim_start_matches(|c: char| c == '-' || c.is_whitespace());
        if !numero.is_empty() {
            return Some(sumula_vinculante_id(numero));
        }
    }

    if let Some((left, right)) = upper.split_once('-') {
        let (left, right) = (left.trim(), right.trim());
        if left.chars().all(|c| c.is_ascii_digit()) {
            return Some(sumula_id(right, left));
        }
        return Some(sumula_id(left, right));
    }

    Some(sumula_id(DEFAULT_TRIBUNAL, reference))
}
