//! # Etiquetador Morfossintático (POS) por Regras
//!
//! Atribui etiquetas do Penn Treebank (`NN`, `VBZ`, `JJ`, ...) a todos os
//! tokens de uma sentença **de uma só vez**. A etiqueta de um token pode
//! depender dos vizinhos ("to **reduce**" é `VB`, "an **increase**" é `NN`),
//! então etiquetar tokens isoladamente mudaria o resultado.
//!
//! ## Como funciona
//!
//! 1. **Etiquetagem inicial**: pontuação, números, um léxico de palavras
//!    funcionais (determinantes, preposições, auxiliares...), um léxico de
//!    verbos frequentes em bulas e artigos biomédicos, sufixos ("-tion" → NN,
//!    "-ous" → JJ, "-ly" → RB) e maiúsculas (→ NNP).
//! 2. **Reescrita contextual** (estilo Brill): uma passada da esquerda para a
//!    direita corrige etiquetas olhando para o token anterior e o seguinte.

use std::collections::HashMap;

/// Etiquetador de sentenças inteiras.
///
/// Implementações devem devolver exatamente uma etiqueta por palavra, na
/// mesma ordem. `Send + Sync` permite compartilhar o etiquetador entre as
/// threads do pipeline.
pub trait PosTagger: Send + Sync {
    fn tag(&self, words: &[&str]) -> Vec<&'static str>;
}

/// Palavras de classe fechada e suas etiquetas.
const CLOSED_CLASS: &[(&str, &str)] = &[
    ("the", "DT"), ("a", "DT"), ("an", "DT"), ("this", "DT"), ("these", "DT"),
    ("those", "DT"), ("each", "DT"), ("every", "DT"), ("no", "DT"), ("some", "DT"),
    ("any", "DT"), ("all", "DT"), ("both", "DT"), ("another", "DT"), ("either", "DT"),
    ("neither", "DT"),
    ("of", "IN"), ("in", "IN"), ("on", "IN"), ("with", "IN"), ("by", "IN"),
    ("for", "IN"), ("from", "IN"), ("at", "IN"), ("as", "IN"), ("during", "IN"),
    ("after", "IN"), ("before", "IN"), ("between", "IN"), ("into", "IN"),
    ("through", "IN"), ("than", "IN"), ("because", "IN"), ("if", "IN"),
    ("whether", "IN"), ("while", "IN"), ("although", "IN"), ("since", "IN"),
    ("without", "IN"), ("within", "IN"), ("among", "IN"), ("against", "IN"),
    ("via", "IN"), ("per", "IN"), ("upon", "IN"), ("under", "IN"), ("over", "IN"),
    ("about", "IN"), ("that", "IN"), ("following", "VBG"), ("due", "JJ"),
    ("and", "CC"), ("or", "CC"), ("but", "CC"), ("nor", "CC"), ("&", "CC"),
    ("to", "TO"),
    ("may", "MD"), ("might", "MD"), ("can", "MD"), ("could", "MD"), ("should", "MD"),
    ("would", "MD"), ("will", "MD"), ("shall", "MD"), ("must", "MD"), ("ca", "MD"),
    ("it", "PRP"), ("they", "PRP"), ("he", "PRP"), ("she", "PRP"), ("we", "PRP"),
    ("i", "PRP"), ("you", "PRP"), ("them", "PRP"), ("him", "PRP"), ("us", "PRP"),
    ("its", "PRP$"), ("their", "PRP$"), ("his", "PRP$"), ("her", "PRP$"),
    ("our", "PRP$"), ("your", "PRP$"), ("my", "PRP$"),
    ("which", "WDT"), ("who", "WP"), ("whom", "WP"), ("what", "WP"),
    ("when", "WRB"), ("where", "WRB"), ("how", "WRB"), ("why", "WRB"),
    ("there", "EX"),
    ("not", "RB"), ("n't", "RB"), ("also", "RB"), ("very", "RB"), ("only", "RB"),
    ("however", "RB"), ("therefore", "RB"), ("thus", "RB"), ("often", "RB"),
    ("well", "RB"), ("further", "RB"), ("then", "RB"), ("too", "RB"),
    ("is", "VBZ"), ("has", "VBZ"), ("does", "VBZ"),
    ("are", "VBP"), ("have", "VBP"), ("do", "VBP"), ("'re", "VBP"), ("'ve", "VBP"),
    ("was", "VBD"), ("were", "VBD"), ("had", "VBD"), ("did", "VBD"),
    ("be", "VB"), ("been", "VBN"), ("being", "VBG"),
    ("'s", "POS"), ("more", "JJR"), ("less", "JJR"), ("most", "JJS"), ("least", "JJS"),
    ("such", "JJ"), ("other", "JJ"), ("several", "JJ"), ("many", "JJ"), ("same", "JJ"),
    ("one", "CD"), ("two", "CD"), ("three", "CD"), ("four", "CD"), ("five", "CD"),
    ("six", "CD"), ("seven", "CD"), ("eight", "CD"), ("nine", "CD"), ("ten", "CD"),
];

/// Verbos (forma base) comuns em descrições de interações medicamentosas.
const VERB_LEMMAS: &[&str] = &[
    "increase", "decrease", "reduce", "inhibit", "induce", "occur", "interact",
    "cause", "enhance", "potentiate", "affect", "result", "produce", "alter",
    "prolong", "elevate", "lower", "raise", "administer", "use", "take", "monitor",
    "avoid", "require", "exhibit", "show", "contain", "metabolize", "antagonize",
    "block", "bind", "appear", "suggest", "include", "observe", "report", "recommend",
    "diminish", "attenuate", "treat", "receive", "lead", "displace", "impair",
    "decline", "exceed", "coadminister", "combine", "accelerate", "delay",
];

/// Sufixos de classes abertas, testados em ordem.
const SUFFIXES: &[(&str, &str)] = &[
    ("ly", "RB"), ("ness", "NN"), ("ment", "NN"), ("tion", "NN"), ("sion", "NN"),
    ("ity", "NN"), ("ism", "NN"), ("ance", "NN"), ("ence", "NN"), ("ous", "JJ"),
    ("ful", "JJ"), ("ive", "JJ"), ("able", "JJ"), ("ible", "JJ"), ("ic", "JJ"),
    ("al", "JJ"), ("ary", "JJ"), ("less", "JJ"), ("est", "JJS"), ("ize", "VB"),
    ("ise", "VB"), ("ing", "VBG"), ("ed", "VBN"),
];

const BE_HAVE: &[&str] = &[
    "is", "are", "was", "were", "be", "been", "being", "has", "have", "had", "'s", "'re", "'ve",
];

const NOMINAL: &[&str] = &["NN", "NNS", "NNP", "NNPS", "PRP", "CD"];
const PRENOMINAL: &[&str] = &["DT", "PRP$", "JJ", "CD", "POS"];

/// Etiquetador baseado em léxicos, sufixos e regras de contexto.
#[derive(Debug, Clone)]
pub struct RuleTagger {
    closed_class: HashMap<&'static str, &'static str>,
}

impl RuleTagger {
    pub fn new() -> Self {
        Self {
            closed_class: CLOSED_CLASS.iter().copied().collect(),
        }
    }

    /// Etiqueta de um token sem olhar o contexto.
    fn initial_tag(&self, word: &str, index: usize) -> &'static str {
        if let Some(tag) = punctuation_tag(word) {
            return tag;
        }
        if is_number(word) {
            return "CD";
        }

        let lower = word.to_lowercase();
        let first_upper = word.chars().next().is_some_and(char::is_uppercase);
        let all_caps = word.chars().filter(|c| c.is_alphabetic()).count() > 1
            && !word.chars().any(char::is_lowercase);

        if let Some(&tag) = self.closed_class.get(lower.as_str()) {
            if !(all_caps && index > 0) {
                return tag;
            }
        }

        let open = open_class_tag(&lower, index);
        if first_upper && (index > 0 || open.is_none()) {
            // Siglas no plural: "NSAIDs", "MAOIs"
            if word
                .strip_suffix('s')
                .is_some_and(|stem| stem.chars().all(|c| !c.is_lowercase()))
            {
                return "NNPS";
            }
            return "NNP";
        }
        open.unwrap_or("NN")
    }
}

impl Default for RuleTagger {
    fn default() -> Self {
        Self::new()
    }
}

impl PosTagger for RuleTagger {
    fn tag(&self, words: &[&str]) -> Vec<&'static str> {
        let mut tags: Vec<&'static str> = words
            .iter()
            .enumerate()
            .map(|(i, w)| self.initial_tag(w, i))
            .collect();
        let lower: Vec<String> = words.iter().map(|w| w.to_lowercase()).collect();

        for i in 0..tags.len() {
            let prev = i.checked_sub(1).map(|p| tags[p]);
            let next = tags.get(i + 1).copied();
            let after_aux = i
                .checked_sub(1)
                .map(|p| {
                    BE_HAVE.contains(&lower[p].as_str())
                        || (tags[p] == "RB"
                            && p.checked_sub(1).is_some_and(|pp| BE_HAVE.contains(&lower[pp].as_str())))
                })
                .unwrap_or(false);

            tags[i] = match (tags[i], prev) {
                // "to reduce", "may increase"
                ("VBP" | "NN" | "VB", Some("TO" | "MD")) => "VB",
                // "an increase in", "the use of"
                ("VBP" | "VB", Some(p)) if PRENOMINAL.contains(&p) || p == "IN" => "NN",
                ("VBZ", Some(p)) if PRENOMINAL.contains(&p) => "NNS",
                // "was increased", "has been reported"
                ("VBN" | "VBD", _) if after_aux => "VBN",
                // "the increased risk"
                ("VBN", Some("DT" | "PRP$")) => "JJ",
                // "Cimetidine inhibited ..."
                ("VBN", Some(p)) if NOMINAL.contains(&p) && p != "CD" => "VBD",
                // sujeito nominal + "-s" desconhecido + objeto: "X lowers the dose"
                ("NNS", Some("NNP" | "NNPS" | "PRP"))
                    if next.is_some_and(|n| matches!(n, "DT" | "NN" | "NNS" | "JJ" | "PRP$" | "CD")) =>
                {
                    "VBZ"
                }
                // "the dose that is ..."
                ("IN", Some("NN" | "NNS"))
                    if lower[i] == "that"
                        && next.is_some_and(|n| matches!(n, "VBZ" | "VBP" | "VBD" | "MD")) =>
                {
                    "WDT"
                }
                ("VBG", Some("DT")) => "NN",
                (tag, _) => tag,
            };
        }

        tags
    }
}

fn punctuation_tag(word: &str) -> Option<&'static str> {
    let tag = match word {
        "." | "!" | "?" => ".",
        "," => ",",
        ":" | ";" | "..." | "--" | "-" => ":",
        "(" | "[" | "{" | "<" => "(",
        ")" | "]" | "}" | ">" => ")",
        "\"" | "''" => "''",
        "``" => "``",
        "$" => "$",
        "#" => "#",
        "%" => "NN",
        _ if !word.is_empty() && word.chars().all(|c| !c.is_alphanumeric()) => "SYM",
        _ => return None,
    };
    Some(tag)
}

fn is_number(word: &str) -> bool {
    let body = word.trim_start_matches(|c| matches!(c, '+' | '-' | '~' | '±'));
    !body.is_empty()
        && body.chars().next().is_some_and(|c| c.is_ascii_digit())
        && body
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '/' | ':'))
}

/// Etiqueta por léxico de verbos ou por sufixo; `None` se nada casar.
fn open_class_tag(lower: &str, index: usize) -> Option<&'static str> {
    if let Some(tag) = verb_form(lower) {
        return Some(if tag == "VBP" && index == 0 { "VB" } else { tag });
    }
    for &(suffix, tag) in SUFFIXES {
        if lower.len() > suffix.len() + 2 && lower.ends_with(suffix) {
            return Some(tag);
        }
    }
    let plural = lower.len() > 3
        && lower.ends_with('s')
        && !["ss", "us", "is"].iter().any(|s| lower.ends_with(s));
    plural.then_some("NNS")
}

/// Reconhece flexões dos verbos de [`VERB_LEMMAS`].
fn verb_form(lower: &str) -> Option<&'static str> {
    if VERB_LEMMAS.contains(&lower) {
        return Some("VBP");
    }
    for (suffix, tag) in [("s", "VBZ"), ("es", "VBZ"), ("d", "VBN"), ("ed", "VBN"), ("ing", "VBG")] {
        let Some(stem) = lower.strip_suffix(suffix) else {
            continue;
        };
        let with_e = format!("{stem}e");
        let undoubled = stem
            .char_indices()
            .last()
            .filter(|&(i, c)| stem[..i].ends_with(c))
            .map(|(i, _)| &stem[..i]);
        let candidates = [Some(stem), Some(with_e.as_str()), undoubled];
        if candidates.into_iter().flatten().any(|c| VERB_LEMMAS.contains(&c)) {
            return Some(tag);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(sentence: &str) -> Vec<&'static str> {
        let words: Vec<&str> = sentence.split_whitespace().collect();
        RuleTagger::new().tag(&words)
    }

    #[test]
    fn test_simple_drug_sentence() {
        assert_eq!(tag("Ibuprofen reduces fever ."), vec!["NNP", "VBZ", "NN", "."]);
    }

    #[test]
    fn test_one_tag_per_word() {
        let words = ["Concomitant", "use", "of", "NSAIDs", "(", "e.g", ")", "is", "not", "advised", "."];
        assert_eq!(RuleTagger::new().tag(&words).len(), words.len());
        assert!(RuleTagger::new().tag(&[]).is_empty());
    }

    #[test]
    fn test_base_verb_after_to_and_modal() {
        let tags = tag("patients may increase the dose to reduce pain");
        assert_eq!(tags[2], "VB");
        assert_eq!(tags[6], "VB");
        assert_eq!(tags[3], "DT");
    }

    #[test]
    fn test_same_word_depends_on_context() {
        assert_eq!(tag("an increase in levels")[1], "NN");
        assert_eq!(tag("drugs increase levels")[1], "VBP");
    }

    #[test]
    fn test_participles() {
        assert_eq!(tag("levels were increased")[2], "VBN");
        assert_eq!(tag("levels were not increased")[3], "VBN");
        assert_eq!(tag("the increased risk")[1], "JJ");
        assert_eq!(tag("cimetidine inhibited clearance")[1], "VBD");
    }

    #[test]
    fn test_numbers_and_symbols() {
        let tags = tag("10 mg ( 1,000 units ) ~30 %");
        assert_eq!(tags[0], "CD");
        assert_eq!(tags[2], "(");
        assert_eq!(tags[3], "CD");
        assert_eq!(tags[5], ")");
        assert_eq!(tags[6], "CD");
        assert_eq!(tags[7], "NN");
    }

    #[test]
    fn test_capitalized_and_acronyms() {
        let tags = tag("Avoid NSAIDs with Warfarin");
        assert_eq!(tags[0], "VB");
        assert_eq!(tags[1], "NNPS");
        assert_eq!(tags[3], "NNP");
    }

    #[test]
    fn test_suffix_heuristics() {
        let tags = tag("significant hepatic toxicity occurred rapidly");
        assert_eq!(tags[1], "JJ");
        assert_eq!(tags[2], "NN");
        assert_eq!(tags[3], "VBD");
        assert_eq!(tags[4], "RB");
    }

    #[test]
    fn test_verb_inflections() {
        assert_eq!(verb_form("inhibits"), Some("VBZ"));
        assert_eq!(verb_form("reducing"), Some("VBG"));
        assert_eq!(verb_form("occurred"), Some("VBN"));
        assert_eq!(verb_form("potentiated"), Some("VBN"));
        assert_eq!(verb_form("aspirin"), None);
    }
}
