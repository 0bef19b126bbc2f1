//! # Tokenizador com Recuperação de Offsets
//!
//! Divide o texto de uma sentença em tokens (palavras, números, pontuações)
//! seguindo as convenções do Penn Treebank, e recupera a posição exata de cada
//! token no texto original.
//!
//! ## Duas Etapas
//!
//! 1. **Segmentação**: o texto é dividido em sentenças (fronteiras UAX #29) e
//!    cada sentença passa por uma sequência de regras de reescrita (regex) que
//!    isolam pontuação e aspas (retas ou tipográficas), separam contrações
//!    ("don't" -> "do", "n't") e o ponto final, mas preservam números ("3.5",
//!    "1,000") e palavras hifenizadas ("5-HT"). Nenhum trecho do texto é
//!    descartado, nem mesmo um segmento só de símbolos ("***").
//! 2. **Alinhamento**: cada string emitida é procurada no texto a partir do fim
//!    do token anterior. Os offsets são em **caracteres** (não bytes) e o `end`
//!    é **inclusivo**, como nos atributos `charOffset` do corpus.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use drug_ner_core::tokenizer::Tokenizer;
//!
//! let tokenizer = Tokenizer::new();
//! let tokens = tokenizer.tokenize("Ibuprofen reduces fever.").unwrap();
//!
//! // "Ibuprofen", "reduces", "fever", "."
//! assert_eq!(tokens.len(), 4);
//! assert_eq!((tokens[0].start, tokens[0].end), (0, 8));
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::error::AlignmentError;

/// Segmentador de palavras plugável.
///
/// Cada palavra emitida precisa ser uma substring literal do texto, na ordem
/// em que aparece; caso contrário o alinhamento falha com [`AlignmentError`].
pub trait Segmenter: Send + Sync {
    fn segment(&self, text: &str) -> Vec<String>;
}

/// Um token extraído do texto original.
///
/// O `Token` é imutável depois de criado: features e rótulos são sempre
/// derivados dele, nunca gravados nele.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Token {
    /// O texto do token (ex: "Ibuprofen", ",", "n't").
    pub text: String,
    /// Índice de caractere inicial no texto da sentença (inclusivo).
    pub start: usize,
    /// Índice de caractere final no texto da sentença (inclusivo).
    pub end: usize,
}

/// Abreviações cujo ponto final não deve ser separado no fim da sentença.
const ABBREVIATIONS: &[&str] = &[
    "e.g", "i.e", "etc", "vs", "approx", "fig", "figs", "ref", "refs", "dr",
    "mr", "mrs", "ms", "prof", "al", "no", "vol", "ca", "resp", "inc", "co",
];

/// Inícios de clítico: um apóstrofo antes deles não abre citação ("'s", "'nt").
const CLITIC_PREFIXES: &[&str] = &["re", "ve", "ll", "m", "t", "s", "d", "n"];

/// Contrações que o Treebank separa em duas palavras ("cannot" -> "can" "not").
const CONTRACTIONS: &[&str] = &[
    r"(?i)\b(can)(not)\b",
    r"(?i)\b(d)('ye)\b",
    r"(?i)\b(gim)(me)\b",
    r"(?i)\b(gon)(na)\b",
    r"(?i)\b(got)(ta)\b",
    r"(?i)\b(lem)(me)\b",
    r"(?i)\b(more)('n)\b",
    r"(?i)\b(wan)(na)\b",
];

/// Segmentador de palavras no estilo Penn Treebank.
///
/// As regex são compiladas uma única vez; a mesma instância pode ser
/// compartilhada entre threads (`Regex` é `Sync`).
#[derive(Debug, Clone)]
pub struct Tokenizer {
    /// Regras aplicadas antes do tratamento do ponto final.
    punctuation: Vec<(Regex, &'static str)>,
    /// Regras aplicadas depois do ponto final (parênteses, aspas, clíticos).
    trailing: Vec<(Regex, &'static str)>,
    /// Apóstrofo que abre uma citação: `'azole'`.
    opening_apostrophe: Regex,
}

impl Tokenizer {
    pub fn new() -> Self {
        let compile = |rules: &[(&str, &'static str)]| -> Vec<(Regex, &'static str)> {
            rules
                .iter()
                .map(|(pattern, replacement)| {
                    (Regex::new(pattern).expect("regra de segmentação inválida"), *replacement)
                })
                .collect()
        };

        let punctuation = compile(&[
            // Aspas de abertura tipográficas e crases
            (r"([«“‘„]|`+)", " ${1} "),
            // Aspas duplas viram tokens próprios (sem conversão para `` e '')
            (r#"""#, r#" " "#),
            // Vírgula e dois-pontos, exceto dentro de números (1,000 / 10:30)
            (r"([:,])([^\d])", " ${1} ${2}"),
            (r"([:,])$", " ${1} "),
            (r"\.\.\.", " ... "),
            (r"[;@#$%&]", " ${0} "),
        ]);

        let mut trailing = compile(&[
            (r"[?!]", " ${0} "),
            (r"[»”’]", " ${0} "),
            (r"([^'])' ", "${1} ' "),
            (r"[\]\[\(\)\{\}<>]", " ${0} "),
            (r"--", " -- "),
            (r"([^' ])('[sS]|'[mM]|'[dD]|') ", "${1} ${2} "),
            (r"([^' ])('ll|'LL|'re|'RE|'ve|'VE|n't|N'T) ", "${1} ${2} "),
        ]);
        trailing.extend(compile(
            &CONTRACTIONS
                .iter()
                .map(|pattern| (*pattern, " ${1} ${2} "))
                .collect::<Vec<_>>(),
        ));

        Self {
            punctuation,
            trailing,
            opening_apostrophe: Regex::new(r"(\s|[(\[{<«“‘„])'(\w+)")
                .expect("regra de segmentação inválida"),
        }
    }

    /// Segmenta o texto em palavras, sem offsets.
    pub fn segment(&self, text: &str) -> Vec<String> {
        text.split_sentence_bounds()
            .flat_map(|sentence| self.segment_sentence(sentence))
            .collect()
    }

    fn segment_sentence(&self, sentence: &str) -> Vec<String> {
        let mut buf = self.split_opening_apostrophe(&format!(" {sentence} "));
        for (re, replacement) in &self.punctuation {
            buf = re.replace_all(&buf, *replacement).into_owned();
        }
        buf = split_final_period(&buf);
        for (re, replacement) in &self.trailing {
            buf = re.replace_all(&buf, *replacement).into_owned();
        }
        buf.split_whitespace().map(str::to_string).collect()
    }

    /// Separa o apóstrofo que abre uma citação, preservando clíticos ("'s", "'ll").
    fn split_opening_apostrophe(&self, buf: &str) -> String {
        self.opening_apostrophe
            .replace_all(buf, |caps: &regex::Captures<'_>| {
                let word = &caps[2];
                let lower = word.to_lowercase();
                if CLITIC_PREFIXES.iter().any(|p| lower.starts_with(p)) {
                    caps[0].to_string()
                } else {
                    format!("{}' {}", &caps[1], word)
                }
            })
            .into_owned()
    }

    /// Sequência preguiçosa de tokens com offsets.
    ///
    /// A segmentação é feita de uma vez; o alinhamento acontece à medida que
    /// o iterador é consumido e para no primeiro erro.
    pub fn tokens<'a>(&self, text: &'a str) -> TokenOffsets<'a, std::vec::IntoIter<String>> {
        align_offsets(text, self.segment(text))
    }

    /// Tokeniza a sentença inteira, falhando se algum token não puder ser alinhado.
    pub fn tokenize(&self, text: &str) -> Result<Vec<Token>, AlignmentError> {
        self.tokens(text).collect()
    }
}

impl Segmenter for Tokenizer {
    fn segment(&self, text: &str) -> Vec<String> {
        Tokenizer::segment(self, text)
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Separa o ponto final da sentença ("fever." -> "fever ."), a menos que a
/// última palavra seja uma abreviação conhecida ou uma inicial ("A.").
fn split_final_period(buf: &str) -> String {
    let body = buf.trim_end();
    let closers = body.len()
        - body
            .trim_end_matches(|c| matches!(c, ']' | ')' | '}' | '>' | '"' | '\'' | '”' | '’' | '»'))
            .len();
    let (head, tail) = body.split_at(body.len() - closers);

    let Some(word) = head.strip_suffix('.') else {
        return buf.to_string();
    };
    if word.ends_with('.') {
        // "..." já foi isolado pelas regras de pontuação
        return buf.to_string();
    }
    let last = word.rsplit(char::is_whitespace).next().unwrap_or("");
    let is_initial = last.chars().count() == 1 && last.chars().all(char::is_alphabetic);
    if last.is_empty() || is_initial || ABBREVIATIONS.contains(&last.to_lowercase().as_str()) {
        return buf.to_string();
    }

    format!("{word} .{tail} ")
}

/// Alinha uma sequência de strings ao texto de onde vieram.
pub fn align_offsets<'a, I>(text: &'a str, words: I) -> TokenOffsets<'a, I::IntoIter>
where
    I: IntoIterator<Item = String>,
{
    TokenOffsets {
        text,
        words: words.into_iter(),
        byte_cursor: 0,
        char_cursor: 0,
        failed: false,
    }
}

/// Iterador que recupera `(start, end)` de cada palavra.
///
/// Mantém dois cursores sincronizados: em bytes (para fatiar a `&str`) e em
/// caracteres (para os offsets publicados).
#[derive(Debug)]
pub struct TokenOffsets<'a, I> {
    text: &'a str,
    words: I,
    byte_cursor: usize,
    char_cursor: usize,
    failed: bool,
}

impl<I> Iterator for TokenOffsets<'_, I>
where
    I: Iterator<Item = String>,
{
    type Item = Result<Token, AlignmentError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let word = self.words.next()?;
        let rest = &self.text[self.byte_cursor..];

        let Some(found) = rest.find(word.as_str()).filter(|_| !word.is_empty()) else {
            self.failed = true;
            return Some(Err(AlignmentError {
                token: word,
                cursor: self.char_cursor,
            }));
        };

        let start = self.char_cursor + rest[..found].chars().count();
        let len = word.chars().count();
        self.byte_cursor += found + word.len();
        self.char_cursor = start + len;

        Some(Ok(Token {
            text: word,
            start,
            end: start + len - 1,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(text: &str) -> Vec<String> {
        Tokenizer::new()
            .tokenize(text)
            .unwrap()
            .into_iter()
            .map(|t| t.text)
            .collect()
    }

    fn assert_offsets_hold(text: &str) {
        let tokens = Tokenizer::new().tokenize(text).unwrap();
        let chars: Vec<char> = text.chars().collect();
        for t in &tokens {
            let slice: String = chars[t.start..=t.end].iter().collect();
            assert_eq!(slice, t.text);
        }
        for pair in tokens.windows(2) {
            assert!(pair[0].end < pair[1].start);
        }
    }

    #[test]
    fn test_tokenize_basic_sentence() {
        let tokens = Tokenizer::new().tokenize("Ibuprofen reduces fever.").unwrap();
        let spans: Vec<(&str, usize, usize)> =
            tokens.iter().map(|t| (t.text.as_str(), t.start, t.end)).collect();
        assert_eq!(
            spans,
            vec![("Ibuprofen", 0, 8), ("reduces", 10, 16), ("fever", 18, 22), (".", 23, 23)]
        );
    }

    #[test]
    fn test_punctuation_and_parentheses_are_isolated() {
        assert_eq!(
            texts("Serotonin (5-HT) levels; see Table 2."),
            vec!["Serotonin", "(", "5-HT", ")", "levels", ";", "see", "Table", "2", "."]
        );
    }

    #[test]
    fn test_numbers_stay_intact() {
        assert_eq!(
            texts("Doses of 1,000 mg and 3.5 mg, twice daily."),
            vec!["Doses", "of", "1,000", "mg", "and", "3.5", "mg", ",", "twice", "daily", "."]
        );
    }

    #[test]
    fn test_contractions_are_split() {
        assert_eq!(
            texts("It doesn't interact and cannot be dialyzed."),
            vec!["It", "does", "n't", "interact", "and", "can", "not", "be", "dialyzed", "."]
        );
    }

    #[test]
    fn test_abbreviation_keeps_final_period() {
        let words = texts("Avoid NSAIDs, aspirin etc.");
        assert_eq!(words.last().map(String::as_str), Some("etc."));
    }

    #[test]
    fn test_quotes_are_literal_tokens() {
        assert_eq!(
            texts("the \"azole\" antifungals"),
            vec!["the", "\"", "azole", "\"", "antifungals"]
        );
        assert_offsets_hold("the \"azole\" antifungals");
    }

    #[test]
    fn test_curly_quotes_are_split_off() {
        let text = "Avoid “warfarin” with NSAIDs.";
        assert_eq!(
            texts(text),
            vec!["Avoid", "“", "warfarin", "”", "with", "NSAIDs", "."]
        );
        let tokens = Tokenizer::new().tokenize(text).unwrap();
        assert_eq!((tokens[2].start, tokens[2].end), (7, 14));
        assert_offsets_hold(text);
    }

    #[test]
    fn test_guillemets_and_low_quotes() {
        assert_eq!(
            texts("„Heparin” and «digoxin»"),
            vec!["„", "Heparin", "”", "and", "«", "digoxin", "»"]
        );
        assert_offsets_hold("„Heparin” and «digoxin»");
    }

    #[test]
    fn test_single_quotes_open_and_close() {
        assert_eq!(
            texts("Avoid 'azole' antifungals."),
            vec!["Avoid", "'", "azole", "'", "antifungals", "."]
        );
        assert_eq!(
            texts("the ‘azole’ group"),
            vec!["the", "‘", "azole", "’", "group"]
        );
        assert_offsets_hold("Avoid 'azole' antifungals.");
    }

    #[test]
    fn test_clitic_apostrophe_is_not_an_opening_quote() {
        assert_eq!(
            texts("Parkinson 's disease"),
            vec!["Parkinson", "'s", "disease"]
        );
    }

    #[test]
    fn test_quote_after_final_period() {
        assert_eq!(
            texts("He said “stop.”"),
            vec!["He", "said", "“", "stop", ".", "”"]
        );
    }

    #[test]
    fn test_symbol_only_segments_are_kept() {
        assert_eq!(
            texts("Monitor INR closely. ***"),
            vec!["Monitor", "INR", "closely", ".", "***"]
        );
        assert_eq!(texts("---"), vec!["--", "-"]);
        assert_offsets_hold("Monitor INR closely. ***");
        assert_offsets_hold("---");
    }

    #[test]
    fn test_offsets_are_characters_not_bytes() {
        let tokens = Tokenizer::new().tokenize("β-blockers and α-agonists").unwrap();
        assert_eq!((tokens[0].start, tokens[0].end), (0, 9));
        assert_eq!((tokens[2].start, tokens[2].end), (15, 24));
        assert_offsets_hold("β-blockers and α-agonists");
    }

    #[test]
    fn test_offsets_hold_across_sentences() {
        assert_offsets_hold(
            "Cimetidine inhibits CYP3A4. Therefore, midazolam levels rise (by ~30%)!  Monitor it.",
        );
    }

    #[test]
    fn test_empty_text_has_no_tokens() {
        assert!(Tokenizer::new().tokenize("").unwrap().is_empty());
        assert!(Tokenizer::new().tokenize("   ").unwrap().is_empty());
    }

    #[test]
    fn test_alignment_error_on_virtual_token() {
        let words = vec!["aspirin".to_string(), "``".to_string()];
        let result: Result<Vec<Token>, AlignmentError> =
            align_offsets("aspirin \"x\"", words).collect();
        let err = result.unwrap_err();
        assert_eq!(err.token, "``");
        assert_eq!(err.cursor, 7);
    }

    #[test]
    fn test_alignment_stops_after_error() {
        let words = vec!["zzz".to_string(), "a".to_string()];
        let mut it = align_offsets("a b", words);
        assert!(matches!(it.next(), Some(Err(_))));
        assert!(it.next().is_none());
    }

    #[test]
    fn test_alignment_searches_forward_only() {
        let words = vec!["a".to_string(), "a".to_string()];
        let tokens: Vec<Token> = align_offsets("a a", words).map(Result::unwrap).collect();
        assert_eq!(tokens[1].start, 2);
    }
}
