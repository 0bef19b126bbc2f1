//! # Engenharia de Features para NER de Fármacos
//!
//! Para cada token, produz uma lista **ordenada** de features `nome=valor`
//! no formato esperado pelo treinador CRFsuite. A ordem não muda o
//! aprendizado, mas é fixa para facilitar a leitura e a comparação de saídas.
//!
//! ## Features Implementadas
//!
//! ### Token atual
//! - Forma literal (`form=`), sufixos e prefixos de 3 a 5 caracteres
//! - Comprimento em caracteres
//! - Etiqueta morfossintática (`posTags=`), calculada uma vez para a sentença inteira
//! - Formato: contém dígito, contém hífen, tudo maiúsculo, título, primeira maiúscula
//!
//! ### Dicionários externos
//! - `InDrugBank=` (sem diferenciar maiúsculas) e, se presente, `type=<categoria>`
//! - `inHSDB=` (comparação exata)
//!
//! ### Contexto
//! - Forma, sufixo de 3 e comprimento do token anterior e do seguinte
//! - `BoS` / `EoS` quando não há vizinho
//!
//! Valores booleanos são serializados como `True` / `False`.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::lexicon::Lexicons;
use crate::pos::PosTagger;
use crate::tokenizer::Token;

/// Marcador de início de sentença (token sem anterior).
pub const BOS: &str = "BoS";
/// Marcador de fim de sentença (token sem seguinte).
pub const EOS: &str = "EoS";

/// Etiqueta usada quando o etiquetador POS não cobre o token.
pub const FALLBACK_POS: &str = "NN";

/// Dígito decimal (categoria Unicode Nd); "²" e "½" não contam.
fn decimal_digit() -> &'static Regex {
    static DIGIT: OnceLock<Regex> = OnceLock::new();
    DIGIT.get_or_init(|| Regex::new(r"\d").expect("regex de dígito inválida"))
}

/// Features de um token, na ordem em que serão escritas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Ex: `["form=Aspirin", "suf3=rin", ..., "EoS"]`.
    pub features: Vec<String>,
    /// Índice do token original na sentença.
    pub token_index: usize,
}

impl FeatureVector {
    pub fn new(token_index: usize) -> Self {
        Self {
            features: Vec::new(),
            token_index,
        }
    }

    /// Adiciona uma feature `name=value`.
    pub fn push(&mut self, name: &str, value: impl fmt::Display) {
        self.features.push(format!("{name}={value}"));
    }

    /// Adiciona uma feature booleana (`True` / `False`).
    pub fn push_flag(&mut self, name: &str, value: bool) {
        self.push(name, if value { "True" } else { "False" });
    }

    /// Adiciona um marcador sem valor (`BoS`, `EoS`).
    pub fn push_marker(&mut self, marker: &str) {
        self.features.push(marker.to_string());
    }

    pub fn contains(&self, feature: &str) -> bool {
        self.features.iter().any(|f| f == feature)
    }

    /// Valor da primeira feature com esse nome.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.features
            .iter()
            .find_map(|f| f.strip_prefix(name)?.strip_prefix('='))
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl fmt::Display for FeatureVector {
    /// Features separadas por tabulação, como na linha de saída.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, feature) in self.features.iter().enumerate() {
            if i > 0 {
                f.write_str("\t")?;
            }
            f.write_str(feature)?;
        }
        Ok(())
    }
}

/// Gera vetores de features para toda a sequência de tokens.
///
/// A etiquetagem POS roda **uma vez** sobre a sentença inteira antes da
/// composição por token, porque a etiqueta de um token depende dos vizinhos.
///
/// # Retorno
/// Um `FeatureVector` por token, na mesma ordem. Para uma sentença de um só
/// token, o vetor carrega tanto `BoS` quanto `EoS`.
pub fn extract_features(
    tokens: &[Token],
    tagger: &dyn PosTagger,
    lexicons: &Lexicons,
) -> Vec<FeatureVector> {
    let words: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
    let mut pos_tags = tagger.tag(&words);
    if pos_tags.len() != tokens.len() {
        warn!(
            tokens = tokens.len(),
            tags = pos_tags.len(),
            "etiquetador POS devolveu quantidade errada de tags; ajustando com {FALLBACK_POS}"
        );
        pos_tags.resize(tokens.len(), FALLBACK_POS);
    }

    (0..tokens.len())
        .map(|i| extract_for_token(tokens, i, &pos_tags, lexicons))
        .collect()
}

/// Extrai as features de um único token em seu contexto.
///
/// `pos_tags` deve ter uma etiqueta por token; um índice sem etiqueta recebe
/// [`FALLBACK_POS`].
pub fn extract_for_token(
    tokens: &[Token],
    i: usize,
    pos_tags: &[&str],
    lexicons: &Lexicons,
) -> FeatureVector {
    let mut fv = FeatureVector::new(i);
    let t = tokens[i].text.as_str();

    // === Forma e afixos ===
    fv.push("form", t);
    fv.push("suf3", suffix(t, 3));
    fv.push("suf4", suffix(t, 4));
    fv.push("suf5", suffix(t, 5));
    fv.push("pre3", prefix(t, 3));
    fv.push("pre4", prefix(t, 4));
    fv.push("pre5", prefix(t, 5));
    fv.push("length", t.chars().count());
    fv.push("posTags", pos_tags.get(i).copied().unwrap_or(FALLBACK_POS));

    // === Formato ===
    fv.push_flag("containNumber", decimal_digit().is_match(t));
    fv.push_flag("hasDash", t.contains('-'));
    fv.push_flag("allUpper", is_all_upper(t));
    fv.push_flag("isTitle", is_title(t));
    fv.push_flag("isFirstUpper", t.chars().next().is_some_and(char::is_uppercase));

    // === Dicionários ===
    match lexicons.drug_category(t) {
        Some(category) => {
            fv.push_flag("InDrugBank", true);
            fv.push("type", category);
        }
        None => fv.push_flag("InDrugBank", false),
    }
    fv.push_flag("inHSDB", lexicons.in_hsdb(t));

    // === Contexto ===
    if i > 0 {
        let prev = tokens[i - 1].text.as_str();
        fv.push("formPrev", prev);
        fv.push("suf3Prev", suffix(prev, 3));
        fv.push("lengthPrev", prev.chars().count());
    } else {
        fv.push_marker(BOS);
    }

    if i + 1 < tokens.len() {
        let next = tokens[i + 1].text.as_str();
        fv.push("formNext", next);
        fv.push("suf3Next", suffix(next, 3));
        fv.push("lengthNext", next.chars().count());
    } else {
        fv.push_marker(EOS);
    }

    fv
}

/// Últimos `n` caracteres (o token inteiro se for mais curto).
fn suffix(word: &str, n: usize) -> &str {
    match word.char_indices().rev().nth(n - 1) {
        Some((idx, _)) => &word[idx..],
        None => word,
    }
}

/// Primeiros `n` caracteres (o token inteiro se for mais curto).
fn prefix(word: &str, n: usize) -> &str {
    match word.char_indices().nth(n) {
        Some((idx, _)) => &word[..idx],
        None => word,
    }
}

/// Há ao menos uma letra com caixa e nenhuma minúscula ("NSAID", "5-HT").
fn is_all_upper(word: &str) -> bool {
    word.chars().any(char::is_uppercase) && !word.chars().any(char::is_lowercase)
}

/// Maiúscula seguida de uma sequência de minúsculas ("Aspirin").
fn is_title(word: &str) -> bool {
    let mut chars = word.chars();
    chars.next().is_some_and(|c| c.is_ascii_uppercase())
        && chars.clone().next().is_some()
        && chars.all(|c| c.is_ascii_lowercase())
}
