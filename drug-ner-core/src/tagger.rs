//! # Esquema de Tags BIO e Alinhamento de Spans
//!
//! Define o esquema de anotação **BIO** (Beginning-Inside-Outside) e o
//! algoritmo que deriva a tag *gold* de cada token a partir dos spans de
//! entidade anotados no corpus.
//!
//! ## Tipos de Entidade (corpus DDI)
//!
//! | Tipo     | Significado                              | Exemplos                    |
//! |----------|------------------------------------------|-----------------------------|
//! | drug     | Fármaco aprovado para uso humano         | aspirin, ibuprofen          |
//! | brand    | Nome comercial                           | Advil, Tylenol              |
//! | group    | Classe ou grupo de fármacos              | NSAIDs, beta-blockers       |
//! | drug_n   | Substância não aprovada para uso humano  | MDMA, toxinas               |
//!
//! Os tipos não são fixos: qualquer string que apareça no atributo `type`
//! vira uma categoria.
//!
//! ## Esquema BIO
//!
//! - `B-TAG`: Begin, primeiro token de uma entidade
//! - `I-TAG`: Inside, tokens subsequentes da mesma entidade
//! - `O`: Outside, não é parte de nenhuma entidade

use serde::{Deserialize, Serialize};

use crate::tokenizer::Token;

/// Span de entidade anotado, em coordenadas de caractere da sentença.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpan {
    /// Primeiro caractere da entidade (inclusivo).
    pub start: usize,
    /// Último caractere da entidade (inclusivo).
    pub end: usize,
    /// Tipo da entidade (ex: "drug", "group").
    pub entity_type: String,
}

impl EntitySpan {
    pub fn new(start: usize, end: usize, entity_type: impl Into<String>) -> Self {
        Self {
            start,
            end,
            entity_type: entity_type.into(),
        }
    }
}

/// Tag BIO aplicada a um token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    /// **Begin**: o token abre a entidade. Ex: **Ibuprofen** (B-drug).
    Begin(String),
    /// **Inside**: o token está dentro da entidade, mas não a abre.
    Inside(String),
    /// **Outside**: o token não faz parte de nenhuma entidade.
    Outside,
}

impl Tag {
    /// Representação textual da tag (ex: "B-drug", "I-group", "O")
    pub fn label(&self) -> String {
        match self {
            Tag::Begin(cat) => format!("B-{cat}"),
            Tag::Inside(cat) => format!("I-{cat}"),
            Tag::Outside => "O".to_string(),
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tag::Begin(cat) => write!(f, "B-{cat}"),
            Tag::Inside(cat) => write!(f, "I-{cat}"),
            Tag::Outside => f.write_str("O"),
        }
    }
}

/// Decide a tag BIO de um token a partir dos spans da sentença.
///
/// Varre os spans **na ordem em que foram fornecidos** e para no primeiro
/// que casar:
/// - `token.start == span.start` e `token.end <= span.end` → `B-<tipo>`
/// - `token.start >= span.start` e `token.end <= span.end` → `I-<tipo>`
///
/// Quando spans se sobrepõem, vence o que aparece primeiro na lista. Um
/// token que começa dentro de um span e termina fora dele recebe `O`:
/// sobreposição parcial não conta como match.
pub fn get_tag(token: &Token, spans: &[EntitySpan]) -> Tag {
    for span in spans {
        if token.start == span.start && token.end <= span.end {
            return Tag::Begin(span.entity_type.clone());
        } else if token.start >= span.start && token.end <= span.end {
            return Tag::Inside(span.entity_type.clone());
        }
    }
    Tag::Outside
}

/// Aplica [`get_tag`] a todos os tokens da sentença.
pub fn tag_tokens(tokens: &[Token], spans: &[EntitySpan]) -> Vec<Tag> {
    tokens.iter().map(|t| get_tag(t, spans)).collect()
}
