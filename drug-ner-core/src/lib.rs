//! # drug-ner-core — Extração de Features para NER Biomédico
//!
//! Este crate transforma o corpus DDI (documentos XML com sentenças e
//! entidades farmacológicas anotadas) em uma tabela de features por token,
//! no formato aceito pelo CRFsuite para treinar um tagger BIO.
//!
//! ## Arquitetura
//!
//! O dado flui por estágios independentes:
//!
//! 1.  **Corpus** ([`corpus`]): leitura dos XML, sentenças e spans *gold*.
//! 2.  **Tokenização** ([`tokenizer`]): palavras no estilo Penn Treebank com offsets de caractere.
//! 3.  **POS** ([`pos`]): etiquetas Penn Treebank por regras.
//! 4.  **Features** ([`features`]): forma, afixos, ortografia, dicionários ([`lexicon`]) e janela ±1.
//! 5.  **Tags** ([`tagger`]): rótulo BIO de cada token a partir dos spans.
//! 6.  **Saída** ([`pipeline`]): linhas separadas por tabulação, uma sentença por bloco.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use drug_ner_core::{EntitySpan, Lexicons, Pipeline, Sentence};
//!
//! let lexicons = Lexicons::new().with_drug("ibuprofen", "drug");
//! let pipeline = Pipeline::new(lexicons);
//!
//! let sentence = Sentence {
//!     id: "d1.s0".to_string(),
//!     text: "Ibuprofen reduces fever.".to_string(),
//!     spans: vec![EntitySpan::new(0, 8, "drug")],
//! };
//!
//! let rows = pipeline.process_sentence(&sentence).unwrap();
//! print!("{rows}");
//! ```

pub mod corpus;
pub mod error;
pub mod features;
pub mod lexicon;
pub mod pipeline;
pub mod pos;
pub mod tagger;
pub mod tokenizer;

pub use corpus::{Document, Sentence};
pub use error::{AlignmentError, DocumentParseError, PipelineError, ResourceLoadError};
pub use features::FeatureVector;
pub use lexicon::{LexiconPaths, Lexicons};
pub use pipeline::{ErrorPolicy, Pipeline, PipelineConfig, RunSummary, SentenceRows};
pub use pos::{PosTagger, RuleTagger};
pub use tagger::{EntitySpan, Tag};
pub use tokenizer::{Segmenter, Token, Tokenizer};
