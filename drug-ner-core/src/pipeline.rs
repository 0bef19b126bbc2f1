//! # Pipeline de Extração — do Diretório XML à Tabela de Features
//!
//! O pipeline coordena todos os módulos para cada sentença:
//!
//! 1. **Tokenização** ([`crate::tokenizer`]) com offsets de caractere.
//! 2. **POS + Features** ([`crate::pos`], [`crate::features`]) usando os léxicos injetados.
//! 3. **Tag gold** ([`crate::tagger::tag_tokens`]) a partir dos spans anotados.
//! 4. **Serialização** de uma linha por token e uma linha em branco por sentença:
//!
//! ```text
//! <id>\t<token>\t<início>\t<fim>\t<tag>\t<feature1>\t...\t<featureN>
//! ```
//!
//! Os documentos são processados em paralelo com `rayon`, mas a saída sai
//! sempre na ordem dos arquivos. Léxicos, tokenizador e etiquetador são
//! construídos antes e apenas lidos pelas threads.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::corpus::{list_documents, parse_document, Document, Sentence};
use crate::error::{AlignmentError, PipelineError, ResourceLoadError};
use crate::features::{extract_features, FeatureVector};
use crate::lexicon::{LexiconPaths, Lexicons};
use crate::pos::{PosTagger, RuleTagger};
use crate::tagger::{tag_tokens, Tag};
use crate::tokenizer::{align_offsets, Segmenter, Token, Tokenizer};

/// O que fazer quando um documento ou sentença não pode ser processado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// **Abortar** a execução inteira no primeiro erro (padrão).
    #[default]
    Abort,
    /// **Pular** o documento (ou a sentença) com erro, registrando um aviso.
    Skip,
}

/// Configuração do driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Diretório com `HSDB.txt` e `DrugBank.txt`.
    pub resources_dir: PathBuf,
    pub error_policy: ErrorPolicy,
}

impl PipelineConfig {
    pub fn lexicon_paths(&self) -> LexiconPaths {
        LexiconPaths::in_dir(&self.resources_dir)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            resources_dir: PathBuf::from("resources"),
            error_policy: ErrorPolicy::Abort,
        }
    }
}

/// Uma linha da saída: token, tag gold e features.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub token: Token,
    pub tag: Tag,
    pub features: FeatureVector,
}

/// Todas as linhas de uma sentença.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceRows {
    pub sentence_id: String,
    pub rows: Vec<FeatureRow>,
}

impl fmt::Display for SentenceRows {
    /// Uma linha por token e a linha em branco que fecha a sentença.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            writeln!(
                f,
                "{}\t{}\t{}\t{}\t{}\t{}",
                self.sentence_id, row.token.text, row.token.start, row.token.end, row.tag, row.features
            )?;
        }
        writeln!(f)
    }
}

/// Escreve as linhas da sentença seguidas da linha em branco.
///
/// Uma sentença sem tokens produz só a linha em branco.
pub fn write_sentence(out: &mut impl Write, rows: &SentenceRows) -> std::io::Result<()> {
    write!(out, "{rows}")
}

/// Contadores de uma execução completa.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub documents: usize,
    pub sentences: usize,
    pub tokens: usize,
    pub skipped_documents: usize,
    pub skipped_sentences: usize,
}

/// Resultado do processamento de um documento.
#[derive(Debug)]
enum DocumentOutcome {
    Processed {
        sentences: Vec<SentenceRows>,
        skipped_sentences: usize,
    },
    Skipped,
}

/// O pipeline de extração.
///
/// Todas as dependências são explícitas: trocar os léxicos, o segmentador ou
/// o etiquetador POS (ex: em testes) não exige nenhum estado global.
pub struct Pipeline {
    segmenter: Box<dyn Segmenter>,
    tagger: Box<dyn PosTagger>,
    lexicons: Lexicons,
    error_policy: ErrorPolicy,
}

impl Pipeline {
    /// Cria o pipeline com o etiquetador padrão e política `Abort`.
    pub fn new(lexicons: Lexicons) -> Self {
        Self {
            segmenter: Box::new(Tokenizer::new()),
            tagger: Box::new(RuleTagger::new()),
            lexicons,
            error_policy: ErrorPolicy::Abort,
        }
    }

    /// Carrega os léxicos do diretório de recursos e aplica a política configurada.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, ResourceLoadError> {
        let lexicons = Lexicons::load(&config.lexicon_paths())?;
        Ok(Self::new(lexicons).with_error_policy(config.error_policy))
    }

    pub fn with_segmenter(mut self, segmenter: impl Segmenter + 'static) -> Self {
        self.segmenter = Box::new(segmenter);
        self
    }

    pub fn with_tagger(mut self, tagger: impl PosTagger + 'static) -> Self {
        self.tagger = Box::new(tagger);
        self
    }

    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    pub fn lexicons(&self) -> &Lexicons {
        &self.lexicons
    }

    /// Processa uma sentença: tokens → features → tags.
    pub fn process_sentence(&self, sentence: &Sentence) -> Result<SentenceRows, AlignmentError> {
        let words = self.segmenter.segment(&sentence.text);
        let tokens: Vec<Token> = align_offsets(&sentence.text, words).collect::<Result<_, _>>()?;
        let features = extract_features(&tokens, self.tagger.as_ref(), &self.lexicons);
        let tags = tag_tokens(&tokens, &sentence.spans);

        let rows = tokens
            .into_iter()
            .zip(tags)
            .zip(features)
            .map(|((token, tag), features)| FeatureRow {
                token,
                tag,
                features,
            })
            .collect();

        Ok(SentenceRows {
            sentence_id: sentence.id.clone(),
            rows,
        })
    }

    /// Processa as sentenças de um documento, respeitando a política de erro.
    ///
    /// Retorna as linhas e quantas sentenças foram puladas.
    fn process_document(&self, doc: &Document) -> Result<(Vec<SentenceRows>, usize), PipelineError> {
        let mut out = Vec::with_capacity(doc.sentences.len());
        let mut skipped = 0;

        for sentence in &doc.sentences {
            match self.process_sentence(sentence) {
                Ok(rows) => out.push(rows),
                Err(source) if self.error_policy == ErrorPolicy::Skip => {
                    warn!(sentence = %sentence.id, error = %source, "sentença ignorada");
                    skipped += 1;
                }
                Err(source) => {
                    return Err(PipelineError::Alignment {
                        sentence_id: sentence.id.clone(),
                        source,
                    })
                }
            }
        }

        Ok((out, skipped))
    }

    fn process_path(&self, path: &Path) -> Result<DocumentOutcome, PipelineError> {
        let doc = match parse_document(path) {
            Ok(doc) => doc,
            Err(e) if self.error_policy == ErrorPolicy::Skip => {
                warn!(document = %path.display(), error = %e, "documento ignorado");
                return Ok(DocumentOutcome::Skipped);
            }
            Err(e) => return Err(e.into()),
        };

        let (sentences, skipped_sentences) = self.process_document(&doc)?;
        debug!(
            document = %path.display(),
            sentences = sentences.len(),
            "documento processado"
        );
        Ok(DocumentOutcome::Processed {
            sentences,
            skipped_sentences,
        })
    }

    /// Processa todos os `.xml` de `input_dir` e escreve a tabela em `out`.
    ///
    /// Com `ErrorPolicy::Abort`, nada é escrito se algum documento falhar.
    pub fn run(&self, input_dir: &Path, out: &mut impl Write) -> Result<RunSummary, PipelineError> {
        let paths = list_documents(input_dir).map_err(|source| PipelineError::InputDir {
            path: input_dir.to_path_buf(),
            source,
        })?;
        info!(documents = paths.len(), dir = %input_dir.display(), "iniciando extração");

        let outcomes: Vec<DocumentOutcome> = paths
            .par_iter()
            .map(|path| self.process_path(path))
            .collect::<Result<_, _>>()?;

        let mut summary = RunSummary::default();
        for outcome in &outcomes {
            match outcome {
                DocumentOutcome::Skipped => summary.skipped_documents += 1,
                DocumentOutcome::Processed {
                    sentences,
                    skipped_sentences,
                } => {
                    summary.documents += 1;
                    summary.skipped_sentences += skipped_sentences;
                    for rows in sentences {
                        summary.sentences += 1;
                        summary.tokens += rows.rows.len();
                        write_sentence(out, rows)?;
                    }
                }
            }
        }
        out.flush()?;

        info!(
            documents = summary.documents,
            sentences = summary.sentences,
            tokens = summary.tokens,
            skipped_documents = summary.skipped_documents,
            skipped_sentences = summary.skipped_sentences,
            "extração concluída"
        );
        Ok(summary)
    }
}
