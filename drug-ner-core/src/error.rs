//! # Taxonomia de Erros
//!
//! Cada estágio do pipeline tem seu próprio tipo de erro. Todos são fatais
//! por padrão: o driver aborta a execução inteira no primeiro erro, a menos
//! que a política `Skip` tenha sido escolhida (ver [`crate::pipeline::ErrorPolicy`]).

use std::path::PathBuf;

/// Falha ao carregar um recurso externo (HSDB ou DrugBank).
///
/// Sempre fatal: sem os léxicos as features de dicionário ficariam
/// silenciosamente erradas.
#[derive(Debug, thiserror::Error)]
pub enum ResourceLoadError {
    #[error("não foi possível ler o recurso {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("recurso {path} malformado na linha {line}: {reason}")]
    Malformed {
        path: PathBuf,
        line: usize,
        reason: String,
    },
}

/// Documento de entrada inválido segundo o esquema XML esperado.
#[derive(Debug, thiserror::Error)]
pub enum DocumentParseError {
    #[error("não foi possível ler o documento {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("XML inválido em {path}: {source}")]
    Xml {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    #[error("{path}: elemento <{element}> sem o atributo obrigatório '{attribute}'")]
    MissingAttribute {
        path: PathBuf,
        element: &'static str,
        attribute: &'static str,
    },

    #[error("{path}: charOffset inválido '{value}' na sentença {sentence}")]
    InvalidOffset {
        path: PathBuf,
        sentence: String,
        value: String,
    },
}

/// O texto de um token não aparece no restante da sentença.
///
/// Acontece quando o segmentador emite um token "virtual" que não é uma
/// substring contígua do texto. Nunca assumimos offset 0 nesse caso.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("token '{token}' não encontrado a partir do caractere {cursor}")]
pub struct AlignmentError {
    pub token: String,
    /// Posição (em caracteres) a partir da qual a busca foi feita.
    pub cursor: usize,
}

/// Erros do driver que processa um diretório inteiro.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Resource(#[from] ResourceLoadError),

    #[error(transparent)]
    Document(#[from] DocumentParseError),

    #[error("falha de alinhamento na sentença {sentence_id}: {source}")]
    Alignment {
        sentence_id: String,
        #[source]
        source: AlignmentError,
    },

    #[error("não foi possível listar o diretório {path}: {source}")]
    InputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("falha ao escrever a saída: {0}")]
    Output(#[from] std::io::Error),
}
