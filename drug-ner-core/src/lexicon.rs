//! # Léxicos Externos (HSDB e DrugBank)
//!
//! Dois recursos estáticos alimentam as features de dicionário:
//!
//! - **HSDB** (Hazardous Substances Data Bank): um nome por linha, comparação
//!   exata e sensível a maiúsculas.
//! - **DrugBank**: registros `nome|categoria`. A chave é normalizada para
//!   minúsculas e a primeira ocorrência de cada nome vence.
//!
//! Os léxicos são carregados uma vez, antes de qualquer sentença ser
//! processada, e depois apenas lidos. Nada aqui é global: o [`Lexicons`] é
//! passado por referência para o extrator de features.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ResourceLoadError;

/// Nome do arquivo HSDB dentro do diretório de recursos.
pub const HSDB_FILE: &str = "HSDB.txt";
/// Nome do arquivo DrugBank dentro do diretório de recursos.
pub const DRUGBANK_FILE: &str = "DrugBank.txt";

/// Caminhos dos dois arquivos de recurso.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexiconPaths {
    pub hsdb: PathBuf,
    pub drugbank: PathBuf,
}

impl LexiconPaths {
    /// Usa os nomes padrão (`HSDB.txt`, `DrugBank.txt`) dentro de `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            hsdb: dir.join(HSDB_FILE),
            drugbank: dir.join(DRUGBANK_FILE),
        }
    }
}

/// Léxicos somente-leitura consultados pelo extrator de features.
#[derive(Debug, Clone, Default)]
pub struct Lexicons {
    /// Nomes de substâncias perigosas (comparação exata).
    hsdb: HashSet<String>,
    /// Nome do fármaco em minúsculas → categoria.
    drugbank: HashMap<String, String>,
}

impl Lexicons {
    /// Léxicos vazios (nenhuma feature de dicionário dispara).
    pub fn new() -> Self {
        Self::default()
    }

    /// Carrega os dois arquivos. Qualquer falha é fatal para a execução.
    pub fn load(paths: &LexiconPaths) -> Result<Self, ResourceLoadError> {
        let lexicons = Self {
            hsdb: read_hsdb(open(&paths.hsdb)?, &paths.hsdb)?,
            drugbank: read_drugbank(open(&paths.drugbank)?, &paths.drugbank)?,
        };
        debug!(
            hsdb = lexicons.hsdb_len(),
            drugbank = lexicons.drugbank_len(),
            "léxicos carregados"
        );
        Ok(lexicons)
    }

    /// Adiciona um nome ao HSDB (usado para montar léxicos de teste).
    pub fn with_hsdb(mut self, name: impl Into<String>) -> Self {
        self.hsdb.insert(name.into());
        self
    }

    /// Adiciona um fármaco ao DrugBank, respeitando "primeira ocorrência vence".
    pub fn with_drug(mut self, name: &str, category: impl Into<String>) -> Self {
        self.drugbank
            .entry(name.to_lowercase())
            .or_insert_with(|| category.into());
        self
    }

    /// Categoria DrugBank do token (busca sem diferenciar maiúsculas).
    pub fn drug_category(&self, token: &str) -> Option<&str> {
        self.drugbank.get(&token.to_lowercase()).map(String::as_str)
    }

    /// O token pertence ao HSDB? (busca exata)
    pub fn in_hsdb(&self, token: &str) -> bool {
        self.hsdb.contains(token)
    }

    pub fn hsdb_len(&self) -> usize {
        self.hsdb.len()
    }

    pub fn drugbank_len(&self) -> usize {
        self.drugbank.len()
    }
}

fn open(path: &Path) -> Result<BufReader<File>, ResourceLoadError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| ResourceLoadError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Lê o HSDB: um nome por linha, espaços nas pontas removidos, linhas vazias ignoradas.
pub fn read_hsdb(reader: impl BufRead, path: &Path) -> Result<HashSet<String>, ResourceLoadError> {
    let mut names = HashSet::new();
    for line in reader.lines() {
        let line = line.map_err(|source| ResourceLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = line.trim();
        if !name.is_empty() {
            names.insert(name.to_string());
        }
    }
    Ok(names)
}

/// Lê o DrugBank: registros separados por `|`, campo 0 = nome, campo 1 = categoria.
///
/// Linhas em branco são ignoradas; um registro com menos de dois campos, ou
/// com tabulação na categoria (quebraria o formato de saída), é erro.
pub fn read_drugbank(
    reader: impl BufRead,
    path: &Path,
) -> Result<HashMap<String, String>, ResourceLoadError> {
    let mut drugs = HashMap::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| ResourceLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }

        let malformed = |reason: &str| ResourceLoadError::Malformed {
            path: path.to_path_buf(),
            line: idx + 1,
            reason: reason.to_string(),
        };

        let mut fields = line.split('|');
        let name = fields.next().unwrap_or_default();
        let category = fields
            .next()
            .ok_or_else(|| malformed("registro sem o campo de categoria"))?;
        if category.contains('\t') {
            return Err(malformed("categoria contém tabulação"));
        }

        drugs
            .entry(name.to_lowercase())
            .or_insert_with(|| category.to_string());
    }
    Ok(drugs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    #[test]
    fn test_hsdb_trims_and_skips_blank_lines() {
        let data = "Benzene\n  Toluene  \n\nAcetone\n";
        let set = read_hsdb(Cursor::new(data), Path::new("HSDB.txt")).unwrap();
        assert_eq!(set.len(), 3);
        assert!(set.contains("Toluene"));
    }

    #[test]
    fn test_drugbank_first_occurrence_wins() {
        let data = "Aspirin|drug\naspirin|brand\nWarfarin|drug\n";
        let map = read_drugbank(Cursor::new(data), Path::new("DrugBank.txt")).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("aspirin").map(String::as_str), Some("drug"));
    }

    #[test]
    fn test_drugbank_extra_fields_are_ignored() {
        let data = "Ibuprofen|drug|DB01050\r\n";
        let map = read_drugbank(Cursor::new(data), Path::new("DrugBank.txt")).unwrap();
        assert_eq!(map.get("ibuprofen").map(String::as_str), Some("drug"));
    }

    #[test]
    fn test_drugbank_crlf_line_endings() {
        let data = "Aspirin|drug\r\nNSAIDs|group\r\n";
        let map = read_drugbank(Cursor::new(data), Path::new("DrugBank.txt")).unwrap();
        assert_eq!(map.get("aspirin").map(String::as_str), Some("drug"));
        assert_eq!(map.get("nsaids").map(String::as_str), Some("group"));
    }

    #[test]
    fn test_drugbank_missing_category_is_malformed() {
        let data = "Aspirin|drug\nlonely\n";
        let err = read_drugbank(Cursor::new(data), Path::new("DrugBank.txt")).unwrap_err();
        match err {
            ResourceLoadError::Malformed { line, .. } => assert_eq!(line, 2),
            other => panic!("erro inesperado: {other:?}"),
        }
    }

    #[test]
    fn test_drug_lookup_is_case_insensitive() {
        let lex = Lexicons::new().with_drug("aspirin", "drug_n");
        assert_eq!(lex.drug_category("Aspirin"), Some("drug_n"));
        assert_eq!(lex.drug_category("ASPIRIN"), Some("drug_n"));
        assert_eq!(lex.drug_category("aspirins"), None);
    }

    #[test]
    fn test_hsdb_lookup_is_case_sensitive() {
        let lex = Lexicons::new().with_hsdb("Benzene");
        assert!(lex.in_hsdb("Benzene"));
        assert!(!lex.in_hsdb("benzene"));
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut hsdb = File::create(dir.path().join(HSDB_FILE)).unwrap();
        writeln!(hsdb, "Benzene").unwrap();
        let mut drugbank = File::create(dir.path().join(DRUGBANK_FILE)).unwrap();
        writeln!(drugbank, "Aspirin|drug").unwrap();
        writeln!(drugbank, "NSAIDs|group").unwrap();

        let lex = Lexicons::load(&LexiconPaths::in_dir(dir.path())).unwrap();
        assert_eq!(lex.hsdb_len(), 1);
        assert_eq!(lex.drugbank_len(), 2);
        assert_eq!(lex.drug_category("nsaids"), Some("group"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Lexicons::load(&LexiconPaths::in_dir(dir.path())).unwrap_err();
        assert!(matches!(err, ResourceLoadError::Io { .. }));
        assert!(err.to_string().contains(HSDB_FILE));
    }
}
