//! # Corpus DDI: Documentos XML com Anotações de Entidades
//!
//! Cada arquivo do corpus é um documento XML com sentenças e, dentro delas,
//! as entidades anotadas:
//!
//! ```xml
//! <document id="DDI-DrugBank.d1">
//!   <sentence id="DDI-DrugBank.d1.s0" text="Ibuprofen reduces fever.">
//!     <entity id="DDI-DrugBank.d1.s0.e0" charOffset="0-8" type="drug" text="Ibuprofen"/>
//!   </sentence>
//! </document>
//! ```
//!
//! Os offsets (`charOffset`) são em caracteres e o fim é inclusivo. Entidades
//! descontínuas (`"3-7;12-18"`) usam apenas o primeiro trecho.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::DocumentParseError;
use crate::tagger::EntitySpan;

/// Uma sentença do corpus com seus spans *gold*.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    /// Identificador da sentença (ex: "DDI-DrugBank.d1.s0").
    pub id: String,
    /// Texto bruto, já sem escapes XML.
    pub text: String,
    /// Spans na ordem em que aparecem no arquivo (a ordem importa no alinhamento).
    pub spans: Vec<EntitySpan>,
}

/// Um arquivo do corpus já interpretado.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub source: PathBuf,
    pub sentences: Vec<Sentence>,
}

/// Lê e interpreta um arquivo XML do corpus.
pub fn parse_document(path: &Path) -> Result<Document, DocumentParseError> {
    let xml = fs::read_to_string(path).map_err(|source| DocumentParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_document_str(path, &xml)
}

/// Interpreta o conteúdo XML de um documento; `source` só é usado nas mensagens de erro.
pub fn parse_document_str(source: &Path, xml: &str) -> Result<Document, DocumentParseError> {
    let tree = roxmltree::Document::parse(xml).map_err(|e| DocumentParseError::Xml {
        path: source.to_path_buf(),
        source: e,
    })?;

    let missing = |element: &'static str, attribute: &'static str| DocumentParseError::MissingAttribute {
        path: source.to_path_buf(),
        element,
        attribute,
    };

    let mut sentences = Vec::new();
    for node in tree.descendants().filter(|n| n.has_tag_name("sentence")) {
        let id = node.attribute("id").ok_or_else(|| missing("sentence", "id"))?;
        let text = node.attribute("text").ok_or_else(|| missing("sentence", "text"))?;

        let mut spans = Vec::new();
        for entity in node.descendants().filter(|n| n.has_tag_name("entity")) {
            let offset = entity
                .attribute("charOffset")
                .ok_or_else(|| missing("entity", "charOffset"))?;
            let entity_type = entity.attribute("type").ok_or_else(|| missing("entity", "type"))?;
            let (start, end) =
                parse_char_offset(offset).ok_or_else(|| DocumentParseError::InvalidOffset {
                    path: source.to_path_buf(),
                    sentence: id.to_string(),
                    value: offset.to_string(),
                })?;
            spans.push(EntitySpan::new(start, end, entity_type));
        }

        sentences.push(Sentence {
            id: id.to_string(),
            text: text.to_string(),
            spans,
        });
    }

    Ok(Document {
        source: source.to_path_buf(),
        sentences,
    })
}

/// Interpreta `"início-fim"`, usando só o primeiro trecho de `"a-b;c-d"`.
pub fn parse_char_offset(value: &str) -> Option<(usize, usize)> {
    let first = value.split(';').next()?;
    let mut bounds = first.split('-');
    let start = bounds.next()?.trim().parse().ok()?;
    let end = bounds.next()?.trim().parse().ok()?;
    if bounds.next().is_some() {
        return None;
    }
    Some((start, end))
}

/// Lista os arquivos `.xml` de um diretório, ordenados pelo nome.
///
/// A ordenação torna a saída reproduzível entre sistemas de arquivos.
pub fn list_documents(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_xml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("xml"));
        if path.is_file() && is_xml {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}
