//! CLI de extração de features para o corpus DDI
//!
//! Uso:
//!   drug-ner <INPUT_DIR> [--resources <DIR>] [--on-error abort|skip] > features.tsv
//!
//! A tabela vai para a saída padrão; os logs vão para a saída de erro.

use std::io::{self, BufWriter};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use drug_ner_core::{ErrorPolicy, Pipeline, PipelineConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "drug-ner")]
#[command(about = "Converte documentos XML anotados em features CRFsuite")]
#[command(version)]
struct Cli {
    /// Diretório com os documentos `.xml`
    input_dir: PathBuf,

    /// Diretório com HSDB.txt e DrugBank.txt
    #[arg(long, default_value = "resources")]
    resources: PathBuf,

    /// Política para documentos ou sentenças inválidos
    #[arg(long, value_enum, default_value_t = ErrorPolicy::Abort)]
    on_error: ErrorPolicy,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = PipelineConfig {
        resources_dir: cli.resources,
        error_policy: cli.on_error,
    };

    let pipeline = Pipeline::from_config(&config).with_context(|| {
        format!("falha ao carregar os léxicos de {}", config.resources_dir.display())
    })?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let summary = pipeline
        .run(&cli.input_dir, &mut out)
        .with_context(|| format!("falha ao processar {}", cli.input_dir.display()))?;

    info!(
        documents = summary.documents,
        sentences = summary.sentences,
        tokens = summary.tokens,
        "features escritas na saída padrão"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["drug-ner", "corpus"]).unwrap();
        assert_eq!(cli.input_dir, PathBuf::from("corpus"));
        assert_eq!(cli.resources, PathBuf::from("resources"));
        assert_eq!(cli.on_error, ErrorPolicy::Abort);
    }

    #[test]
    fn test_on_error_maps_to_policy() {
        let cli = Cli::try_parse_from(["drug-ner", "corpus", "--on-error", "skip"]).unwrap();
        assert_eq!(cli.on_error, ErrorPolicy::Skip);
        assert!(Cli::try_parse_from(["drug-ner", "corpus", "--on-error", "ignore"]).is_err());
    }
}
