//! Downloads FLORES-200 and writes a language pair's aligned sentences as TSV.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;

use bidir_mt_eval::corpus::{
    save_reference_pairs, CorpusSource, FloresLanguage, HfFloresSource, Split,
};
use bidir_mt_eval::telemetry::init_tracing;

#[derive(Copy, Clone, Debug, Default, ValueEnum)]
enum CliSplit {
    Dev,
    #[default]
    Devtest,
}

impl From<CliSplit> for Split {
    fn from(s: CliSplit) -> Self {
        match s {
            CliSplit::Dev => Split::Dev,
            CliSplit::Devtest => Split::Devtest,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "fetch-flores")]
#[command(author, version, about = "Download FLORES-200 and extract parallel sentences")]
#[command(after_help = "Examples:\n  \
    fetch-flores --lang1 eng_Latn --lang2 fra_Latn --output-file data/en_fr.tsv\n  \
    fetch-flores --lang1 spa_Latn --lang2 deu_Latn --output-file es_de.tsv --split dev\n\n\
    Common codes: eng_Latn fra_Latn spa_Latn deu_Latn zho_Hans zho_Hant arb_Arab jpn_Jpan kor_Hang rus_Cyrl")]
struct Args {
    /// First language code (e.g. eng_Latn)
    #[arg(long)]
    lang1: String,

    /// Second language code (e.g. fra_Latn)
    #[arg(long)]
    lang2: String,

    /// Output TSV file path
    #[arg(long)]
    output_file: PathBuf,

    /// Which split to use
    #[arg(long, value_enum, default_value_t = CliSplit::Devtest)]
    split: CliSplit,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let lang_a: FloresLanguage = args.lang1.parse()?;
    let lang_b: FloresLanguage = args.lang2.parse()?;
    let split: Split = args.split.into();

    let pairs = HfFloresSource::default()
        .fetch(&lang_a, &lang_b, split)
        .with_context(|| format!("failed to fetch {lang_a}-{lang_b} ({split})"))?;

    let written = save_reference_pairs(&args.output_file, &pairs)?;
    info!(
        pairs = written,
        output = %args.output_file.display(),
        "Saved sentence pairs"
    );
    Ok(())
}
