//! Scores bidirectional translation files for every configured language pair
//! and prints a BLEU / quality-estimation report per pair.

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;

use bidir_mt_eval::telemetry::init_tracing;
use bidir_mt_eval::{load_estimator, Backend, Device, EvalConfig, Pipeline};

#[derive(Copy, Clone, Debug, ValueEnum)]
enum CliDevice {
    /// Run the model on the CPU
    Cpu,
    /// Run the model on a CUDA device; fails if none is available
    Accelerated,
}

impl From<CliDevice> for Device {
    fn from(d: CliDevice) -> Self {
        match d {
            CliDevice::Cpu => Device::Cpu,
            CliDevice::Accelerated => Device::Accelerated,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum CliBackend {
    /// COMET checkpoint through Python (`python` feature)
    Comet,
    /// TorchScript module through libtorch (`torch` feature)
    Torchscript,
}

impl From<CliBackend> for Backend {
    fn from(b: CliBackend) -> Self {
        match b {
            CliBackend::Comet => Backend::Comet,
            CliBackend::Torchscript => Backend::TorchScript,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "score-files")]
#[command(author, version, about = "Score bidirectional translation files")]
struct Args {
    /// Suffix of the files to score: {data_dir}/{src}_{tgt}_{suffix}.tsv
    #[arg(long)]
    file_suffix: Option<String>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the translation files
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Source language code (language A)
    #[arg(long)]
    source: Option<String>,

    /// Target language codes (language B), comma separated
    #[arg(long, value_delimiter = ',')]
    targets: Option<Vec<String>>,

    /// Quality-estimation backend
    #[arg(long, value_enum)]
    backend: Option<CliBackend>,

    /// Checkpoint name to download
    #[arg(long)]
    model: Option<String>,

    /// Local checkpoint path, skips the download
    #[arg(long)]
    checkpoint: Option<PathBuf>,

    /// Device for the quality-estimation model
    #[arg(long, value_enum)]
    device: Option<CliDevice>,

    /// Quality-estimation batch size
    #[arg(long)]
    batch_size: Option<usize>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn build_config(args: Args) -> Result<EvalConfig> {
    let mut config = if let Some(path) = &args.config {
        info!(config_path = %path.display(), "Loading configuration from file");
        EvalConfig::from_file(path)?
    } else {
        EvalConfig::default()
    };

    // Override with CLI arguments
    if let Some(suffix) = args.file_suffix {
        config.file_suffix = suffix;
    }
    if let Some(data_dir) = args.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(source) = args.source {
        config.source_language = source;
    }
    if let Some(targets) = args.targets {
        config.target_languages = targets;
    }
    if let Some(backend) = args.backend {
        config.model.backend = backend.into();
    }
    if let Some(model) = args.model {
        config.model.name = model;
    }
    if let Some(checkpoint) = args.checkpoint {
        config.model.checkpoint = Some(checkpoint);
    }
    if let Some(device) = args.device {
        config.model.device = device.into();
    }
    if let Some(batch_size) = args.batch_size {
        config.model.batch_size = batch_size;
    }

    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = build_config(args)?;

    info!(
        backend = ?config.model.backend,
        model = %config.model.name,
        device = ?config.model.device,
        "Loading quality-estimation scorer"
    );
    let estimator = load_estimator(&config.model).context("failed to load scoring model")?;
    info!("Scorer loaded");

    info!(
        data_dir = %config.data_dir.display(),
        suffix = %config.file_suffix,
        pairs = config.target_languages.len(),
        "Scoring files"
    );
    let pipeline = Pipeline::new(config, estimator);
    let stdout = io::stdout();
    pipeline.run(&mut stdout.lock()).await?;

    Ok(())
}
