use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "veritrust-server")]
#[command(author, version, about = "VeriTrust fake review detection API", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "veritrust.yaml")]
    pub config: String,

    /// Listen address
    #[arg(short = 'l', long)]
    pub listen: Option<String>,

    /// Listen port
    #[arg(short = 'P', long)]
    pub port: Option<u16>,

    /// Directory holding the fine-tuned classifier
    #[arg(short, long, env = "VERITRUST_MODEL_PATH")]
    pub model_path: Option<PathBuf>,

    /// Browser origin allowed by CORS
    #[arg(long)]
    pub cors_origin: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
