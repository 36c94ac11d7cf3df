use clap::Parser;
use std::path::PathBuf;
use std::thread;

#[derive(Parser, Clone)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// 分類対象の画像ファイル、または画像を含むディレクトリ
    pub input_path: PathBuf,

    #[arg(short, long)]
    pub model_path: PathBuf,

    #[arg(short, long)]
    pub artifact_path: PathBuf,

    #[arg(
        short, long, default_value_t = thread::available_parallelism().unwrap().get()
    )]
    pub num_threads: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self::parse()
    }
}
