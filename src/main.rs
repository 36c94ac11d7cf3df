use anyhow::{ensure, Context, Result};
use rayon::ThreadPoolBuilder;

use fruit_classify_rs::{Config, FruitPipeline};

fn main() -> Result<()> {
    let config = Config::new();

    ensure!(config.model_path.exists(), "Model path does not exist");
    ensure!(
        config.artifact_path.exists(),
        "Artifact bundle path does not exist"
    );
    ensure!(config.input_path.exists(), "Input path does not exist");

    ThreadPoolBuilder::new()
        .num_threads(config.num_threads)
        .build_global()?;

    // 凍結済みアーティファクトの読み込みと形状検証。ここで失敗したら
    // リクエストを受け付けず終了する。
    let pipeline = FruitPipeline::with_onnx_model(&config.model_path, &config.artifact_path)
        .context("Failed to initialize the classification pipeline")?;

    if config.input_path.is_dir() {
        pipeline.process_directory(&config.input_path)?;
    } else {
        let prediction = pipeline.classify_file(&config.input_path)?;
        println!("{}", serde_json::to_string(&prediction)?);
    }

    Ok(())
}
