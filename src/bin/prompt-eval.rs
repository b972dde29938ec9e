#[path = "prompt-eval/app/mod.rs"]
mod app;
#[path = "prompt-eval/args.rs"]
mod args;
#[path = "prompt-eval/config/mod.rs"]
mod config;
#[path = "prompt-eval/dataset/mod.rs"]
mod dataset;
#[path = "prompt-eval/logging.rs"]
mod logging;
#[path = "prompt-eval/output.rs"]
mod output;
#[path = "prompt-eval/provider/mod.rs"]
mod provider;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    app::run().await
}
