use clap::Parser;
use handcount::config::CliArgs;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    handcount::init_tracing();
    let args = CliArgs::parse();
    handcount::run(args).await?;
    Ok(())
}
