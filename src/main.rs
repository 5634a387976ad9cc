use anyhow::Result;
use codeglyph::cli::Cli;
use codeglyph::logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.common.verbose, cli.common.log_format);
    cli.execute().await
}
