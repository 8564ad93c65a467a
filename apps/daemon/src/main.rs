use anyhow::Context;
use clap::Parser;
use std::io::Write;
use zwembot::{App, Cli, Command};

#[zb_runtime::main(daemon)]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = zwembot::load(&cli).context("Critical: Configuration is malformed")?;
    let _log = zwembot::init_logger(&config, cli.is_daemon())?;

    let app = App::open(config).await?;

    match cli.command.unwrap_or_default() {
        Command::Run => app.run().await,
        command => {
            let mut out = std::io::stdout().lock();
            app.execute(command, &mut out).await?;
            out.flush().context("Failed to flush output")
        },
    }
}
