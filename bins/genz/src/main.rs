//! genz command - send Gen-Z component commands and watch hotplug events.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "genz", version, about = "Gen-Z component management tool")]
struct Cli {
    /// Output JSON.
    #[arg(short = 'j', long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Send a component command to the genz_cmd family.
    #[command(visible_alias = "s")]
    Send(commands::send::SendCmd),

    /// Show a resolved generic netlink family.
    #[command(visible_alias = "f")]
    Family(commands::family::FamilyCmd),

    /// Watch kobject uevents.
    #[command(visible_alias = "m", visible_alias = "mon")]
    Monitor(commands::monitor::MonitorCmd),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    let result: anyhow::Result<()> = match cli.command {
        Command::Send(cmd) => cmd.run(cli.json).await.map_err(Into::into),
        Command::Family(cmd) => cmd.run(cli.json).await.map_err(Into::into),
        Command::Monitor(cmd) => cmd.run(cli.json).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
