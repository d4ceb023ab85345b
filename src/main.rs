use anyhow::Result;
use clap::Parser;
use travellens::Opts;
use travellens::cli::SubCommandExtend;
use travellens::config::SubCommand;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let opts = Opts::parse();
    match &opts.subcmd {
        SubCommand::Load(cmd) => cmd.run(&opts).await,
        SubCommand::Search(cmd) => cmd.run(&opts).await,
        SubCommand::Server(cmd) => cmd.run(&opts).await,
        SubCommand::Evaluate(cmd) => cmd.run(&opts).await,
    }
}
