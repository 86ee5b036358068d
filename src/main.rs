use anyhow::Result;
use clap::Parser;

mod commands;

#[derive(Parser)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about = "AI-powered docstring generation for Python codebases", long_about = None)]
struct Cli {
    #[command(flatten)]
    args: commands::document::DocumentArgs,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    commands::document::execute(cli.args)
}
