use clap::Parser;

use palrom::cmd::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    match cli.command {
        Commands::Decode(args) => args.run(),
        Commands::Table(args) => args.run(),
        Commands::Build(args) => args.run(),
        Commands::Show(args) => args.run(),
        Commands::CheckEquivalence(args) => args.run(),
    }
}
