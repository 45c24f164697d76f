use clap::Parser;
use qtag::cli::commands::{Cli, Commands};
use qtag::cli::handlers;

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init(args) => {
            // Init is handled before data-dir discovery
            if let Err(e) = handlers::cmd_init(args, cli.data_dir.as_deref()) {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        }
        _ => {
            if let Err(e) = handlers::dispatch(cli) {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        }
    }
}
