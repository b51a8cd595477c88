use clap::Parser;
use nibuild_cli::{execute_compile, execute_template, init_tracing, Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let verbose = match &cli.command {
        Commands::Compile(command) | Commands::Template(command) => command.verbose,
    };
    if let Err(error) = init_tracing(verbose) {
        eprintln!("{error}");
    }

    let result = match cli.command {
        Commands::Compile(command) => execute_compile(&command),
        Commands::Template(command) => execute_template(&command),
    };

    match result {
        Ok(output) => {
            println!("{output}");
        }
        Err(error) => {
            eprintln!("{error}");
            std::process::exit(1);
        }
    }
}
