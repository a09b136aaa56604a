//! waveplan CLI entry point.

// CLI binary needs to output to stdout/stderr - this is intentional
#![allow(clippy::print_stdout, clippy::print_stderr)]

use waveplan::cli::{self, EXIT_OK, OutputFormat, exit_code_for, render_error};
use waveplan::tracing::{TracingConfig, init_tracing};

fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panicked: {panic_info}");
        eprintln!("Internal error occurred. Run with RUST_LOG=debug for more information.");
    }));

    let cli = cli::parse();
    let json_mode = cli.format == OutputFormat::Json;

    let tracing_config = TracingConfig {
        format: cli.log_format,
        level: cli.level.into(),
    };

    let result = init_tracing(tracing_config).and_then(|()| waveplan::run(&cli));

    let exit_code = match result {
        Ok(output) => {
            println!("{output}");
            EXIT_OK
        }
        Err(err) => {
            render_error(&err, json_mode);
            exit_code_for(&err)
        }
    };

    std::process::exit(exit_code);
}
