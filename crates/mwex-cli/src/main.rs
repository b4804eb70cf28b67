use tracing_subscriber::EnvFilter;

/// Main entry point
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(code) = main_impl() {
        std::process::exit(code);
    }
}

/// Testable main implementation that returns an exit code instead of exiting
fn main_impl() -> Result<(), i32> {
    match mwex_cli::run_cli() {
        Ok(()) => Ok(()),
        Err(e) => {
            eprintln!("Error: {e}");
            Err(1)
        }
    }
}
