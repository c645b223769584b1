//! Benchboard CLI entry point.

fn main() {
    if let Err(e) = benchboard_cli::run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
