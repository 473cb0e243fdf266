//! perfdelta CLI entry point.

fn main() {
    if let Err(e) = perfdelta_cli::run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
