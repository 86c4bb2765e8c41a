//! Entry point for the `fuelstop` command-line interface.
#![forbid(unsafe_code)]

#[expect(
    clippy::print_stderr,
    reason = "the binary reports fatal errors on stderr before exiting"
)]
fn main() {
    if let Err(err) = fuelstop_cli::run() {
        eprintln!("fuelstop: {err}");
        std::process::exit(1);
    }
}
