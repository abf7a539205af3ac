//! Binary entrypoint for the BrandFlow relay server.

use std::process::ExitCode;

use brandflow::start_brandflow;

/// Serve the chat relay, the template catalogue and the landing page.
fn main() -> ExitCode {
    start_brandflow::run()
}
