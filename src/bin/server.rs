//! PaletteFlow server binary.
//! Run with: cargo run --bin paletteflow-server [session-id]

use std::process::ExitCode;

use paletteflow::start_paletteflow;

fn main() -> ExitCode {
    start_paletteflow::run()
}
