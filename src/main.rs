//! # smash CLI
//!
//! Command-line interface for the duplicate file finder.
//!
//! ## Usage
//! ```bash
//! smash ~/Downloads ~/Documents -r
//! smash /srv/media -r --algorithm blake3 --show-duplicates -o report.json
//! ```

mod cli;

use smash::Result;

fn main() -> Result<()> {
    cli::run()
}
