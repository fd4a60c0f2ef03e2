//! # media-id CLI
//!
//! Command-line interface for media identification and thumbnails.
//!
//! ## Usage
//! ```bash
//! media-id inspect ~/Photos/IMG_4120.JPG --output json
//! media-id thumbs ~/Photos/IMG_4120.JPG --cache /tmp/thumbs
//! ```

mod cli;

use media_identity::Result;

fn main() -> Result<()> {
    media_identity::init_tracing();
    cli::run()
}
