//! # CLI Module
//!
//! User-facing commands. Each command owns the run-fatal decisions (bad
//! config, failed sign-in, unusable output folder) and reports them through
//! [`crate::error!`], which exits the process. Everything below the command
//! layer returns errors instead.
//!
//! ## Commands
//!
//! - [`download`] - Signs in, downloads every album reference and prints a
//!   summary of what happened to each track
//!
//! ## Usage
//!
//! ```bash
//! hiresdl download https://www.highresaudio.com/en/album/view/y8cfmp/miles-davis-kind-of-blue
//! hiresdl download -o ~/Music/HRA albums.txt
//! ```

mod download;

pub use download::download;
