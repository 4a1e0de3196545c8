//! Report writers.
//!
//! # Submodules
//!
//! - [`html`]: the consolidated HTML index, one heading per month
//! - [`json`]: the same report as JSON, written on request
//!
//! # Output Structure
//!
//! ```text
//! output/
//! ├── <name>.html        # HTML index
//! ├── <name>.json        # optional JSON dump
//! └── articles/
//!     └── <title>.html   # cached article pages (--offline)
//! ```

pub mod html;
pub mod json;
