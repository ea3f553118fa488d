//! Template storage and renderer binding
//!
//! Templates live on disk as `<root>/<category>/<name>/`. A variant directory
//! holds a `template.toml` manifest naming its renderer, a LaTeX skeleton and
//! optionally a preview image:
//!
//! ```text
//! templates/
//!   resume/
//!     classic/
//!       template.toml     renderer = "ClassicResumeRenderer"
//!       template.tex
//!       preview.png
//!   cover_letter/
//!     classic/
//!       template.toml     renderer = "ClassicCoverLetterRenderer"
//!       template.tex
//! ```

mod binding;
mod manifest;
mod registry;

pub use binding::{expected_identifier, Registration, REGISTRATIONS};
pub use manifest::{Manifest, MANIFEST_FILE};
pub use registry::{Catalog, Listing, Registry, ResolvedTemplate, TemplateInfo};
