// Export renderer: a pure function from a resume to a paginated artifact.
// The artifact mirrors the document model section for section; no mutation
// logic lives anywhere near here.

pub mod metrics;
pub mod page;

pub use metrics::{default_page_config, PageConfig};
pub use page::{render, render_json, ExportDocument};
