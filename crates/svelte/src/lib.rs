#![deny(missing_docs)]
//! jana: markdown documents rendered as Svelte markup.
//!
//! Elements that have a prose component in the project (`<p>`, `<h1>`,
//! `<pre>`, ...) are wrapped in that component and the component is imported
//! into the page's instance script. Text inside code blocks is escaped so
//! Svelte never reads it as template syntax.

/// Parallel batch transforms.
pub mod batch;
/// Markup tree model, conversion and serialization.
pub mod hast;
/// The markdown to Svelte processor and its options.
pub mod processor;
/// Prose component discovery and lookup.
pub mod registry;
/// Markup-tree passes.
pub mod transform;

pub use batch::{BatchInput, BatchOptions, BatchProcessingResult, BatchResult, BatchStats};
pub use jana_core::{JanaError, ProcessingContext};
pub use processor::{Jana, JanaBuilder, JanaOptions, MARKDOWN_EXTENSION, TransformOutput};
pub use registry::{ComponentEntry, ComponentRegistry, DEFAULT_PROSE_DIR, scan_prose_components};
pub use transform::{ComponentsStage, EscapeStage, MarkupPass, MarkupPipeline};
