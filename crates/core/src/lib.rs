#![deny(missing_docs)]
//! jana core: markdown parsing and the document-tree passes.

/// Code-meta side channel collection.
pub mod code_meta;
/// Per-document processing context.
pub mod context;
/// Core error types.
pub mod error;
/// Code fence meta string parsing.
pub mod meta;
/// Markdown parsing and document pass pipeline.
pub mod parse;
/// Component-block promotion out of paragraphs.
pub mod promote;

pub use code_meta::collect_code_meta;
pub use context::ProcessingContext;
pub use error::{JanaError, SourceLocation};
pub use meta::{CodeMeta, MetaValue, parse_meta};
pub use parse::{
    DocumentPass, DocumentPipeline, ParseOptions, parse_mdast, parse_mdast_with_options,
};
pub use promote::{is_component_tag, promote_component_blocks};
