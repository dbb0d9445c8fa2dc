//! Per-document processing state shared between tree passes.

use crate::meta::CodeMeta;

/// Side data for one document run.
///
/// Created fresh for every document and dropped once the document is
/// serialized. The document-tree passes write to it and the markup-tree
/// passes read from it.
#[derive(Debug, Clone, Default)]
pub struct ProcessingContext {
    /// Identifier of the document being processed (usually its path).
    pub id: Option<String>,
    /// Parsed code-fence meta, index-aligned with code blocks in document order.
    ///
    /// `None` until the code-meta collector has run. Inner `None` entries mark
    /// code blocks without a meta string.
    pub code_meta: Option<Vec<Option<CodeMeta>>>,
}

impl ProcessingContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context for the document identified by `id`.
    pub fn for_document(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            code_meta: None,
        }
    }

    /// Returns the code-meta side channel, creating it if absent.
    pub fn code_meta_mut(&mut self) -> &mut Vec<Option<CodeMeta>> {
        self.code_meta.get_or_insert_with(Vec::new)
    }

    /// Returns the collected meta entry at `position`, if any.
    pub fn code_meta_at(&self, position: usize) -> Option<&CodeMeta> {
        self.code_meta
            .as_ref()
            .and_then(|entries| entries.get(position))
            .and_then(Option::as_ref)
    }
}
