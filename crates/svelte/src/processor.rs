//! The markdown to Svelte processor.

use crate::hast::{to_hast, to_html};
use crate::registry::{ComponentRegistry, DEFAULT_PROSE_DIR};
use crate::transform::{MarkupPass, MarkupPipeline};
use indexmap::IndexMap;
use jana_core::{DocumentPass, DocumentPipeline, JanaError, ParseOptions, ProcessingContext};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Identifiers ending with this suffix are processed; all others pass through.
pub const MARKDOWN_EXTENSION: &str = ".md";

/// User configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JanaOptions {
    /// Tag to component path overrides, applied over scanned components.
    #[serde(default)]
    pub components: IndexMap<String, String>,
    /// Prose component directory relative to the project root.
    #[serde(default = "default_prose_dir")]
    pub prose_dir: String,
    /// Enable GFM tables, strikethrough, autolinks and task lists.
    #[serde(default)]
    pub gfm: bool,
}

fn default_prose_dir() -> String {
    DEFAULT_PROSE_DIR.to_string()
}

impl Default for JanaOptions {
    fn default() -> Self {
        Self {
            components: IndexMap::new(),
            prose_dir: default_prose_dir(),
            gfm: false,
        }
    }
}

impl JanaOptions {
    /// Parses options from a JSON object; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Adds or replaces a component override.
    pub fn with_component(mut self, tag: impl Into<String>, path: impl Into<String>) -> Self {
        self.components.insert(tag.into(), path.into());
        self
    }

    fn parse_options(&self) -> ParseOptions {
        if self.gfm {
            ParseOptions::gfm()
        } else {
            ParseOptions::commonmark()
        }
    }
}

/// Output of a successful transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOutput {
    /// Generated Svelte markup.
    pub code: String,
    /// Source map; always `None`.
    pub map: Option<String>,
}

/// Builds a [`Jana`] processor with extension passes.
///
/// ```no_run
/// use jana_svelte::{JanaBuilder, JanaOptions};
///
/// let jana = JanaBuilder::new(".", JanaOptions::default()).build()?;
/// let output = jana.transform("# Hello", "docs/index.md");
/// # Ok::<(), jana_core::JanaError>(())
/// ```
pub struct JanaBuilder {
    root: PathBuf,
    options: JanaOptions,
    registry: Option<ComponentRegistry>,
    document_passes: Vec<Box<dyn DocumentPass + Send + Sync>>,
    markup_passes: Vec<Box<dyn MarkupPass + Send + Sync>>,
}

impl JanaBuilder {
    /// Starts a builder for the project at `root`.
    pub fn new(root: impl Into<PathBuf>, options: JanaOptions) -> Self {
        Self {
            root: root.into(),
            options,
            registry: None,
            document_passes: Vec::new(),
            markup_passes: Vec::new(),
        }
    }

    /// Uses `registry` instead of scanning the prose directory.
    ///
    /// Component overrides from the options are still applied on top.
    pub fn registry(mut self, registry: ComponentRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Appends a pass over the document tree, run before the built-in passes.
    pub fn add_document_pass<P: DocumentPass + Send + Sync + 'static>(mut self, pass: P) -> Self {
        self.document_passes.push(Box::new(pass));
        self
    }

    /// Appends a pass over the markup tree, run before component wrapping.
    pub fn add_markup_pass<P: MarkupPass + Send + Sync + 'static>(mut self, pass: P) -> Self {
        self.markup_passes.push(Box::new(pass));
        self
    }

    /// Builds the registry and assembles the processor.
    pub fn build(self) -> Result<Jana, JanaError> {
        let registry = match self.registry {
            Some(registry) => registry,
            None => ComponentRegistry::build(&self.root, &self.options.prose_dir)?,
        };
        let mut jana = Jana::with_registry(registry, &self.options);

        for pass in self.document_passes {
            jana.documents.add_boxed_pass(pass);
        }
        for pass in self.markup_passes {
            jana.markup.add_boxed_pass(pass);
        }
        Ok(jana)
    }
}

/// Converts markdown documents into Svelte markup.
///
/// Holds the component registry and the pass pipelines; every document gets
/// a fresh [`ProcessingContext`]. Safe to share across threads.
pub struct Jana {
    documents: DocumentPipeline,
    markup: MarkupPipeline,
}

impl Jana {
    /// Creates a processor for the project at `root`, scanning its prose directory.
    pub fn new(root: &Path, options: JanaOptions) -> Result<Self, JanaError> {
        JanaBuilder::new(root, options).build()
    }

    /// Creates a processor around an existing registry, without touching the filesystem.
    ///
    /// Component overrides from `options` are applied on top of `registry`.
    pub fn with_registry(mut registry: ComponentRegistry, options: &JanaOptions) -> Self {
        for (tag, path) in &options.components {
            registry.insert(tag, path);
        }
        Self {
            documents: DocumentPipeline::new(options.parse_options()),
            markup: MarkupPipeline::new(Arc::new(registry)),
        }
    }

    /// The component registry used for wrapping.
    pub fn registry(&self) -> &ComponentRegistry {
        self.markup.registry()
    }

    /// Runs the full pipeline on one document.
    pub fn process(&self, source: &str, id: &str) -> Result<String, JanaError> {
        let mut ctx = ProcessingContext::for_document(id);
        let document = self.documents.run(source, &mut ctx)?;
        let mut tree = to_hast(&document);
        self.markup.run(&mut tree, &mut ctx)?;
        Ok(to_html(&tree))
    }

    /// Like [`Jana::process`], but a panicking pass becomes an error for this document.
    pub(crate) fn process_contained(&self, source: &str, id: &str) -> Result<String, JanaError> {
        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| self.process(source, id))) {
            Ok(result) => result,
            Err(panic_err) => {
                let message = panic_err
                    .downcast_ref::<&str>()
                    .map(|message| message.to_string())
                    .or_else(|| panic_err.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                Err(JanaError::InternalError(format!(
                    "panic during processing: {}",
                    message
                )))
            }
        }
    }

    /// Transforms a markdown module.
    ///
    /// Returns `None` for identifiers that are not markdown files, and for
    /// documents that fail to process or whose passes panic (the failure is logged).
    pub fn transform(&self, code: &str, id: &str) -> Option<TransformOutput> {
        if !is_markdown(id) {
            return None;
        }

        match self.process_contained(code, id) {
            Ok(code) => Some(TransformOutput { code, map: None }),
            Err(err) => {
                log::error!("Failed to process Markdown file \"{}\": {}", id, err);
                None
            }
        }
    }
}

/// Returns true if `id` names a markdown file.
pub fn is_markdown(id: &str) -> bool {
    id.ends_with(MARKDOWN_EXTENSION)
}
