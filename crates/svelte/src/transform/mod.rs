//! Markup-tree stage of the pipeline.
//!
//! - `components` - prose component wrapping and import injection
//! - `escape` - Svelte-safe escaping inside code and pre elements
//! - `script` - `<script>` block scanning used by the import injector

pub mod components;
pub mod escape;
pub mod script;

pub use components::ComponentsStage;
pub use escape::{EscapeStage, escape_verbatim};

use crate::hast::Node;
use crate::registry::ComponentRegistry;
use jana_core::{JanaError, ProcessingContext};
use std::sync::Arc;

/// A caller-supplied pass over the markup tree.
pub trait MarkupPass {
    /// Short name used in error messages.
    fn name(&self) -> &str {
        "markup-pass"
    }

    /// Mutate the markup tree in place.
    fn run(&self, tree: &mut Node, ctx: &mut ProcessingContext) -> Result<(), JanaError>;
}

impl<F> MarkupPass for F
where
    F: Fn(&mut Node, &mut ProcessingContext) -> Result<(), JanaError>,
{
    fn run(&self, tree: &mut Node, ctx: &mut ProcessingContext) -> Result<(), JanaError> {
        (self)(tree, ctx)
    }
}

/// Runs the markup-tree passes.
///
/// Extension passes run first, in registration order, followed by the
/// built-in component stage and escape stage.
pub struct MarkupPipeline {
    passes: Vec<Box<dyn MarkupPass + Send + Sync>>,
    components: ComponentsStage,
    escape: EscapeStage,
}

impl MarkupPipeline {
    /// Creates a pipeline wrapping elements listed in `registry`.
    pub fn new(registry: Arc<ComponentRegistry>) -> Self {
        Self {
            passes: Vec::new(),
            components: ComponentsStage::new(registry),
            escape: EscapeStage,
        }
    }

    /// Add an extension pass.
    pub fn add_pass<P: MarkupPass + Send + Sync + 'static>(&mut self, pass: P) {
        self.passes.push(Box::new(pass));
    }

    /// Add an already boxed extension pass.
    pub fn add_boxed_pass(&mut self, pass: Box<dyn MarkupPass + Send + Sync>) {
        self.passes.push(pass);
    }

    /// The registry used by the component stage.
    pub fn registry(&self) -> &ComponentRegistry {
        self.components.registry()
    }

    /// Run every pass over `tree`.
    pub fn run(&self, tree: &mut Node, ctx: &mut ProcessingContext) -> Result<(), JanaError> {
        for pass in &self.passes {
            log::trace!("running markup pass `{}`", pass.name());
            pass.run(tree, ctx)?;
        }

        self.components.run(tree, ctx);
        self.escape.run(tree);
        Ok(())
    }
}
