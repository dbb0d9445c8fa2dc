//! Markdown parsing and the document-tree stage of the pipeline.

use crate::code_meta::collect_code_meta;
use crate::context::ProcessingContext;
use crate::promote::promote_component_blocks;
use crate::{JanaError, SourceLocation};
use markdown::mdast::Node;
use markdown::message::{Message, Place};

/// Parser options for building markdown-rs parse options.
#[derive(Clone, Copy, Debug)]
pub struct ParseOptions {
    /// Enable GitHub Flavored Markdown constructs.
    pub gfm: bool,
    /// Enable indented code blocks.
    pub code_indented: bool,
    /// Allow raw HTML nodes in the AST.
    pub raw_html: bool,
}

impl ParseOptions {
    /// CommonMark defaults: raw HTML and indented code enabled, no GFM.
    pub const fn commonmark() -> Self {
        Self {
            gfm: false,
            code_indented: true,
            raw_html: true,
        }
    }

    /// CommonMark plus GFM tables, strikethrough, autolinks and task lists.
    pub const fn gfm() -> Self {
        Self {
            gfm: true,
            ..Self::commonmark()
        }
    }

    /// Convert to markdown-rs `ParseOptions`.
    pub fn to_markdown(self) -> markdown::ParseOptions {
        let mut constructs = markdown::Constructs {
            code_indented: self.code_indented,
            html_flow: self.raw_html,
            html_text: self.raw_html,
            ..Default::default()
        };

        if self.gfm {
            constructs.gfm_autolink_literal = true;
            constructs.gfm_strikethrough = true;
            constructs.gfm_table = true;
            constructs.gfm_task_list_item = true;
        }

        markdown::ParseOptions {
            constructs,
            ..markdown::ParseOptions::default()
        }
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::commonmark()
    }
}

/// A caller-supplied pass over the parsed document tree.
pub trait DocumentPass {
    /// Short name used in error messages.
    fn name(&self) -> &str {
        "document-pass"
    }

    /// Mutate the document tree in place.
    fn run(&self, root: &mut Node, ctx: &mut ProcessingContext) -> Result<(), JanaError>;
}

impl<F> DocumentPass for F
where
    F: Fn(&mut Node, &mut ProcessingContext) -> Result<(), JanaError>,
{
    fn run(&self, root: &mut Node, ctx: &mut ProcessingContext) -> Result<(), JanaError> {
        (self)(root, ctx)
    }
}

/// Parses markdown and runs the document-tree passes.
///
/// Extension passes run first, in registration order, followed by the
/// built-in code-meta collector and component-block promoter.
pub struct DocumentPipeline {
    options: ParseOptions,
    passes: Vec<Box<dyn DocumentPass + Send + Sync>>,
}

impl DocumentPipeline {
    /// Create a new pipeline from core parse options.
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            passes: Vec::new(),
        }
    }

    /// Add an extension pass.
    pub fn add_pass<P: DocumentPass + Send + Sync + 'static>(&mut self, pass: P) {
        self.passes.push(Box::new(pass));
    }

    /// Add an already boxed extension pass.
    pub fn add_boxed_pass(&mut self, pass: Box<dyn DocumentPass + Send + Sync>) {
        self.passes.push(pass);
    }

    /// Parse markdown into a document tree and run every pass over it.
    pub fn run(&self, input: &str, ctx: &mut ProcessingContext) -> Result<Node, JanaError> {
        let mut root = parse_mdast(input, &self.options)?;
        for pass in &self.passes {
            log::trace!("running document pass `{}`", pass.name());
            pass.run(&mut root, ctx)?;
        }

        collect_code_meta(&root, ctx);
        promote_component_blocks(&mut root);

        Ok(root)
    }
}

impl Default for DocumentPipeline {
    fn default() -> Self {
        Self::new(ParseOptions::default())
    }
}

/// Parse markdown into an MDAST tree using core options.
pub fn parse_mdast(input: &str, options: &ParseOptions) -> Result<Node, JanaError> {
    parse_mdast_with_options(input, &options.to_markdown())
}

/// Parse markdown into an MDAST tree using markdown-rs `ParseOptions`.
pub fn parse_mdast_with_options(
    input: &str,
    options: &markdown::ParseOptions,
) -> Result<Node, JanaError> {
    markdown::to_mdast(input, options).map_err(|err| JanaError::MarkdownAdapter {
        message: err.to_string(),
        location: message_location(&err),
    })
}

fn message_location(message: &Message) -> SourceLocation {
    match &message.place {
        Some(place) => match place.as_ref() {
            Place::Point(point) => SourceLocation::new(point.line, point.column),
            Place::Position(position) => {
                SourceLocation::new(position.start.line, position.start.column)
            }
        },
        None => SourceLocation::new(1, 1),
    }
}
