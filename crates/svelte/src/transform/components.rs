//! Wraps prose elements in their Svelte components and imports those components.

use super::script::{Import, add_imports, instance_script, is_instance_script, is_module_script};
use crate::hast::{Element, Node, Properties, PropertyValue};
use crate::registry::{ComponentEntry, ComponentRegistry};
use indexmap::IndexMap;
use jana_core::{CodeMeta, MetaValue, ProcessingContext};
use std::sync::Arc;

/// Tag whose wrapper receives the collected code-fence meta.
const PRE_TAG: &str = "pre";

/// Replaces registered elements with `<Component><element/></Component>` and
/// adds the matching default imports to the instance script.
///
/// ```text
/// <p>Hello</p>   =>   <script>
///                     import P from "$lib/components/prose/P.svelte"
///                     </script>
///                     <P><p>Hello</p></P>
/// ```
#[derive(Debug, Clone)]
pub struct ComponentsStage {
    registry: Arc<ComponentRegistry>,
}

/// Bookkeeping for a single run over one tree.
#[derive(Default)]
struct WrapState<'r> {
    /// Next side-channel position for `pre` wrappers.
    pre_cursor: usize,
    /// Components used so far, keyed by import path in first-use order.
    used: IndexMap<&'r str, &'r ComponentEntry>,
}

impl ComponentsStage {
    /// Creates a stage backed by a shared registry.
    pub fn new(registry: Arc<ComponentRegistry>) -> Self {
        Self { registry }
    }

    /// The registry this stage wraps against.
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Wraps matching elements of `tree` and injects imports for every component used.
    pub fn run(&self, tree: &mut Node, ctx: &ProcessingContext) {
        if self.registry.is_empty() {
            return;
        }

        let mut state = WrapState::default();
        if let Some(children) = tree.children_mut() {
            self.wrap_children(children, ctx, &mut state);
        }

        if state.used.is_empty() {
            return;
        }
        log::debug!(
            "wrapped prose elements with {} component(s){}",
            state.used.len(),
            ctx.id
                .as_deref()
                .map(|id| format!(" in {}", id))
                .unwrap_or_default()
        );

        let imports: Vec<Import<'_>> = state
            .used
            .values()
            .map(|entry| Import {
                binding: &entry.name,
                source: &entry.path,
            })
            .collect();
        if let Some(children) = tree.children_mut() {
            inject_imports(children, &imports);
        }
    }

    fn wrap_children<'r>(
        &'r self,
        children: &mut [Node],
        ctx: &ProcessingContext,
        state: &mut WrapState<'r>,
    ) {
        for child in children.iter_mut() {
            let entry = match child {
                Node::Element(element) => self.registry.get(&element.tag_name),
                _ => None,
            };

            let Some(entry) = entry else {
                if let Some(grandchildren) = child.children_mut() {
                    self.wrap_children(grandchildren, ctx, state);
                }
                continue;
            };

            let properties = if entry.tag == PRE_TAG {
                let position = state.pre_cursor;
                state.pre_cursor += 1;
                ctx.code_meta_at(position)
                    .map(meta_properties)
                    .unwrap_or_default()
            } else {
                Properties::new()
            };

            state.used.entry(entry.path.as_str()).or_insert(entry);

            // The wrapper is capitalized and never matches; only the original's
            // descendants are visited.
            if let Some(grandchildren) = child.children_mut() {
                self.wrap_children(grandchildren, ctx, state);
            }

            let original = std::mem::replace(child, Node::root(Vec::new()));
            *child = Node::Element(Element {
                tag_name: entry.name.clone(),
                properties,
                children: vec![original],
            });
        }
    }
}

/// Converts parsed code-fence meta into wrapper properties.
fn meta_properties(meta: &CodeMeta) -> Properties {
    meta.iter()
        .map(|(key, value)| {
            let value = match value {
                MetaValue::Flag => PropertyValue::Bool(true),
                MetaValue::Text(text) => PropertyValue::String(text.clone()),
            };
            (key.clone(), value)
        })
        .collect()
}

/// Adds `imports` to the first top-level instance script, creating one if needed.
///
/// A created script goes first, or right after the last top-level module script.
fn inject_imports(children: &mut Vec<Node>, imports: &[Import<'_>]) {
    let existing = children.iter_mut().find_map(|node| match node {
        Node::Raw(raw) if is_instance_script(&raw.value) => Some(raw),
        _ => None,
    });

    if let Some(raw) = existing {
        if let Some(updated) = add_imports(&raw.value, imports) {
            raw.value = updated;
        }
        return;
    }

    let position = children
        .iter()
        .rposition(|node| matches!(node, Node::Raw(raw) if is_module_script(&raw.value)))
        .map_or(0, |index| index + 1);
    let script = Node::raw(instance_script(imports));
    if position == 0 {
        children.insert(0, Node::text("\n"));
        children.insert(0, script);
    } else {
        children.insert(position, script);
        children.insert(position, Node::text("\n"));
    }
}
