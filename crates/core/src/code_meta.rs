//! Collects fenced code block meta into the processing context.
//!
//! The markup tree loses the meta string, so it is parsed here and later
//! attached, by position, to the component wrapping each `<pre>`.

use crate::context::ProcessingContext;
use crate::meta::parse_meta;
use markdown::mdast::Node;

/// Appends one entry per code block, in document order, to `ctx.code_meta`.
///
/// Blocks without a meta string contribute `None` so positions stay aligned.
/// The tree is not modified.
pub fn collect_code_meta(root: &Node, ctx: &mut ProcessingContext) {
    let entries = ctx.code_meta_mut();
    visit(root, &mut |meta| entries.push(meta.map(parse_meta)));
}

fn visit(node: &Node, push: &mut impl FnMut(Option<&str>)) {
    if let Node::Code(code) = node {
        push(code.meta.as_deref());
    }
    if let Some(children) = node.children() {
        for child in children {
            visit(child, push);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::MetaValue;
    use crate::parse::{ParseOptions, parse_mdast};

    fn collect(markdown: &str) -> Vec<Option<crate::meta::CodeMeta>> {
        let tree = parse_mdast(markdown, &ParseOptions::default()).unwrap();
        let mut ctx = ProcessingContext::new();
        collect_code_meta(&tree, &mut ctx);
        ctx.code_meta.unwrap()
    }

    #[test]
    fn collects_meta_after_language() {
        let entries = collect("```js title=\"test\" highlight\nlet x = 1;\n```\n");
        assert_eq!(entries.len(), 1);
        let meta = entries[0].as_ref().unwrap();
        assert_eq!(meta.get("title"), Some(&MetaValue::from("test")));
        assert_eq!(meta.get("highlight"), Some(&MetaValue::Flag));
    }

    #[test]
    fn pushes_none_for_blocks_without_meta() {
        let entries = collect("```\nplain\n```\n\n```rust\nfn main() {}\n```\n");
        assert_eq!(entries, vec![None, None]);
    }

    #[test]
    fn keeps_document_order_across_nesting() {
        let source = "```js first\na\n```\n\n> ```\n> b\n> ```\n\n- item\n\n  ```sh third\n  c\n  ```\n";
        let entries = collect(source);
        assert_eq!(entries.len(), 3);
        assert!(entries[0].as_ref().unwrap().contains_key("first"));
        assert!(entries[1].is_none());
        assert!(entries[2].as_ref().unwrap().contains_key("third"));
    }

    #[test]
    fn initializes_and_extends_side_channel() {
        let mut ctx = ProcessingContext::new();
        assert!(ctx.code_meta.is_none());

        let tree = parse_mdast("# No code here", &ParseOptions::default()).unwrap();
        collect_code_meta(&tree, &mut ctx);
        assert_eq!(ctx.code_meta.as_deref(), Some(&[][..]));

        let tree = parse_mdast("```ts lang=ts\nx\n```", &ParseOptions::default()).unwrap();
        collect_code_meta(&tree, &mut ctx);
        assert_eq!(ctx.code_meta.as_ref().map(Vec::len), Some(1));
        assert!(ctx.code_meta_at(0).is_some());
    }
}
