//! Lifts component markup out of paragraph wrappers.
//!
//! markdown-rs wraps inline HTML in a paragraph when it cannot start an HTML
//! block, which turns `<Callout type="tip" />` into
//! `<p><Callout type="tip" /></p>`. Svelte components must not end up inside
//! `<p>`, so a paragraph whose only child is a capitalized tag is replaced by
//! that child.

use markdown::mdast::{Html, Node};
use once_cell::sync::Lazy;
use regex::Regex;

static COMPONENT_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^<\s*[A-Z][\w-]*(?:\s+[^>]*)?\s*/?>").expect("component tag pattern is valid")
});

/// Returns true if `html` starts with an opening or self-closing capitalized tag.
pub fn is_component_tag(html: &str) -> bool {
    COMPONENT_TAG.is_match(html)
}

/// Replaces single-child paragraphs holding component markup with the markup itself.
///
/// The root has no parent and is never replaced. Running this twice yields
/// the same tree as running it once.
pub fn promote_component_blocks(root: &mut Node) {
    if let Some(children) = root.children_mut() {
        promote_in(children);
    }
}

fn promote_in(children: &mut [Node]) {
    for child in children.iter_mut() {
        if let Some(html) = promotable_html(child) {
            *child = Node::Html(html);
            continue;
        }
        if let Some(grandchildren) = child.children_mut() {
            promote_in(grandchildren);
        }
    }
}

fn promotable_html(node: &Node) -> Option<Html> {
    let Node::Paragraph(paragraph) = node else {
        return None;
    };
    let [Node::Html(html)] = paragraph.children.as_slice() else {
        return None;
    };
    is_component_tag(&html.value).then(|| html.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use markdown::mdast::{Paragraph, Root, Text};

    fn html(value: &str) -> Node {
        Node::Html(Html {
            value: value.to_string(),
            position: None,
        })
    }

    fn text(value: &str) -> Node {
        Node::Text(Text {
            value: value.to_string(),
            position: None,
        })
    }

    fn paragraph(children: Vec<Node>) -> Node {
        Node::Paragraph(Paragraph {
            children,
            position: None,
        })
    }

    fn root(children: Vec<Node>) -> Node {
        Node::Root(Root {
            children,
            position: None,
        })
    }

    #[test]
    fn matches_capitalized_tags_only() {
        assert!(is_component_tag("<MyComponent />"));
        assert!(is_component_tag(r#"<Card title="x">"#));
        assert!(is_component_tag("< Tabs>"));
        assert!(is_component_tag("<Data-Table/>"));
        assert!(!is_component_tag("<div>"));
        assert!(!is_component_tag("text <Card />"));
        assert!(!is_component_tag("</Card>"));
    }

    #[test]
    fn unwraps_component_paragraph() {
        let mut tree = root(vec![paragraph(vec![html(r#"<MyComponent prop="value" />"#)])]);
        promote_component_blocks(&mut tree);

        let children = tree.children().unwrap();
        assert_eq!(children.len(), 1);
        assert!(
            matches!(&children[0], Node::Html(h) if h.value == r#"<MyComponent prop="value" />"#)
        );
    }

    #[test]
    fn leaves_lowercase_html_and_multi_child_paragraphs() {
        let lower = paragraph(vec![html("<span>")]);
        let multi = paragraph(vec![html("<Card />"), text(" trailing")]);
        let mut tree = root(vec![lower.clone(), multi.clone()]);
        promote_component_blocks(&mut tree);

        assert_eq!(tree.children().unwrap(), &vec![lower, multi]);
    }

    #[test]
    fn leaves_single_text_child_alone() {
        let para = paragraph(vec![text("<Card />")]);
        let mut tree = root(vec![para.clone()]);
        promote_component_blocks(&mut tree);
        assert_eq!(tree.children().unwrap(), &vec![para]);
    }

    #[test]
    fn promotes_nested_paragraphs() {
        let quote = Node::Blockquote(markdown::mdast::Blockquote {
            children: vec![paragraph(vec![html("<Badge />")])],
            position: None,
        });
        let mut tree = root(vec![quote]);
        promote_component_blocks(&mut tree);

        let Node::Blockquote(quote) = &tree.children().unwrap()[0] else {
            panic!("expected blockquote");
        };
        assert!(matches!(&quote.children[0], Node::Html(_)));
    }

    #[test]
    fn is_idempotent() {
        let mut once = root(vec![
            paragraph(vec![html("<Card />")]),
            paragraph(vec![text("plain")]),
        ]);
        promote_component_blocks(&mut once);
        let mut twice = once.clone();
        promote_component_blocks(&mut twice);
        assert_eq!(once, twice);
    }

    #[test]
    fn root_paragraph_without_parent_is_untouched() {
        let mut lone = paragraph(vec![html("<Card />")]);
        promote_component_blocks(&mut lone);
        assert!(matches!(lone, Node::Paragraph(_)));
    }
}
