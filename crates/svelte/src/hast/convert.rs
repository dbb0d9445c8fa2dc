//! Conversion from the markdown document tree to the markup tree.
//!
//! Raw HTML nodes become `Raw` markup. Code blocks become
//! `<pre><code class="language-x">`; their meta string is not carried over
//! (it travels through the processing context instead).

use super::{Element, Node};
use markdown::mdast;
use std::collections::HashMap;

/// Converts a markdown document tree into a markup tree rooted at `Node::Root`.
pub fn to_hast(root: &mdast::Node) -> Node {
    let mut definitions = HashMap::new();
    collect_definitions(root, &mut definitions);

    let converter = Converter { definitions };
    match root {
        mdast::Node::Root(root) => Node::root(wrap(converter.all(&root.children), false)),
        other => Node::root(converter.node(other)),
    }
}

struct Definition {
    url: String,
    title: Option<String>,
}

fn collect_definitions(node: &mdast::Node, definitions: &mut HashMap<String, Definition>) {
    if let mdast::Node::Definition(definition) = node {
        definitions
            .entry(definition.identifier.to_lowercase())
            .or_insert_with(|| Definition {
                url: definition.url.clone(),
                title: definition.title.clone(),
            });
    }
    if let Some(children) = node.children() {
        for child in children {
            collect_definitions(child, definitions);
        }
    }
}

/// Joins block nodes with newline text, optionally padding both ends.
fn wrap(nodes: Vec<Node>, loose: bool) -> Vec<Node> {
    if nodes.is_empty() {
        return nodes;
    }
    let mut result = Vec::with_capacity(nodes.len() * 2 + 1);
    if loose {
        result.push(Node::text("\n"));
    }
    for (index, node) in nodes.into_iter().enumerate() {
        if index > 0 {
            result.push(Node::text("\n"));
        }
        result.push(node);
    }
    if loose {
        result.push(Node::text("\n"));
    }
    result
}

struct Converter {
    definitions: HashMap<String, Definition>,
}

impl Converter {
    fn all(&self, nodes: &[mdast::Node]) -> Vec<Node> {
        nodes.iter().flat_map(|node| self.node(node)).collect()
    }

    fn node(&self, node: &mdast::Node) -> Vec<Node> {
        use mdast::Node as Md;

        match node {
            Md::Root(root) => wrap(self.all(&root.children), false),
            Md::Paragraph(paragraph) => vec![Node::element("p", self.all(&paragraph.children))],
            Md::Heading(heading) => vec![Node::element(
                format!("h{}", heading.depth),
                self.all(&heading.children),
            )],
            Md::ThematicBreak(_) => vec![Node::element("hr", Vec::new())],
            Md::Blockquote(quote) => vec![Node::element(
                "blockquote",
                wrap(self.all(&quote.children), true),
            )],
            Md::List(list) => vec![self.list(list)],
            Md::ListItem(item) => vec![self.list_item(item, item.spread)],
            Md::Code(code) => vec![code_block(code)],
            Md::Html(html) => vec![Node::raw(html.value.clone())],
            Md::Text(text) => vec![Node::text(text.value.clone())],
            Md::Emphasis(emphasis) => vec![Node::element("em", self.all(&emphasis.children))],
            Md::Strong(strong) => vec![Node::element("strong", self.all(&strong.children))],
            Md::Delete(delete) => vec![Node::element("del", self.all(&delete.children))],
            Md::InlineCode(code) => {
                vec![Node::element("code", vec![Node::text(code.value.clone())])]
            }
            Md::Break(_) => vec![Node::element("br", Vec::new()), Node::text("\n")],
            Md::Link(link) => vec![anchor(
                &link.url,
                link.title.as_deref(),
                self.all(&link.children),
            )],
            Md::Image(image) => vec![img(&image.url, &image.alt, image.title.as_deref())],
            Md::LinkReference(reference) => {
                let children = self.all(&reference.children);
                match self.definition(&reference.identifier) {
                    Some(definition) => vec![anchor(
                        &definition.url,
                        definition.title.as_deref(),
                        children,
                    )],
                    None => {
                        let mut reverted = vec![Node::text("[")];
                        reverted.extend(children);
                        reverted.push(Node::text("]"));
                        reverted
                    }
                }
            }
            Md::ImageReference(reference) => match self.definition(&reference.identifier) {
                Some(definition) => vec![img(
                    &definition.url,
                    &reference.alt,
                    definition.title.as_deref(),
                )],
                None => vec![Node::text(format!("![{}]", reference.alt))],
            },
            Md::Definition(_) => Vec::new(),
            Md::Table(table) => vec![self.table(table)],
            other => {
                log::warn!("Unhandled markdown node type: {:?}", other);
                other
                    .children()
                    .map(|children| self.all(children))
                    .unwrap_or_default()
            }
        }
    }

    fn definition(&self, identifier: &str) -> Option<&Definition> {
        self.definitions.get(&identifier.to_lowercase())
    }

    fn list(&self, list: &mdast::List) -> Node {
        let loose = list.spread
            || list
                .children
                .iter()
                .any(|child| matches!(child, mdast::Node::ListItem(item) if item.spread));

        let items: Vec<Node> = list
            .children
            .iter()
            .map(|child| match child {
                mdast::Node::ListItem(item) => self.list_item(item, loose),
                other => Node::root(self.node(other)),
            })
            .collect();

        let mut element = Element::new(if list.ordered { "ol" } else { "ul" }, wrap(items, true));
        if list.ordered
            && let Some(start) = list.start
            && start != 1
        {
            element = element.with_property("start", super::PropertyValue::Number(start.into()));
        }
        if list.children.iter().any(|child| {
            matches!(child, mdast::Node::ListItem(item) if item.checked.is_some())
        }) {
            element = element.with_property("class", "contains-task-list");
        }
        Node::Element(element)
    }

    /// Tight items drop their paragraph wrappers; loose items keep them.
    fn list_item(&self, item: &mdast::ListItem, loose: bool) -> Node {
        let mut blocks: Vec<Node> = Vec::new();
        for child in &item.children {
            match child {
                mdast::Node::Paragraph(paragraph) if !loose => {
                    blocks.push(Node::root(self.all(&paragraph.children)));
                }
                other => blocks.extend(self.node(other)),
            }
        }

        // Tight paragraph content was boxed in a temporary root to keep it a single block.
        let mut children: Vec<Node> = wrap(blocks, loose)
            .into_iter()
            .flat_map(|node| match node {
                Node::Root(root) => root.children,
                other => vec![other],
            })
            .collect();

        let mut element = Element::new("li", Vec::new());
        if let Some(checked) = item.checked {
            element = element.with_property("class", "task-list-item");
            let checkbox = Element::new("input", Vec::new())
                .with_property("type", "checkbox")
                .with_property("checked", checked)
                .with_property("disabled", true);
            let insert_at = children
                .iter()
                .position(|node| match node {
                    Node::Element(el) => el.tag_name == "p",
                    _ => false,
                });
            match insert_at {
                Some(index) => {
                    if let Node::Element(paragraph) = &mut children[index] {
                        paragraph.children.insert(0, Node::text(" "));
                        paragraph.children.insert(0, Node::Element(checkbox));
                    }
                }
                None => {
                    let first_content = usize::from(loose);
                    let at = first_content.min(children.len());
                    children.insert(at, Node::text(" "));
                    children.insert(at, Node::Element(checkbox));
                }
            }
        }
        element.children = children;
        Node::Element(element)
    }

    fn table(&self, table: &mdast::Table) -> Node {
        let mut rows = table.children.iter().filter_map(|row| match row {
            mdast::Node::TableRow(row) => Some(row),
            _ => None,
        });

        let mut sections = Vec::new();
        if let Some(head) = rows.next() {
            let row = self.table_row(head, &table.align, "th");
            sections.push(Node::element("thead", wrap(vec![row], true)));
        }
        let body: Vec<Node> = rows
            .map(|row| self.table_row(row, &table.align, "td"))
            .collect();
        if !body.is_empty() {
            sections.push(Node::element("tbody", wrap(body, true)));
        }

        Node::element("table", wrap(sections, true))
    }

    fn table_row(&self, row: &mdast::TableRow, align: &[mdast::AlignKind], tag: &str) -> Node {
        let cells = row
            .children
            .iter()
            .enumerate()
            .map(|(index, cell)| {
                let children = cell
                    .children()
                    .map(|children| self.all(children))
                    .unwrap_or_default();
                let mut element = Element::new(tag, children);
                let alignment = match align.get(index) {
                    Some(mdast::AlignKind::Left) => Some("left"),
                    Some(mdast::AlignKind::Right) => Some("right"),
                    Some(mdast::AlignKind::Center) => Some("center"),
                    Some(mdast::AlignKind::None) | None => None,
                };
                if let Some(alignment) = alignment {
                    element = element.with_property("align", alignment);
                }
                Node::Element(element)
            })
            .collect();
        Node::element("tr", wrap(cells, true))
    }
}

fn code_block(code: &mdast::Code) -> Node {
    let mut value = code.value.clone();
    if !value.is_empty() {
        value.push('\n');
    }

    let mut inner = Element::new("code", vec![Node::text(value)]);
    if let Some(lang) = &code.lang {
        inner = inner.with_property("class", format!("language-{}", lang));
    }
    Node::element("pre", vec![Node::Element(inner)])
}

fn anchor(url: &str, title: Option<&str>, children: Vec<Node>) -> Node {
    let mut element = Element::new("a", children).with_property("href", url);
    if let Some(title) = title {
        element = element.with_property("title", title);
    }
    Node::Element(element)
}

fn img(url: &str, alt: &str, title: Option<&str>) -> Node {
    let mut element = Element::new("img", Vec::new())
        .with_property("src", url)
        .with_property("alt", alt);
    if let Some(title) = title {
        element = element.with_property("title", title);
    }
    Node::Element(element)
}
