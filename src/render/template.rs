//! Placeholder template engine.
//!
//! Supported syntax:
//! - `{{path.to.value}}`: HTML-escaped substitution
//! - `{{#each list}} ... {{/each}}`: one pass per element, element bound to `this`
//! - `{{#if value}} ... {{/if}}`: body kept when the value is truthy
//!
//! Lookups never fail: unknown placeholders render as the empty string.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Text(String),
    Var(String),
    Each { path: String, body: Vec<Node> },
    If { path: String, body: Vec<Node> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Each,
    If,
}

impl BlockKind {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "each" => Some(Self::Each),
            "if" => Some(Self::If),
            _ => None,
        }
    }
}

fn tag_regex() -> Option<&'static Regex> {
    static TAG: OnceLock<Option<Regex>> = OnceLock::new();
    TAG.get_or_init(|| {
        Regex::new(r"\{\{\s*([#/]?)\s*([A-Za-z_][A-Za-z0-9_.\-]*)(?:\s+([A-Za-z_][A-Za-z0-9_.\-]*))?\s*\}\}")
            .ok()
    })
    .as_ref()
}

/// A parsed template, reusable across renders.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    nodes: Vec<Node>,
}

impl Template {
    /// Parse `source`. Parsing is lenient: a stray `{{/each}}` is dropped and
    /// an unclosed block runs to the end of the template.
    pub fn parse(source: &str) -> Self {
        let Some(tags) = tag_regex() else {
            return Self {
                nodes: vec![Node::Text(source.to_string())],
            };
        };
        // Stack of open blocks; the bottom frame is the template root.
        let mut stack: Vec<(Option<(BlockKind, String)>, Vec<Node>)> = vec![(None, Vec::new())];
        let mut cursor = 0;

        for caps in tags.captures_iter(source) {
            let Some(whole) = caps.get(0) else { continue };
            if whole.start() > cursor {
                push_node(&mut stack, Node::Text(source[cursor..whole.start()].to_string()));
            }
            cursor = whole.end();

            let sigil = caps.get(1).map_or("", |m| m.as_str());
            let name = caps.get(2).map_or("", |m| m.as_str());
            let arg = caps.get(3).map(|m| m.as_str().to_string());

            match sigil {
                "#" => match (BlockKind::from_name(name), arg) {
                    (Some(kind), Some(path)) => stack.push((Some((kind, path)), Vec::new())),
                    // Unknown helper or missing argument: render nothing for the tag.
                    _ => {}
                },
                "/" => {
                    let closes_top = matches!(
                        stack.last(),
                        Some((Some((kind, _)), _)) if Some(*kind) == BlockKind::from_name(name)
                    );
                    if closes_top {
                        close_block(&mut stack);
                    }
                }
                _ => push_node(&mut stack, Node::Var(name.to_string())),
            }
        }
        if cursor < source.len() {
            push_node(&mut stack, Node::Text(source[cursor..].to_string()));
        }
        while stack.len() > 1 {
            close_block(&mut stack);
        }

        let nodes = stack.pop().map(|(_, nodes)| nodes).unwrap_or_default();
        Self { nodes }
    }

    /// Render against a context object.
    pub fn render(&self, context: &Map<String, Value>) -> String {
        let root = Value::Object(context.clone());
        let mut out = String::new();
        render_nodes(&self.nodes, &root, None, &mut out);
        out
    }
}

fn push_node(stack: &mut [(Option<(BlockKind, String)>, Vec<Node>)], node: Node) {
    if let Some((_, nodes)) = stack.last_mut() {
        nodes.push(node);
    }
}

fn close_block(stack: &mut Vec<(Option<(BlockKind, String)>, Vec<Node>)>) {
    if let Some((Some((kind, path)), body)) = stack.pop() {
        let node = match kind {
            BlockKind::Each => Node::Each { path, body },
            BlockKind::If => Node::If { path, body },
        };
        push_node(stack, node);
    }
}

fn render_nodes(nodes: &[Node], root: &Value, this: Option<&Value>, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Var(path) => {
                if let Some(value) = lookup(root, this, path) {
                    out.push_str(&escape_html(&scalar_text(value)));
                }
            }
            Node::Each { path, body } => {
                if let Some(Value::Array(items)) = lookup(root, this, path) {
                    for item in items {
                        render_nodes(body, root, Some(item), out);
                    }
                }
            }
            Node::If { path, body } => {
                if lookup(root, this, path).is_some_and(is_truthy) {
                    render_nodes(body, root, this, out);
                }
            }
        }
    }
}

/// Resolve a dotted path. `this` refers to the current `#each` element; bare
/// names inside a block try the element first, then the root context.
fn lookup<'a>(root: &'a Value, this: Option<&'a Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    if first == "this" {
        return walk(this?, segments);
    }
    if let Some(found) = this.and_then(|t| walk(t, path.split('.'))) {
        return Some(found);
    }
    walk(root, path.split('.'))
}

fn walk<'a, 'p>(start: &'a Value, segments: impl Iterator<Item = &'p str>) -> Option<&'a Value> {
    segments.into_iter().try_fold(start, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => true,
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Parse and render in one step.
pub fn render_str(source: &str, context: &Map<String, Value>) -> String {
    Template::parse(source).render(context)
}
