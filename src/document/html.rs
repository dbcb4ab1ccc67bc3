use scraper::{ElementRef, Html, Node};

use super::model::{Block, List, ListItem, Table, TableRow};

/// Elements that make a `div` or `blockquote` a container rather than a
/// single paragraph.
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "table", "img",
    "blockquote", "pre", "section", "article", "header", "footer", "main", "aside",
    "figure", "nav",
];

const IGNORED_TAGS: &[&str] = &["br", "hr", "script", "style", "head", "title", "meta", "link"];

/// Elements whose text sits on its own line, so it never runs into its
/// neighbours.
const TEXT_BREAKS: &[&str] = &["li", "tr", "td", "th", "dt", "dd"];

/// Walks the HTML body depth-first and maps each element to a document block.
pub fn parse_html(html: &str) -> Vec<Block> {
    let document = Html::parse_document(html);
    let root = document.root_element();
    let start = root
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|element| element.value().name() == "body")
        .unwrap_or(root);

    let mut blocks = Vec::new();
    walk_children(start, &mut blocks);
    blocks
}

fn walk_children(element: ElementRef, blocks: &mut Vec<Block>) {
    for child in element.children().filter_map(ElementRef::wrap) {
        walk_element(child, blocks);
    }
}

fn walk_element(element: ElementRef, blocks: &mut Vec<Block>) {
    let name = element.value().name();
    match name {
        "p" => push_paragraph(element, blocks),
        "div" => walk_mixed(element, blocks),
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = name[1..].parse::<u8>().unwrap_or(1);
            let text = text_of(element);
            if !text.is_empty() {
                blocks.push(Block::Heading { level, text });
            }
            push_images(element, blocks);
        }
        "ul" | "ol" => {
            let list = parse_list(element, name == "ol");
            if !list.items.is_empty() {
                blocks.push(Block::List(list));
            }
        }
        "table" => {
            let table = parse_table(element);
            if !table.rows.is_empty() {
                blocks.push(Block::Table(table));
            }
        }
        "img" => push_image(element, blocks),
        "blockquote" => {
            let mut inner = Vec::new();
            walk_mixed(element, &mut inner);
            blocks.extend(inner.into_iter().map(|block| match block {
                Block::Paragraph(text) => Block::Quote(text),
                other => other,
            }));
        }
        "pre" => {
            let code = element.text().collect::<String>();
            let code = code.trim_matches('\n');
            if !code.trim().is_empty() {
                blocks.push(Block::Code(code.to_string()));
            }
        }
        tag if IGNORED_TAGS.contains(&tag) => {}
        _ => walk_children(element, blocks),
    }
}

fn push_paragraph(element: ElementRef, blocks: &mut Vec<Block>) {
    let text = text_of(element);
    if !text.is_empty() {
        blocks.push(Block::Paragraph(text));
    }
    push_images(element, blocks);
}

/// Block children are walked in place; each run of loose text between them
/// becomes a paragraph.
fn walk_mixed(element: ElementRef, blocks: &mut Vec<Block>) {
    if !has_block_children(element) {
        push_paragraph(element, blocks);
        return;
    }

    let mut text = String::new();
    let mut images = Vec::new();
    for node in element.children() {
        match ElementRef::wrap(node) {
            Some(child) if BLOCK_TAGS.contains(&child.value().name()) => {
                flush_paragraph(&mut text, &mut images, blocks);
                walk_element(child, blocks);
            }
            Some(child) => {
                collect_element(child, &mut text);
                push_images(child, &mut images);
            }
            None => {
                if let Node::Text(t) = node.value() {
                    text.push_str(t);
                }
            }
        }
    }
    flush_paragraph(&mut text, &mut images, blocks);
}

fn flush_paragraph(text: &mut String, images: &mut Vec<Block>, blocks: &mut Vec<Block>) {
    let paragraph = normalize(text);
    if !paragraph.is_empty() {
        blocks.push(Block::Paragraph(paragraph));
    }
    blocks.append(images);
    text.clear();
}

/// Images nested anywhere below `element`, in document order.
fn push_images(element: ElementRef, blocks: &mut Vec<Block>) {
    for image in element
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .filter(|e| e.value().name() == "img")
    {
        push_image(image, blocks);
    }
}

fn push_image(element: ElementRef, blocks: &mut Vec<Block>) {
    match element.value().attr("src").map(str::trim) {
        Some(src) if !src.is_empty() => blocks.push(Block::Image { src: src.to_string() }),
        _ => log::debug!("img without src ignored"),
    }
}

fn has_block_children(element: ElementRef) -> bool {
    element
        .children()
        .filter_map(ElementRef::wrap)
        .any(|child| BLOCK_TAGS.contains(&child.value().name()))
}

/// Only direct `li` children are items; a nested `ul`/`ol` directly inside
/// an item becomes one of its child lists.
fn parse_list(element: ElementRef, ordered: bool) -> List {
    let mut items = Vec::new();

    for li in element
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|e| e.value().name() == "li")
    {
        let mut text = String::new();
        let mut children = Vec::new();

        for node in li.children() {
            match ElementRef::wrap(node) {
                Some(child) if matches!(child.value().name(), "ul" | "ol") => {
                    let list = parse_list(child, child.value().name() == "ol");
                    if !list.items.is_empty() {
                        children.push(list);
                    }
                }
                Some(child) => collect_element(child, &mut text),
                None => {
                    if let Node::Text(t) = node.value() {
                        text.push_str(t);
                    }
                }
            }
        }

        let text = normalize(&text);
        if text.is_empty() && children.is_empty() {
            continue;
        }
        items.push(ListItem { text, children });
    }

    List { ordered, items }
}

fn parse_table(element: ElementRef) -> Table {
    let mut rows = Vec::new();

    for tr in table_rows(element) {
        let cells = tr
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|cell| matches!(cell.value().name(), "th" | "td"))
            .collect::<Vec<_>>();
        if cells.is_empty() {
            continue;
        }

        let header = rows.is_empty() && cells.iter().all(|cell| cell.value().name() == "th");
        let cells = cells.into_iter().map(text_of).collect();
        rows.push(TableRow { cells, header });
    }

    Table { rows }
}

/// Rows of this table only, looking through `thead`/`tbody`/`tfoot` but
/// never into nested tables.
fn table_rows(table: ElementRef) -> Vec<ElementRef> {
    let mut rows = Vec::new();
    for child in table.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => rows.extend(
                child
                    .children()
                    .filter_map(ElementRef::wrap)
                    .filter(|e| e.value().name() == "tr"),
            ),
            _ => {}
        }
    }
    rows
}

/// Text of `element` with whitespace collapsed.
fn text_of(element: ElementRef) -> String {
    let mut text = String::new();
    collect_text(element, &mut text);
    normalize(&text)
}

fn collect_text(element: ElementRef, out: &mut String) {
    for node in element.children() {
        match ElementRef::wrap(node) {
            Some(child) => collect_element(child, out),
            None => {
                if let Node::Text(t) = node.value() {
                    out.push_str(t);
                }
            }
        }
    }
}

/// Inline elements add their text as is; line-level elements are padded
/// with spaces.
fn collect_element(element: ElementRef, out: &mut String) {
    let name = element.value().name();
    if matches!(name, "br" | "hr") {
        out.push(' ');
        return;
    }
    if IGNORED_TAGS.contains(&name) {
        return;
    }

    let breaks = BLOCK_TAGS.contains(&name) || TEXT_BREAKS.contains(&name);
    if breaks {
        out.push(' ');
    }
    collect_text(element, out);
    if breaks {
        out.push(' ');
    }
}

fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
