use std::collections::HashMap;
use std::path::Path;
use std::{fs::File, io::Read};

use base64::{engine::general_purpose, Engine as _};
use docx_rs::{
    read_docx, Bold, DocumentChild, Docx, DrawingData, Hyperlink, HyperlinkData, Italic,
    Paragraph, ParagraphChild, RunChild, Table, TableCellContent, TableChild, TableRowChild,
};

use super::entities::encode_text;

const TABLE_CLASS: &str = "table table-hover table-responsive";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Bullet,
    Ordered,
}

impl ListKind {
    fn tag(self) -> &'static str {
        match self {
            ListKind::Bullet => "ul",
            ListKind::Ordered => "ol",
        }
    }
}

pub fn extract(path: &Path) -> anyhow::Result<String> {
    let mut file = File::open(path)?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)?;
    docx_to_html(&buffer)
}

pub fn docx_to_html(bytes: &[u8]) -> anyhow::Result<String> {
    let document = read_docx(bytes)?;
    let kinds = list_kinds(&document);
    let relations = Relations::of(&document);

    let mut html = String::new();
    let mut lists = ListWriter::default();

    for child in &document.document.children {
        match child {
            DocumentChild::Paragraph(p) => {
                let content = paragraph_content(p, true, &relations);
                if let Some((num_id, level)) = numbering(p) {
                    let kind = kinds
                        .get(&(num_id, level))
                        .or_else(|| kinds.get(&(num_id, 0)))
                        .copied()
                        .unwrap_or(ListKind::Bullet);
                    lists.push_item(&mut html, kind, level, &content);
                    continue;
                }

                lists.close_all(&mut html);
                if content.trim().is_empty() {
                    continue;
                }
                let tag = block_tag(p);
                let content = if tag == "pre" {
                    content.replace("<br />", "\n")
                } else {
                    content
                };
                html.push_str(&format!("<{tag}>{content}</{tag}>"));
            }
            DocumentChild::Table(table) => {
                lists.close_all(&mut html);
                write_table(&mut html, table, &relations);
            }
            _ => {}
        }
    }
    lists.close_all(&mut html);

    Ok(html)
}

fn block_tag(p: &Paragraph) -> &'static str {
    let style = p.property.style.as_ref().map(|s| s.val.as_str()).unwrap_or("");
    match style {
        "Title" | "Heading1" => "h1",
        "Heading2" => "h2",
        "Heading3" => "h3",
        "Heading4" => "h4",
        "Heading5" => "h5",
        "Heading6" => "h6",
        "Quote" | "IntenseQuote" => "blockquote",
        "Code" => "pre",
        _ => "p",
    }
}

fn numbering(p: &Paragraph) -> Option<(usize, usize)> {
    let numbering = p.property.numbering_property.as_ref()?;
    let id = numbering.id.as_ref()?.id;
    // numId 0 switches numbering off for the paragraph
    if id == 0 {
        return None;
    }
    let level = numbering.level.as_ref().map(|l| l.val).unwrap_or(0);
    Some((id, level))
}

/// (numId, level) -> list kind, resolved through the abstract definitions.
fn list_kinds(document: &Docx) -> HashMap<(usize, usize), ListKind> {
    let mut kinds = HashMap::new();
    for numbering in &document.numberings.numberings {
        let Some(abstract_num) = document
            .numberings
            .abstract_nums
            .iter()
            .rev()
            .find(|a| a.id == numbering.abstract_num_id)
        else {
            continue;
        };
        for level in &abstract_num.levels {
            let kind = if level.format.val == "bullet" {
                ListKind::Bullet
            } else {
                ListKind::Ordered
            };
            kinds.insert((numbering.id, level.level), kind);
        }
    }
    kinds
}

/// Pictures and link targets of the document, by relationship id.
struct Relations {
    images: HashMap<String, String>,
    links: HashMap<String, String>,
}

impl Relations {
    fn of(document: &Docx) -> Self {
        let images = document
            .images
            .iter()
            .filter_map(|(rid, path, original, _)| match data_url(&original.0) {
                Some(url) => Some((rid.clone(), url)),
                None => {
                    log::debug!("Picture {} has an unknown format, leaving it out", path);
                    None
                }
            })
            .collect();
        let links = document
            .hyperlinks
            .iter()
            .map(|(rid, target, _)| (rid.clone(), target.clone()))
            .collect();
        Self { images, links }
    }
}

fn data_url(bytes: &[u8]) -> Option<String> {
    let format = image::guess_format(bytes).ok()?;
    Some(format!(
        "data:{};base64,{}",
        format.to_mime_type(),
        general_purpose::STANDARD.encode(bytes)
    ))
}

/// Bold maps to `<strong>`, italic and underline to `<em>`. Table cells
/// drop the bold.
fn paragraph_content(p: &Paragraph, keep_bold: bool, relations: &Relations) -> String {
    let mut out = String::new();
    for child in &p.children {
        match child {
            ParagraphChild::Run(run) => write_run(&mut out, run, keep_bold, relations),
            ParagraphChild::Hyperlink(link) => write_link(&mut out, link, keep_bold, relations),
            _ => {}
        }
    }
    out
}

fn write_link(out: &mut String, link: &Hyperlink, keep_bold: bool, relations: &Relations) {
    let mut text = String::new();
    for child in &link.children {
        if let ParagraphChild::Run(run) = child {
            write_run(&mut text, run, keep_bold, relations);
        }
    }

    let href = match &link.link {
        HyperlinkData::External { rid, .. } => relations.links.get(rid).cloned(),
        HyperlinkData::Anchor { anchor } => Some(format!("#{}", anchor)),
    };
    match href {
        Some(href) => {
            out.push_str(&format!("<a href=\"{}\">{}</a>", encode_text(&href), text))
        }
        None => out.push_str(&text),
    }
}

fn write_run(out: &mut String, run: &docx_rs::Run, keep_bold: bool, relations: &Relations) {
    let mut text = String::new();
    for child in &run.children {
        match child {
            RunChild::Text(t) => text.push_str(&encode_text(&t.text)),
            RunChild::Tab(_) => text.push('\t'),
            RunChild::Break(_) => text.push_str("<br />"),
            RunChild::Drawing(drawing) => {
                if let Some(DrawingData::Pic(pic)) = &drawing.data {
                    if let Some(src) = relations.images.get(&pic.id) {
                        text.push_str(&format!("<img src=\"{}\" />", src));
                    }
                }
            }
            _ => {}
        }
    }
    if text.is_empty() {
        return;
    }

    let props = &run.run_property;
    let bold = keep_bold && props.bold.as_ref().is_some_and(|b| b == &Bold::new());
    let emphasis = props.italic.as_ref().is_some_and(|i| i == &Italic::new())
        || props.underline.is_some();

    if bold {
        out.push_str("<strong>");
    }
    if emphasis {
        out.push_str("<em>");
    }
    out.push_str(&text);
    if emphasis {
        out.push_str("</em>");
    }
    if bold {
        out.push_str("</strong>");
    }
}

fn write_table(out: &mut String, table: &Table, relations: &Relations) {
    out.push_str(&format!("<table class=\"{}\">", TABLE_CLASS));
    for row in &table.rows {
        let TableChild::TableRow(tr) = row;
        out.push_str("<tr>");
        for cell in &tr.cells {
            let TableRowChild::TableCell(tc) = cell;
            let paragraphs = tc
                .children
                .iter()
                .filter_map(|content| match content {
                    TableCellContent::Paragraph(p) => Some(paragraph_content(p, false, relations)),
                    _ => None,
                })
                .filter(|text| !text.is_empty())
                .collect::<Vec<_>>();
            out.push_str("<td>");
            out.push_str(&paragraphs.join("<br />"));
            out.push_str("</td>");
        }
        out.push_str("</tr>");
    }
    out.push_str("</table>");
}

/// Open lists, innermost last. Every open list also has an open `<li>`.
#[derive(Default)]
struct ListWriter {
    stack: Vec<ListKind>,
}

impl ListWriter {
    fn push_item(&mut self, out: &mut String, kind: ListKind, level: usize, content: &str) {
        let depth = level + 1;
        while self.stack.len() > depth {
            self.close_one(out);
        }
        if self.stack.len() == depth {
            if self.stack.last() == Some(&kind) {
                out.push_str("</li><li>");
                out.push_str(content);
                return;
            }
            self.close_one(out);
        }
        while self.stack.len() < depth {
            out.push_str(&format!("<{}><li>", kind.tag()));
            self.stack.push(kind);
        }
        out.push_str(content);
    }

    fn close_one(&mut self, out: &mut String) {
        if let Some(kind) = self.stack.pop() {
            out.push_str(&format!("</li></{}>", kind.tag()));
        }
    }

    fn close_all(&mut self, out: &mut String) {
        while !self.stack.is_empty() {
            self.close_one(out);
        }
    }
}
