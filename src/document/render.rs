use std::collections::HashMap;
use std::io::Cursor;

use docx_rs::{
    AbstractNumbering, BreakType, Docx, IndentLevel, Level, LevelJc, LevelOverride, LevelText,
    LineSpacing, NumberFormat, Numbering, NumberingId, Paragraph, Pic, Run, RunFonts,
    SpecialIndentType, Start, Style, StyleType, Table, TableCell, TableRow,
};

use super::image::ResolvedImage;
use super::model::{Block, List};

const EMU_PER_INCH: f64 = 914_400.0;
/// 0.2 inch.
const SPACING_TWIPS: u32 = 288;
const MAX_LIST_LEVEL: usize = 8;

const BULLET_ABSTRACT: usize = 10;
const ORDERED_ABSTRACT: usize = 11;
const BULLET_NUM: usize = 10;
const FIRST_ORDERED_NUM: usize = 11;

const HEADING_SIZES: [(u8, usize); 6] = [(1, 32), (2, 28), (3, 26), (4, 24), (5, 22), (6, 22)];

pub struct DocxRenderer {
    image_width_emu: u32,
}

impl DocxRenderer {
    pub fn new(image_width_inches: f64) -> Self {
        Self {
            image_width_emu: (image_width_inches * EMU_PER_INCH) as u32,
        }
    }

    /// Builds the document. Images missing from `images` were skipped during
    /// resolution and are left out.
    pub fn render(&self, blocks: &[Block], images: &HashMap<String, ResolvedImage>) -> Docx {
        let mut next_num = FIRST_ORDERED_NUM;
        let mut docx = base_document();
        for block in blocks {
            docx = self.add_block(docx, block, images, &mut next_num);
        }
        docx
    }

    fn add_block(
        &self,
        docx: Docx,
        block: &Block,
        images: &HashMap<String, ResolvedImage>,
        next_num: &mut usize,
    ) -> Docx {
        match block {
            Block::Paragraph(text) => {
                docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(text)))
            }
            Block::Heading { level, text } => {
                let level = (*level).clamp(1, 6);
                let heading = Paragraph::new()
                    .style(&format!("Heading{}", level))
                    .add_run(Run::new().add_text(text).bold());
                docx.add_paragraph(heading).add_paragraph(spacer())
            }
            Block::List(list) => {
                if list.depth() > MAX_LIST_LEVEL + 1 {
                    log::debug!(
                        "List nested {} levels deep, flattening below level {}",
                        list.depth(),
                        MAX_LIST_LEVEL
                    );
                }
                add_list(docx, list, 0, next_num).add_paragraph(spacer())
            }
            Block::Table(table) => {
                let columns = table.columns();
                let rows = table
                    .rows
                    .iter()
                    .map(|row| {
                        let mut cells = row
                            .cells
                            .iter()
                            .take(columns)
                            .map(|text| table_cell(text, row.header))
                            .collect::<Vec<_>>();
                        while cells.len() < columns {
                            cells.push(table_cell("", false));
                        }
                        TableRow::new(cells)
                    })
                    .collect::<Vec<_>>();
                docx.add_table(Table::new(rows)).add_paragraph(spacer())
            }
            Block::Image { src } => match images.get(src) {
                Some(image) => {
                    let width = self.image_width_emu;
                    let height = (u64::from(width) * u64::from(image.height_px)
                        / u64::from(image.width_px.max(1))) as u32;
                    let pic = Pic::new_with_dimensions(
                        image.png.clone(),
                        image.width_px,
                        image.height_px,
                    )
                    .size(width, height);
                    docx.add_paragraph(Paragraph::new().add_run(Run::new().add_image(pic)))
                        .add_paragraph(spacer())
                }
                None => docx,
            },
            Block::Quote(text) => docx.add_paragraph(
                Paragraph::new().style("Quote").add_run(Run::new().add_text(text)),
            ),
            Block::Code(code) => {
                let mut run = Run::new().fonts(
                    RunFonts::new()
                        .ascii("Courier New")
                        .hi_ansi("Courier New")
                        .cs("Courier New"),
                );
                for (i, line) in code.lines().enumerate() {
                    if i > 0 {
                        run = run.add_break(BreakType::TextWrapping);
                    }
                    run = run.add_text(line);
                }
                docx.add_paragraph(Paragraph::new().style("Code").add_run(run))
            }
        }
    }
}

pub fn to_bytes(docx: Docx) -> anyhow::Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    docx.build().pack(&mut buffer)?;
    Ok(buffer.into_inner())
}

/// Items first, each followed by its child lists one level deeper.
/// Every ordered list gets its own numbering instance restarting at 1 on the
/// level its items use.
fn add_list(mut docx: Docx, list: &List, depth: usize, next_num: &mut usize) -> Docx {
    let level = depth.min(MAX_LIST_LEVEL);
    let num_id = if list.ordered {
        let id = *next_num;
        *next_num += 1;
        let restart = LevelOverride::new(level).start(1);
        docx = docx.add_numbering(Numbering::new(id, ORDERED_ABSTRACT).add_override(restart));
        id
    } else {
        BULLET_NUM
    };

    for item in &list.items {
        let paragraph = Paragraph::new()
            .add_run(Run::new().add_text(&item.text))
            .numbering(NumberingId::new(num_id), IndentLevel::new(level));
        docx = docx.add_paragraph(paragraph);
        for child in &item.children {
            docx = add_list(docx, child, depth + 1, next_num);
        }
    }
    docx
}

fn table_cell(text: &str, bold: bool) -> TableCell {
    let run = Run::new().add_text(text);
    let run = if bold { run.bold() } else { run };
    TableCell::new().add_paragraph(Paragraph::new().add_run(run))
}

fn spacer() -> Paragraph {
    Paragraph::new().line_spacing(LineSpacing::new().before(SPACING_TWIPS).after(0))
}

fn base_document() -> Docx {
    let mut docx = Docx::new();

    for (level, size) in HEADING_SIZES {
        docx = docx.add_style(
            Style::new(format!("Heading{}", level), StyleType::Paragraph)
                .name(format!("heading {}", level))
                .size(size)
                .bold(),
        );
    }
    docx = docx
        .add_style(Style::new("Quote", StyleType::Paragraph).name("Quote").italic())
        .add_style(Style::new("Code", StyleType::Paragraph).name("Code"));

    let mut bullet = AbstractNumbering::new(BULLET_ABSTRACT);
    let mut ordered = AbstractNumbering::new(ORDERED_ABSTRACT);
    for level in 0..=MAX_LIST_LEVEL {
        let left = Some(720 * (level as i32 + 1));
        let hanging = Some(SpecialIndentType::Hanging(360));
        bullet = bullet.add_level(
            Level::new(
                level,
                Start::new(1),
                NumberFormat::new("bullet"),
                LevelText::new("•"),
                LevelJc::new("left"),
            )
            .indent(left, hanging, None, None),
        );
        ordered = ordered.add_level(
            Level::new(
                level,
                Start::new(1),
                NumberFormat::new("decimal"),
                LevelText::new(format!("%{}.", level + 1)),
                LevelJc::new("left"),
            )
            .indent(left, hanging, None, None),
        );
    }

    docx.add_abstract_numbering(bullet)
        .add_abstract_numbering(ordered)
        .add_numbering(Numbering::new(BULLET_NUM, BULLET_ABSTRACT))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::fixtures::png_data_url;
    use crate::document::html::parse_html;
    use crate::document::image::{resolve_image, HttpImageFetcher};
    use docx_rs::{read_docx, DocumentChild, ParagraphChild, RunChild};

    fn drawings(bytes: &[u8]) -> anyhow::Result<usize> {
        let docx = read_docx(bytes)?;
        let mut count = 0;
        for child in &docx.document.children {
            if let DocumentChild::Paragraph(p) = child {
                for child in &p.children {
                    if let ParagraphChild::Run(run) = child {
                        count += run
                            .children
                            .iter()
                            .filter(|c| matches!(c, RunChild::Drawing(_)))
                            .count();
                    }
                }
            }
        }
        Ok(count)
    }

    fn styles(bytes: &[u8]) -> anyhow::Result<Vec<String>> {
        let docx = read_docx(bytes)?;
        Ok(docx
            .document
            .children
            .iter()
            .filter_map(|child| match child {
                DocumentChild::Paragraph(p) => p.property.style.as_ref().map(|s| s.val.clone()),
                _ => None,
            })
            .collect())
    }

    #[tokio::test]
    async fn test_embeds_resolved_image() -> anyhow::Result<()> {
        let src = png_data_url(10, 5);
        let fetcher = HttpImageFetcher::new(reqwest::Client::new());
        let mut images = HashMap::new();
        images.insert(src.clone(), resolve_image(&src, &fetcher).await?);

        let blocks = vec![Block::Image { src }];
        let bytes = to_bytes(DocxRenderer::new(5.0).render(&blocks, &images))?;
        assert_eq!(drawings(&bytes)?, 1);
        Ok(())
    }

    #[test]
    fn test_unresolved_image_leaves_no_node() -> anyhow::Result<()> {
        let blocks = parse_html(r#"<p>before</p><img src="not a url"><p>after</p>"#);
        assert_eq!(blocks.len(), 3);

        let bytes = to_bytes(DocxRenderer::new(5.0).render(&blocks, &HashMap::new()))?;
        assert_eq!(drawings(&bytes)?, 0);
        Ok(())
    }

    #[test]
    fn test_heading_styles() -> anyhow::Result<()> {
        let blocks = parse_html("<h1>a</h1><h4>b</h4><blockquote>c</blockquote>");
        let bytes = to_bytes(DocxRenderer::new(5.0).render(&blocks, &HashMap::new()))?;
        let styles = styles(&bytes)?;
        assert!(styles.contains(&"Heading1".to_string()));
        assert!(styles.contains(&"Heading4".to_string()));
        assert!(styles.contains(&"Quote".to_string()));
        Ok(())
    }

    #[test]
    fn test_nested_ordered_lists_restart() -> anyhow::Result<()> {
        let blocks = parse_html(
            "<ul><li>a<ol><li>x</li><li>y</li></ol></li><li>b<ol><li>z</li></ol></li></ul>",
        );
        let docx = read_docx(&to_bytes(DocxRenderer::new(5.0).render(&blocks, &HashMap::new()))?)?;

        let ordered = docx
            .numberings
            .numberings
            .iter()
            .filter(|n| n.abstract_num_id == ORDERED_ABSTRACT)
            .collect::<Vec<_>>();
        assert_eq!(ordered.len(), 2);
        for numbering in ordered {
            let restarts = numbering
                .level_overrides
                .iter()
                .map(|o| (o.level, o.override_start))
                .collect::<Vec<_>>();
            assert_eq!(restarts, vec![(1, Some(1))]);
        }
        Ok(())
    }

    #[test]
    fn test_table_columns_fixed_by_first_row() -> anyhow::Result<()> {
        let blocks = parse_html(
            "<table><tr><td>a</td><td>b</td></tr><tr><td>1</td><td>2</td><td>3</td></tr>\
             <tr><td>x</td></tr></table>",
        );
        let docx = read_docx(&to_bytes(DocxRenderer::new(5.0).render(&blocks, &HashMap::new()))?)?;
        let table = docx
            .document
            .children
            .iter()
            .find_map(|child| match child {
                DocumentChild::Table(t) => Some(t),
                _ => None,
            })
            .ok_or_else(|| anyhow::anyhow!("no table"))?;
        assert_eq!(table.rows.len(), 3);
        for row in &table.rows {
            let docx_rs::TableChild::TableRow(tr) = row;
            assert_eq!(tr.cells.len(), 2);
        }
        Ok(())
    }
}
