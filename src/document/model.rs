/// Intermediate form between parsed HTML and the generated Word document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph(String),
    Heading { level: u8, text: String },
    List(List),
    Table(Table),
    Image { src: String },
    Quote(String),
    Code(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct List {
    pub ordered: bool,
    pub items: Vec<ListItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub text: String,
    pub children: Vec<List>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub cells: Vec<String>,
    pub header: bool,
}

impl List {
    /// Number of list levels, counting this one.
    pub fn depth(&self) -> usize {
        1 + self
            .items
            .iter()
            .flat_map(|item| item.children.iter())
            .map(List::depth)
            .max()
            .unwrap_or(0)
    }
}

impl Table {
    /// Column count, fixed by the first row.
    pub fn columns(&self) -> usize {
        self.rows.first().map(|row| row.cells.len()).unwrap_or(0)
    }
}

/// Image sources in document order, duplicates included.
pub fn image_sources(blocks: &[Block]) -> Vec<&str> {
    blocks
        .iter()
        .filter_map(|block| match block {
            Block::Image { src } => Some(src.as_str()),
            _ => None,
        })
        .collect()
}
