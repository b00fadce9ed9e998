use thiserror::Error;

pub const CONTENTS_SHEET: &str = "Contents";

const MAX_SHEET_NAME_CHARS: usize = 31;
const CONTENTS_COLUMN_WIDTH: f64 = 80.0;

#[derive(Debug, Error)]
pub enum WorkbookError {
    #[error("xlsx error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<String>>,
}

/// One table-of-contents row linking to a sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentsEntry {
    pub text: String,
    pub sheet: String,
}

/// In-memory spreadsheet: a `Contents` sheet followed by one sheet per
/// formatted IE. Encoded to xlsx only when it is written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Workbook {
    contents: Vec<ContentsEntry>,
    sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a sheet and links it from `Contents`. The sheet name is derived
    /// from `title`, made valid and unique; the final name is returned.
    pub fn add_sheet(&mut self, contents_text: &str, title: &str, rows: Vec<Vec<String>>) -> String {
        let name = self.unique_name(&sanitize_sheet_name(title));
        self.contents.push(ContentsEntry {
            text: contents_text.to_string(),
            sheet: name.clone(),
        });
        self.sheets.push(Sheet {
            name: name.clone(),
            rows,
        });
        name
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        std::iter::once(CONTENTS_SHEET)
            .chain(self.sheets.iter().map(|sheet| sheet.name.as_str()))
            .collect()
    }

    pub fn contents(&self) -> &[ContentsEntry] {
        &self.contents
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|sheet| sheet.name == name)
    }

    pub fn to_xlsx(&self) -> Result<Vec<u8>, WorkbookError> {
        let mut book = rust_xlsxwriter::Workbook::new();

        let toc = book.add_worksheet();
        toc.set_name(CONTENTS_SHEET)?;
        toc.set_column_width(0, CONTENTS_COLUMN_WIDTH)?;
        for (row, entry) in self.contents.iter().enumerate() {
            let link = format!("internal:'{}'!A1", entry.sheet.replace('\'', "''"));
            toc.write_url_with_text(row as u32, 0, link.as_str(), entry.text.as_str())?;
        }

        for sheet in &self.sheets {
            let worksheet = book.add_worksheet();
            worksheet.set_name(sheet.name.as_str())?;
            for (row, cells) in sheet.rows.iter().enumerate() {
                for (col, text) in cells.iter().enumerate() {
                    if !text.is_empty() {
                        worksheet.write_string(row as u32, col as u16, text.as_str())?;
                    }
                }
            }
        }

        Ok(book.save_to_buffer()?)
    }

    fn unique_name(&self, base: &str) -> String {
        let taken = |candidate: &str| {
            let folded = candidate.to_lowercase();
            folded == CONTENTS_SHEET.to_lowercase()
                || self
                    .sheets
                    .iter()
                    .any(|sheet| sheet.name.to_lowercase() == folded)
        };
        if !taken(base) {
            return base.to_string();
        }
        (2..)
            .map(|n| {
                let suffix = format!(" ({n})");
                let keep = MAX_SHEET_NAME_CHARS - suffix.chars().count();
                let head: String = base.chars().take(keep).collect();
                format!("{head}{suffix}")
            })
            .find(|candidate| !taken(candidate))
            .unwrap_or_else(|| base.to_string())
    }
}

/// Excel sheet names: at most 31 characters, none of `[]:*?/\`, no leading or
/// trailing apostrophe.
fn sanitize_sheet_name(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let trimmed: String = cleaned
        .trim_matches(|c: char| c == '\'' || c.is_whitespace())
        .chars()
        .take(MAX_SHEET_NAME_CHARS)
        .collect();
    let trimmed = trimmed.trim_end_matches('\'').to_string();
    if trimmed.is_empty() {
        "Sheet".to_string()
    } else {
        trimmed
    }
}
