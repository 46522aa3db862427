use serde::Deserialize;
use std::fmt;

use super::cell::CellValue;

pub const EMAIL_COLUMN: usize = 0;
pub const STATUS_COLUMN: usize = 3;
/// Number of cells a row must hold once it has an email.
pub const EXPECTED_CELLS: usize = STATUS_COLUMN + 1;

/// A row is rejected, the rest of the batch goes on.
#[derive(Debug, Clone, PartialEq)]
pub enum MalformedRowError {
    MissingCells {
        expected: usize,
        found: usize,
    },
    TypeMismatch {
        column: usize,
        found: &'static str,
    },
}

impl fmt::Display for MalformedRowError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedRowError::MissingCells { expected, found } => {
                write!(fmt, "Malformed row: expected {expected} cells, found {found}")
            }
            MalformedRowError::TypeMismatch { column, found } => {
                write!(
                    fmt,
                    "Malformed row: expected text in column {column}, found {found}"
                )
            }
        }
    }
}

impl std::error::Error for MalformedRowError {}

/// One row of the fetched range: email, two unused columns, free text status.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct SourceRow(Vec<CellValue>);

/// The cells of a row we actually use.
#[derive(Debug, Clone, PartialEq)]
pub struct RowFields<'a> {
    pub email: &'a str,
    pub status: &'a str,
}

impl SourceRow {
    pub fn new(cells: Vec<CellValue>) -> Self {
        SourceRow(cells)
    }

    pub fn cells(&self) -> &[CellValue] {
        &self.0
    }

    /// Extracts the email and status.
    ///
    /// Returns `Ok(None)` when the email cell is empty: such rows are skipped, not rejected.
    pub fn fields(&self) -> Result<Option<RowFields<'_>>, MalformedRowError> {
        let email = self.0.get(EMAIL_COLUMN).ok_or(MalformedRowError::MissingCells {
            expected: EXPECTED_CELLS,
            found: 0,
        })?;
        let email = text(email, EMAIL_COLUMN)?;
        if email.is_empty() {
            return Ok(None);
        }

        let status = self
            .0
            .get(STATUS_COLUMN)
            .ok_or(MalformedRowError::MissingCells {
                expected: EXPECTED_CELLS,
                found: self.0.len(),
            })?;
        let status = text(status, STATUS_COLUMN)?;

        Ok(Some(RowFields { email, status }))
    }
}

fn text(cell: &CellValue, column: usize) -> Result<&str, MalformedRowError> {
    cell.as_text().ok_or(MalformedRowError::TypeMismatch {
        column,
        found: cell.kind(),
    })
}

impl<S: Into<CellValue>> FromIterator<S> for SourceRow {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        SourceRow(iter.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use speculoos::prelude::*;

    fn row(cells: &[&str]) -> SourceRow {
        cells.iter().copied().collect()
    }

    #[test]
    fn complete_row_should_yield_email_and_status() {
        let row = row(&["a@b.com", "Smith", "12 Main St", "member is paid"]);
        let fields = row.fields().unwrap().unwrap();
        assert_that(&fields.email).is_equal_to("a@b.com");
        assert_that(&fields.status).is_equal_to("member is paid");
    }

    #[test]
    fn empty_email_should_be_skipped() {
        let row = row(&["", "Smith", "", "paid"]);
        assert_that(&row.fields()).is_equal_to(Ok(None));
    }

    #[test]
    fn short_row_with_empty_email_should_be_skipped() {
        let row = row(&[""]);
        assert_that(&row.fields()).is_equal_to(Ok(None));
    }

    #[test]
    fn empty_row_should_be_malformed() {
        let row = SourceRow::new(vec![]);
        assert_that(&row.fields()).is_equal_to(Err(MalformedRowError::MissingCells {
            expected: 4,
            found: 0,
        }));
    }

    #[test]
    fn short_row_should_be_malformed() {
        // The Sheets API drops trailing empty cells, the status is not fabricated.
        let row = row(&["a@b.com", "Smith"]);
        assert_that(&row.fields()).is_equal_to(Err(MalformedRowError::MissingCells {
            expected: 4,
            found: 2,
        }));
    }

    #[test]
    fn numeric_email_should_be_malformed() {
        let row = SourceRow::new(vec![
            CellValue::Number(42.0),
            CellValue::Empty,
            CellValue::Empty,
            CellValue::Empty,
        ]);
        assert_that(&row.fields()).is_equal_to(Err(MalformedRowError::TypeMismatch {
            column: 0,
            found: "number",
        }));
    }

    #[test]
    fn numeric_status_should_be_malformed() {
        let row = SourceRow::new(vec![
            CellValue::from("a@b.com"),
            CellValue::Empty,
            CellValue::Empty,
            CellValue::Number(2019.0),
        ]);
        assert_that(&row.fields()).is_err();
    }

    #[test]
    fn rows_should_deserialize_from_sheet_values() {
        let row: SourceRow = serde_json::from_str(r#"["a@b.com", "", "", "Paid 2019"]"#).unwrap();
        assert_that(&row.cells().len()).is_equal_to(4);
        assert_that(&row.fields().unwrap().unwrap().status).is_equal_to("Paid 2019");
    }
}
