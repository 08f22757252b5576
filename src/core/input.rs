use crate::domain::model::ProductRow;
use crate::utils::error::{EtlError, Result};
use calamine::{Data, Reader};
use std::io::Cursor;
use std::path::Path;

/// Extensions accepted for the product list.
pub const INPUT_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "ods", "csv"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Workbook,
    Csv,
}

impl InputFormat {
    /// Anything that is not a spreadsheet workbook is parsed as CSV.
    pub fn from_path(path: &str) -> Self {
        let extension = Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();

        if ["xlsx", "xlsm", "xls", "ods"]
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(extension))
        {
            InputFormat::Workbook
        } else {
            InputFormat::Csv
        }
    }
}

/// Reads the product list at `path`, choosing the parser from its extension.
pub fn read_input(path: &str, data: &[u8], name_column: &str) -> Result<Vec<ProductRow>> {
    match InputFormat::from_path(path) {
        InputFormat::Workbook => read_workbook_rows(data, name_column),
        InputFormat::Csv => read_product_rows(data, name_column),
    }
}

fn locate_column(headers: &[&str], name_column: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}').trim() == name_column)
        .ok_or_else(|| EtlError::MissingColumnError {
            column: name_column.to_string(),
            available: headers.join(", "),
        })
}

/// Parses a CSV export of the product sheet and pulls the name column, in
/// file order. Values are not trimmed or validated.
pub fn read_product_rows(data: &[u8], name_column: &str) -> Result<Vec<ProductRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    let column_index = locate_column(&headers.iter().collect::<Vec<_>>(), name_column)?;

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let name = record.get(column_index).unwrap_or_default();
        rows.push(ProductRow::new(index, name));
    }

    tracing::debug!(
        "Read {} CSV rows from column '{}' (position {})",
        rows.len(),
        name_column,
        column_index
    );
    Ok(rows)
}

/// First worksheet of an Excel or OpenDocument workbook. The first used row is
/// the header; cells are rendered as text, empty cells as "".
pub fn read_workbook_rows(data: &[u8], name_column: &str) -> Result<Vec<ProductRow>> {
    let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(data))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(calamine::Error::Msg("workbook has no worksheets"))??;

    let mut sheet_rows = range.rows();
    let headers: Vec<String> = sheet_rows
        .next()
        .map(|header| header.iter().map(Data::to_string).collect())
        .unwrap_or_default();
    let column_index = locate_column(
        &headers.iter().map(String::as_str).collect::<Vec<_>>(),
        name_column,
    )?;

    let rows: Vec<ProductRow> = sheet_rows
        .enumerate()
        .map(|(index, cells)| {
            let name = cells.get(column_index).map(Data::to_string).unwrap_or_default();
            ProductRow::new(index, name)
        })
        .collect();

    tracing::debug!(
        "Read {} worksheet rows from column '{}' (position {})",
        rows.len(),
        name_column,
        column_index
    );
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    fn workbook_bytes(cells: &[&[&str]]) -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (row, values) in cells.iter().enumerate() {
            for (col, value) in values.iter().enumerate() {
                if !value.is_empty() {
                    sheet.write_string(row as u32, col as u16, *value).unwrap();
                }
            }
        }
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_reads_named_column_in_order() {
        let csv = "sku,product_name,price\nA1,Hydrating Serum,20\nB2,Clay Mask,12\n";
        let rows = read_product_rows(csv.as_bytes(), "product_name").unwrap();
        assert_eq!(
            rows,
            vec![ProductRow::new(0, "Hydrating Serum"), ProductRow::new(1, "Clay Mask")]
        );
    }

    #[test]
    fn test_empty_and_short_rows_pass_through() {
        let csv = "product_name,notes\n,blank name\nRose Toner\n";
        let rows = read_product_rows(csv.as_bytes(), "product_name").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "");
        assert_eq!(rows[1].name, "Rose Toner");
    }

    #[test]
    fn test_name_past_end_of_short_row_is_empty() {
        let csv = "sku,product_name\nA1\n";
        let rows = read_product_rows(csv.as_bytes(), "product_name").unwrap();
        assert_eq!(rows, vec![ProductRow::new(0, "")]);
    }

    #[test]
    fn test_missing_column_is_an_input_error() {
        let csv = "sku,title\nA1,Serum\n";
        let err = read_product_rows(csv.as_bytes(), "product_name").unwrap_err();
        match err {
            EtlError::MissingColumnError { column, available } => {
                assert_eq!(column, "product_name");
                assert_eq!(available, "sku, title");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_byte_order_mark_is_ignored_in_header() {
        let csv = "\u{feff}product_name\nNight Cream\n";
        let rows = read_product_rows(csv.as_bytes(), "product_name").unwrap();
        assert_eq!(rows[0].name, "Night Cream");
    }

    #[test]
    fn test_header_only_file_has_no_rows() {
        let rows = read_product_rows(b"product_name\n", "product_name").unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_format_follows_extension() {
        assert_eq!(InputFormat::from_path("data/products.xlsx"), InputFormat::Workbook);
        assert_eq!(InputFormat::from_path("data/PRODUCTS.XLS"), InputFormat::Workbook);
        assert_eq!(InputFormat::from_path("data/products.ods"), InputFormat::Workbook);
        assert_eq!(InputFormat::from_path("data/products.csv"), InputFormat::Csv);
        assert_eq!(InputFormat::from_path("data/products"), InputFormat::Csv);
    }

    #[test]
    fn test_reads_first_worksheet() {
        let data = workbook_bytes(&[
            &["sku", "product_name"],
            &["A1", "Hydrating Serum"],
            &["B2", ""],
            &["C3", "Rose Toner"],
        ]);

        let rows = read_workbook_rows(&data, "product_name").unwrap();
        assert_eq!(
            rows,
            vec![
                ProductRow::new(0, "Hydrating Serum"),
                ProductRow::new(1, ""),
                ProductRow::new(2, "Rose Toner"),
            ]
        );
    }

    #[test]
    fn test_workbook_missing_column_lists_headers() {
        let data = workbook_bytes(&[&["sku", "title"], &["A1", "Serum"]]);
        let err = read_workbook_rows(&data, "product_name").unwrap_err();
        match err {
            EtlError::MissingColumnError { available, .. } => assert_eq!(available, "sku, title"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_garbage_workbook_is_an_input_error() {
        let err = read_input("data/products.xlsx", b"not a zip archive", "product_name").unwrap_err();
        assert!(matches!(err, EtlError::WorkbookError(_)));
    }

    #[test]
    fn test_read_input_dispatches_csv() {
        let rows = read_input("data/products.csv", b"product_name\nClay Mask\n", "product_name").unwrap();
        assert_eq!(rows, vec![ProductRow::new(0, "Clay Mask")]);
    }
}
