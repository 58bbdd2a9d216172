// Reading the Excel workbooks: the primary answer sheet and the optional
// name-order sheet. Only the first worksheet of each workbook is read.

use calamine::{open_workbook, DataType, Reader, Xlsx};
use log::debug;

use crate::poms::*;

/// Reads the primary answer workbook: first row is the header, every other
/// row is one respondent. The 姓名 column is required; every cell is kept
/// as a string paired with its column name, in worksheet order.
pub fn read_primary(path: &str) -> PomsResult<Vec<RawRow>> {
    let wrange = get_range(path)?;
    let mut rows = wrange.rows();
    let header: Vec<String> = rows
        .next()
        .context(EmptyExcelSnafu { path })?
        .iter()
        .map(cell_to_string)
        .collect();
    debug!("read_primary: header: {:?}", header);

    let name_idx = find_name_column(&header, path)?;

    let mut res: Vec<RawRow> = Vec::new();
    for row in rows {
        let values: Vec<String> = row.iter().map(cell_to_string).collect();
        let name = values.get(name_idx).cloned().unwrap_or_default();
        let cells: Vec<(String, String)> = header.iter().cloned().zip(values).collect();
        res.push(RawRow { name, cells });
    }
    debug!("read_primary: read {} rows from {}", res.len(), path);
    Ok(res)
}

/// Reads the optional order workbook: a 姓名 column (required) listing the
/// respondent identifiers in the desired output order. Empty cells are
/// skipped.
pub fn read_name_order(path: &str) -> PomsResult<Vec<String>> {
    let wrange = get_range(path)?;
    let mut rows = wrange.rows();
    let header: Vec<String> = rows
        .next()
        .context(EmptyExcelSnafu { path })?
        .iter()
        .map(cell_to_string)
        .collect();
    let name_idx = find_name_column(&header, path)?;

    let res: Vec<String> = rows
        .filter_map(|row| {
            let name = row.get(name_idx).map(cell_to_string).unwrap_or_default();
            if name.trim().is_empty() {
                None
            } else {
                Some(name)
            }
        })
        .collect();
    Ok(res)
}

fn find_name_column(header: &[String], path: &str) -> PomsResult<usize> {
    header
        .iter()
        .position(|column| column.trim() == NAME_COLUMN)
        .context(MissingColumnSnafu {
            column: NAME_COLUMN,
            path,
        })
}

// All the cell contents go through the same lossy stringification that the
// scoring layer expects: labels stay as-is, numbers print in decimal,
// everything unreadable becomes the empty string (and scores 0 downstream).
fn cell_to_string(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.clone(),
        DataType::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        DataType::Float(f) => format!("{}", f),
        DataType::Int(i) => i.to_string(),
        DataType::Bool(b) => b.to_string(),
        DataType::Empty => String::new(),
        _ => String::new(),
    }
}

fn get_range(path: &str) -> PomsResult<calamine::Range<DataType>> {
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    let wrange = workbook
        .worksheet_range_at(0)
        .context(EmptyExcelSnafu { path })?
        .context(OpeningExcelSnafu { path })?;
    Ok(wrange)
}
