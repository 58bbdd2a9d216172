// CSV export of the scored table.

use crate::poms::*;

// Spreadsheet tools only detect the encoding with a leading byte-order mark.
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Serializes the result table as CSV: UTF-8 with a byte-order mark, a
/// header row (identifier, the seven scales, TMD) and one record per
/// respondent with plain decimal integers.
pub fn export_csv(rows: &[ResultRow]) -> PomsResult<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());

    let mut header: Vec<&str> = vec![NAME_COLUMN];
    header.extend(ALL_COLUMNS.iter().map(|c| c.name()));
    wtr.write_record(&header).context(CsvWriteSnafu {})?;

    for row in rows {
        let mut record: Vec<String> = vec![row.name.clone()];
        record.extend(
            ALL_COLUMNS
                .iter()
                .map(|&column| row.column_score(column).to_string()),
        );
        wtr.write_record(&record).context(CsvWriteSnafu {})?;
    }

    let data = match wtr.into_inner() {
        Ok(data) => data,
        Err(e) => whatever!("Error finalizing the csv buffer: {}", e),
    };
    let mut res = Vec::with_capacity(UTF8_BOM.len() + data.len());
    res.extend_from_slice(UTF8_BOM);
    res.extend_from_slice(&data);
    Ok(res)
}
