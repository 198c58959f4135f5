// Reading voter lists out of Excel workbooks.

use calamine::{open_workbook, Reader, Xlsx};
use snafu::prelude::*;

use crate::roll::*;

pub fn read_raw_table(path: &str, worksheet: Option<&str>) -> RollResult<RawTable> {
    let p = path.to_string();
    let mut workbook: Xlsx<_> = open_workbook(p).context(OpeningExcelSnafu {
        path: path.to_string(),
    })?;
    let wrange = match worksheet {
        Some(name) => workbook.worksheet_range(name),
        None => workbook.worksheet_range_at(0),
    }
    .context(EmptyExcelSnafu {})?
    .context(OpeningExcelSnafu {
        path: path.to_string(),
    })?;

    let mut rows_iter = wrange.rows();
    let header_row = rows_iter.next().context(EmptyExcelSnafu {})?;
    let headers: Vec<String> = header_row
        .iter()
        .map(cell_to_string)
        .collect::<RollResult<Vec<String>>>()?;

    let mut rows: Vec<RawRow> = Vec::new();
    for row in rows_iter {
        let mut raw = RawRow::new();
        for (idx, header) in headers.iter().enumerate() {
            let value = row.get(idx).map(cell_to_string).transpose()?.unwrap_or_default();
            raw.insert(header.clone(), value);
        }
        if raw.values().all(|v| v.is_empty()) {
            continue;
        }
        rows.push(raw);
    }
    Ok(RawTable { headers, rows })
}

fn cell_to_string(cell: &calamine::DataType) -> RollResult<String> {
    match cell {
        calamine::DataType::String(s) => Ok(s.clone()),
        calamine::DataType::Empty => Ok("".to_string()),
        calamine::DataType::Int(i) => Ok(i.to_string()),
        // Ages and serial numbers come back as floats from Excel.
        calamine::DataType::Float(f) if f.fract() == 0.0 => Ok(format!("{}", *f as i64)),
        calamine::DataType::Float(f) => Ok(f.to_string()),
        calamine::DataType::Bool(b) => Ok(b.to_string()),
        _ => whatever!("Could not understand cell {:?}", cell),
    }
}
