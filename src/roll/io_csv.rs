// Primitives for reading and writing CSV lists.

use snafu::prelude::*;

use household_grouping::HouseholdRow;

use crate::roll::*;

pub fn read_raw_table(path: &str) -> RollResult<RawTable> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu {})?;
    parse_raw_table(rdr)
}

/// Parses an open CSV reader into a raw table. Rows whose cells are all
/// empty are skipped.
pub fn parse_raw_table<R: std::io::Read>(mut rdr: csv::Reader<R>) -> RollResult<RawTable> {
    let headers: Vec<String> = rdr
        .headers()
        .context(CsvLineParseSnafu {})?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows: Vec<RawRow> = Vec::new();
    for line_r in rdr.records() {
        let line = line_r.context(CsvLineParseSnafu {})?;
        let mut row = RawRow::new();
        for (idx, header) in headers.iter().enumerate() {
            row.insert(header.clone(), line.get(idx).unwrap_or("").to_string());
        }
        if row.values().all(|v| v.is_empty()) {
            continue;
        }
        rows.push(row);
    }
    Ok(RawTable { headers, rows })
}

pub const HOUSEHOLD_HEADERS: [&str; 8] = [
    "VCARDID",
    "PART_NO",
    "SRNO",
    "SEX",
    "AGE",
    "L_FULLNAME",
    "E_FULLNAME",
    "MOBILE",
];

/// Writes the grouped rows as a CSV table. A divider becomes an all-empty
/// row spanning the same columns.
pub fn write_household_table<W: std::io::Write>(
    w: &mut csv::Writer<W>,
    rows: &[HouseholdRow],
) -> RollResult<()> {
    w.write_record(HOUSEHOLD_HEADERS)
        .context(WritingTableSnafu {})?;
    for row in rows.iter() {
        match row {
            HouseholdRow::Divider => {
                w.write_record(["", "", "", "", "", "", "", ""])
                    .context(WritingTableSnafu {})?;
            }
            HouseholdRow::Member { record, mobile } => {
                let full_name = record.resolved_full_name();
                w.write_record([
                    record.vcard_id.as_deref().unwrap_or(""),
                    record.part_no.as_deref().unwrap_or(""),
                    record.serial_no.as_deref().unwrap_or(""),
                    record.sex.as_deref().unwrap_or(""),
                    record.age.as_deref().unwrap_or(""),
                    record.local_full_name.as_deref().unwrap_or(""),
                    full_name.as_str(),
                    mobile.as_str(),
                ])
                .context(WritingTableSnafu {})?;
            }
        }
    }
    w.flush().context(FlushingTableSnafu {})?;
    Ok(())
}

pub fn write_raw_table<W: std::io::Write>(
    w: &mut csv::Writer<W>,
    headers: &[String],
    rows: &[RawRow],
) -> RollResult<()> {
    w.write_record(headers).context(WritingTableSnafu {})?;
    for row in rows.iter() {
        let record: Vec<&str> = headers
            .iter()
            .map(|h| row.get(h).map(String::as_str).unwrap_or(""))
            .collect();
        w.write_record(&record).context(WritingTableSnafu {})?;
    }
    w.flush().context(FlushingTableSnafu {})?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use household_grouping::VoterRecord;

    fn parse(text: &str) -> RawTable {
        let rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(text.as_bytes());
        parse_raw_table(rdr).unwrap()
    }

    #[test]
    fn headers_and_rows_are_read_in_order() {
        let table = parse("VCARDID,E_FIRST_NAME\n1,John\n2,Asha\n");
        assert_eq!(table.headers, vec!["VCARDID", "E_FIRST_NAME"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1].get("E_FIRST_NAME").unwrap(), "Asha");
    }

    #[test]
    fn all_empty_rows_are_skipped() {
        let table = parse("VCARDID,E_FIRST_NAME\n,\n1,John\n");
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn short_rows_leave_the_missing_cells_empty() {
        let table = parse("VCARDID,E_FIRST_NAME,AGE\n1,John\n");
        assert_eq!(table.rows[0].get("AGE").unwrap(), "");
    }

    #[test]
    fn the_household_table_renders_members_and_dividers() {
        let record = VoterRecord {
            vcard_id: Some("1".to_string()),
            first_name: Some("John".to_string()),
            last_name: Some("Smith".to_string()),
            age: Some("52".to_string()),
            ..VoterRecord::default()
        };
        let rows = vec![
            HouseholdRow::Member {
                record,
                mobile: "9000000001".to_string(),
            },
            HouseholdRow::Divider,
        ];
        let mut wtr = csv::Writer::from_writer(Vec::new());
        write_household_table(&mut wtr, &rows).unwrap();
        let buffer = wtr.into_inner().ok().unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("VCARDID,"));
        assert!(lines[1].contains("John  Smith"));
        assert!(lines[1].ends_with("9000000001"));
        assert_eq!(lines[2], ",,,,,,,");
    }
}
