use std::path::Path;

use household_grouping::VoterRecord;

use crate::roll::RawRow;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string())
}

/// Exact, case-sensitive field access. A present-but-empty cell stays
/// `Some("")`, which matters for deduplication keys.
pub fn field(row: &RawRow, name: &str) -> Option<String> {
    row.get(name).cloned()
}

/// Maps raw rows onto the typed records of the grouping library.
pub fn voter_records(rows: &[RawRow]) -> Vec<VoterRecord> {
    rows.iter()
        .map(|row| VoterRecord {
            vcard_id: field(row, "VCARDID"),
            first_name: field(row, "E_FIRST_NAME"),
            middle_name: field(row, "E_MIDDLE_NAME"),
            last_name: field(row, "E_LAST_NAME"),
            full_name: field(row, "E_FULLNAME"),
            local_full_name: field(row, "L_FULLNAME"),
            sex: field(row, "SEX"),
            age: field(row, "AGE"),
            mobile: field(row, "MOBILE"),
            part_no: field(row, "PART_NO"),
            serial_no: field(row, "SRNO"),
        })
        .collect()
}
