//! Linear filter and grouping passes over raw list rows.

use std::collections::{HashMap, HashSet};

use crate::roll::io_common::field;
use crate::roll::merge::parse_int_lenient;
use crate::roll::{RawRow, RawTable};

/// Columns never shown by the search screen.
pub const SEARCH_IGNORED_COLUMNS: [&str; 5] = [
    "AC_NUMBER",
    "PART_NUMBER",
    "SERIAL_NO_IN_PART",
    "SERIAL_NO_IN_WARD",
    "AGE",
];

/// Columns the search words are matched against.
pub const SEARCH_COLUMNS: [&str; 3] = ["VOTER_FULL_NAME", "FULLNAME_MARATHI", "EPIC_NO"];

/// Multi-word search: every word of the query must be a case-insensitive
/// substring of at least one searchable column. The kept rows come back
/// sorted by numeric serial number, projected onto the visible columns.
pub fn search_rows(table: &RawTable, query: &str) -> RawTable {
    let headers: Vec<String> = table
        .headers
        .iter()
        .filter(|h| !SEARCH_IGNORED_COLUMNS.contains(&h.as_str()))
        .cloned()
        .collect();
    let words: Vec<String> = query
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect();

    let mut rows: Vec<RawRow> = table
        .rows
        .iter()
        .filter(|row| {
            if words.is_empty() {
                return true;
            }
            let values: Vec<String> = SEARCH_COLUMNS
                .iter()
                .filter_map(|c| field(row, c))
                .filter(|v| !v.is_empty())
                .map(|v| v.to_lowercase())
                .collect();
            words
                .iter()
                .all(|word| values.iter().any(|value| value.contains(word.as_str())))
        })
        .map(|row| {
            headers
                .iter()
                .map(|h| (h.clone(), row.get(h).cloned().unwrap_or_default()))
                .collect::<RawRow>()
        })
        .collect();

    rows.sort_by_key(|row| {
        field(row, "SERIAL_NO")
            .and_then(|s| parse_int_lenient(&s))
            .unwrap_or(0)
    });
    RawTable { headers, rows }
}

/// Keeps the rows of the roll whose serial number appears among the
/// voting-done list's booth serials. Values are compared after trimming.
pub fn booth_done_rows(done: &[RawRow], roll: &RawTable) -> RawTable {
    let serials: HashSet<String> = done
        .iter()
        .filter_map(|row| field(row, "SERIAL_NO_IN_BOOTH"))
        .map(|s| s.trim().to_string())
        .collect();

    let rows: Vec<RawRow> = roll
        .rows
        .iter()
        .filter(|row| {
            field(row, "SERIAL_NO")
                .map(|s| serials.contains(s.trim()))
                .unwrap_or(false)
        })
        .cloned()
        .collect();
    RawTable {
        headers: roll.headers.clone(),
        rows,
    }
}

/// Groups records by their exact last name, in first-encounter order.
/// Members keep the input order within a group.
pub fn surname_groups(rows: &[RawRow]) -> Vec<(String, Vec<RawRow>)> {
    let mut groups: Vec<(String, Vec<RawRow>)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for row in rows.iter() {
        let surname = field(row, "E_LAST_NAME").unwrap_or_default();
        match positions.get(&surname) {
            Some(&idx) => groups[idx].1.push(row.clone()),
            None => {
                positions.insert(surname.clone(), groups.len());
                groups.push((surname, vec![row.clone()]));
            }
        }
    }
    groups
}

pub const SURNAME_HEADERS: [&str; 5] = ["SURNAME", "E_FULLNAME", "AGE", "MOBILE_NO1", "L_ADDRESS"];

/// Flattens surname groups into a printable table with one blank row
/// between consecutive groups.
pub fn surname_table(groups: &[(String, Vec<RawRow>)]) -> RawTable {
    let headers: Vec<String> = SURNAME_HEADERS.iter().map(|h| h.to_string()).collect();
    let mut rows: Vec<RawRow> = Vec::new();
    for (idx, (surname, members)) in groups.iter().enumerate() {
        if idx > 0 {
            rows.push(RawRow::new());
        }
        for member in members.iter() {
            let mut out = RawRow::new();
            out.insert("SURNAME".to_string(), surname.clone());
            for column in ["E_FULLNAME", "AGE", "MOBILE_NO1", "L_ADDRESS"] {
                out.insert(column.to_string(), field(member, column).unwrap_or_default());
            }
            rows.push(out);
        }
    }
    RawTable { headers, rows }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn roll_table() -> RawTable {
        RawTable {
            headers: vec![
                "EPIC_NO".to_string(),
                "VOTER_FULL_NAME".to_string(),
                "FULLNAME_MARATHI".to_string(),
                "SERIAL_NO".to_string(),
                "AGE".to_string(),
            ],
            rows: vec![
                row(&[
                    ("EPIC_NO", "ABC1"),
                    ("VOTER_FULL_NAME", "John Ram Smith"),
                    ("SERIAL_NO", "20"),
                    ("AGE", "52"),
                ]),
                row(&[
                    ("EPIC_NO", "ABC2"),
                    ("VOTER_FULL_NAME", "Asha Kale"),
                    ("SERIAL_NO", "3"),
                    ("AGE", "44"),
                ]),
                row(&[
                    ("EPIC_NO", "XYZ9"),
                    ("VOTER_FULL_NAME", "Ram Pawar"),
                    ("SERIAL_NO", "11"),
                    ("AGE", "31"),
                ]),
            ],
        }
    }

    #[test]
    fn every_search_word_must_match_somewhere() {
        let found = search_rows(&roll_table(), "ram smith");
        assert_eq!(found.rows.len(), 1);
        assert_eq!(found.rows[0].get("EPIC_NO").unwrap(), "ABC1");

        // A single word matches both the name and the EPIC_NO column.
        let found = search_rows(&roll_table(), "abc");
        assert_eq!(found.rows.len(), 2);
    }

    #[test]
    fn an_empty_query_keeps_everything() {
        assert_eq!(search_rows(&roll_table(), "  ").rows.len(), 3);
    }

    #[test]
    fn search_results_are_ordered_by_serial_number() {
        let found = search_rows(&roll_table(), "");
        let serials: Vec<&str> = found
            .rows
            .iter()
            .map(|r| r.get("SERIAL_NO").unwrap().as_str())
            .collect();
        assert_eq!(serials, vec!["3", "11", "20"]);
    }

    #[test]
    fn ignored_columns_are_dropped_from_the_result() {
        let found = search_rows(&roll_table(), "");
        assert!(!found.headers.contains(&"AGE".to_string()));
        assert!(!found.rows[0].contains_key("AGE"));
        assert!(found.headers.contains(&"EPIC_NO".to_string()));
    }

    #[test]
    fn booth_rows_match_on_trimmed_serials() {
        let done = vec![
            row(&[("SERIAL_NO_IN_BOOTH", " 20 ")]),
            row(&[("SERIAL_NO_IN_BOOTH", "11")]),
        ];
        let matched = booth_done_rows(&done, &roll_table());
        let serials: Vec<&str> = matched
            .rows
            .iter()
            .map(|r| r.get("SERIAL_NO").unwrap().as_str())
            .collect();
        assert_eq!(serials, vec!["20", "11"]);
        assert_eq!(matched.headers, roll_table().headers);
    }

    #[test]
    fn surname_groups_keep_first_encounter_order() {
        let rows = vec![
            row(&[("E_LAST_NAME", "Smith"), ("E_FULLNAME", "John Smith")]),
            row(&[("E_LAST_NAME", "Kale"), ("E_FULLNAME", "Asha Kale")]),
            row(&[("E_LAST_NAME", "Smith"), ("E_FULLNAME", "Mary Smith")]),
        ];
        let groups = surname_groups(&rows);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "Smith");
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].0, "Kale");
    }

    #[test]
    fn the_surname_table_separates_groups_with_a_blank_row() {
        let rows = vec![
            row(&[("E_LAST_NAME", "Smith"), ("E_FULLNAME", "John Smith")]),
            row(&[("E_LAST_NAME", "Kale"), ("E_FULLNAME", "Asha Kale")]),
        ];
        let table = surname_table(&surname_groups(&rows));
        assert_eq!(table.rows.len(), 3);
        assert!(table.rows[1].is_empty());
        assert_eq!(table.rows[2].get("SURNAME").unwrap(), "Kale");
    }
}
