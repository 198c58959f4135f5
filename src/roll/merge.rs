//! Joins a detail export into a ward list.
//!
//! The ward list drives the output: every ward row comes back exactly once,
//! enriched with the detail fields when its `EPIC_NO` matches a detail
//! `VCARDID`.

use std::collections::HashMap;

use crate::roll::io_common::field;
use crate::roll::RawRow;

pub const DEFAULT_AGE_OFFSET: i64 = 2;

pub const MERGED_HEADERS: [&str; 11] = [
    "EPIC_NO",
    "L_FULLNAME",
    "E_FULLNAME",
    "E_FIRST_NAME",
    "E_MIDDLE_NAME",
    "E_LAST_NAME",
    "SEX",
    "AGE",
    "BOOTH_NO",
    "SERIAL_NO",
    "BOOTH_ADDRESS",
];

/// Lenient integer parse: an optional sign and the leading digits; `None`
/// when there are none.
pub(crate) fn parse_int_lenient(s: &str) -> Option<i64> {
    let s = s.trim();
    let (sign, rest) = match s.strip_prefix('-') {
        Some(r) => (-1, r),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse::<i64>().ok().map(|v| sign * v)
}

pub fn merge_ward_rows(detail: &[RawRow], ward: &[RawRow], age_offset: i64) -> Vec<RawRow> {
    let mut by_card: HashMap<Option<String>, &RawRow> = HashMap::new();
    for row in detail.iter() {
        by_card.insert(field(row, "VCARDID"), row);
    }

    let coalesce = |candidates: [Option<String>; 2]| -> String {
        for candidate in candidates {
            match candidate {
                Some(v) if !v.is_empty() => return v,
                _ => {}
            }
        }
        String::new()
    };

    ward.iter()
        .map(|row| {
            let matched = by_card.get(&field(row, "EPIC_NO"));
            let from_detail = |name: &str| matched.and_then(|m| field(m, name));

            // An offset age that does not parse, or sums to zero, is blank.
            let age = from_detail("AGE")
                .and_then(|a| parse_int_lenient(&a))
                .map(|a| a + age_offset)
                .filter(|a| *a != 0)
                .map(|a| a.to_string())
                .unwrap_or_default();

            let mut out = RawRow::new();
            out.insert(
                "EPIC_NO".to_string(),
                field(row, "EPIC_NO").unwrap_or_default(),
            );
            out.insert(
                "L_FULLNAME".to_string(),
                coalesce([from_detail("L_FULLNAME"), field(row, "FULLNAME_MARATHI")]),
            );
            out.insert(
                "E_FULLNAME".to_string(),
                coalesce([from_detail("E_FULLNAME"), field(row, "VOTER_FULL_NAME")]),
            );
            out.insert(
                "E_FIRST_NAME".to_string(),
                from_detail("E_FIRST_NAME").unwrap_or_default(),
            );
            out.insert(
                "E_MIDDLE_NAME".to_string(),
                from_detail("E_MIDDLE_NAME").unwrap_or_default(),
            );
            out.insert(
                "E_LAST_NAME".to_string(),
                from_detail("E_LAST_NAME").unwrap_or_default(),
            );
            out.insert("SEX".to_string(), from_detail("SEX").unwrap_or_default());
            out.insert("AGE".to_string(), age);
            out.insert(
                "BOOTH_NO".to_string(),
                field(row, "BOOTH_NO").unwrap_or_default(),
            );
            out.insert(
                "SERIAL_NO".to_string(),
                field(row, "SERIAL_NO").unwrap_or_default(),
            );
            out.insert(
                "BOOTH_ADDRESS".to_string(),
                field(row, "BOOTH_ADDRESS").unwrap_or_default(),
            );
            out
        })
        .collect()
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

    #[test]
    fn matched_rows_take_the_detail_fields_with_the_age_offset() {
        let detail = vec![row(&[
            ("VCARDID", "ABC123"),
            ("E_FULLNAME", "John Smith"),
            ("E_FIRST_NAME", "John"),
            ("AGE", "40"),
            ("SEX", "M"),
        ])];
        let ward = vec![row(&[
            ("EPIC_NO", "ABC123"),
            ("VOTER_FULL_NAME", "J Smith"),
            ("BOOTH_NO", "12"),
            ("SERIAL_NO", "345"),
        ])];
        let merged = merge_ward_rows(&detail, &ward, 2);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].get("E_FULLNAME").unwrap(), "John Smith");
        assert_eq!(merged[0].get("AGE").unwrap(), "42");
        assert_eq!(merged[0].get("SEX").unwrap(), "M");
        assert_eq!(merged[0].get("BOOTH_NO").unwrap(), "12");
    }

    #[test]
    fn unmatched_rows_fall_back_to_the_ward_columns() {
        let ward = vec![row(&[
            ("EPIC_NO", "XYZ789"),
            ("VOTER_FULL_NAME", "Asha Kale"),
            ("FULLNAME_MARATHI", "आशा काळे"),
        ])];
        let merged = merge_ward_rows(&[], &ward, 2);
        assert_eq!(merged[0].get("E_FULLNAME").unwrap(), "Asha Kale");
        assert_eq!(merged[0].get("L_FULLNAME").unwrap(), "आशा काळे");
        assert_eq!(merged[0].get("AGE").unwrap(), "");
        assert_eq!(merged[0].get("E_FIRST_NAME").unwrap(), "");
    }

    #[test]
    fn a_non_numeric_detail_age_stays_blank() {
        let detail = vec![row(&[("VCARDID", "A"), ("AGE", "unknown")])];
        let ward = vec![row(&[("EPIC_NO", "A")])];
        let merged = merge_ward_rows(&detail, &ward, 2);
        assert_eq!(merged[0].get("AGE").unwrap(), "");
    }

    #[test]
    fn an_offset_age_of_zero_collapses_to_blank() {
        let detail = vec![row(&[("VCARDID", "A"), ("AGE", "-2")])];
        let ward = vec![row(&[("EPIC_NO", "A")])];
        let merged = merge_ward_rows(&detail, &ward, 2);
        assert_eq!(merged[0].get("AGE").unwrap(), "");
    }

    #[test]
    fn the_last_detail_row_wins_for_a_repeated_card_id() {
        let detail = vec![
            row(&[("VCARDID", "A"), ("SEX", "M")]),
            row(&[("VCARDID", "A"), ("SEX", "F")]),
        ];
        let ward = vec![row(&[("EPIC_NO", "A")])];
        let merged = merge_ward_rows(&detail, &ward, 2);
        assert_eq!(merged[0].get("SEX").unwrap(), "F");
    }

    #[test]
    fn parse_int_lenient_takes_the_leading_digits() {
        assert_eq!(parse_int_lenient("42"), Some(42));
        assert_eq!(parse_int_lenient(" 42 years"), Some(42));
        assert_eq!(parse_int_lenient("-2"), Some(-2));
        assert_eq!(parse_int_lenient("years 42"), None);
        assert_eq!(parse_int_lenient(""), None);
    }
}
