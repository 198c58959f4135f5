// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// A single voter-roll record, as mapped from one row of an uploaded list.
///
/// All the fields are optional: uploaded lists routinely miss columns or
/// carry blank cells. The grouping passes treat a missing field and an empty
/// string the same way, except for deduplication where the distinction of the
/// source row is kept.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct VoterRecord {
    /// Unique card identifier. Members of an assembled household are
    /// deduplicated on this value.
    pub vcard_id: Option<String>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    /// Pre-assembled full name in English. Takes precedence over the name
    /// parts when rendering.
    pub full_name: Option<String>,
    /// Full name in the local script.
    pub local_full_name: Option<String>,
    pub sex: Option<String>,
    /// Age as it appears in the list. Parsed leniently for sorting.
    pub age: Option<String>,
    pub mobile: Option<String>,
    pub part_no: Option<String>,
    pub serial_no: Option<String>,
}

impl VoterRecord {
    /// The displayable full name: the pre-assembled one when present, else
    /// the name parts joined with single spaces and trimmed at both ends.
    pub fn resolved_full_name(&self) -> String {
        match self.full_name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!(
                "{} {} {}",
                self.first_name.as_deref().unwrap_or(""),
                self.middle_name.as_deref().unwrap_or(""),
                self.last_name.as_deref().unwrap_or("")
            )
            .trim()
            .to_string(),
        }
    }
}

// ******** Output data structures *********

/// One row of the grouped output table.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum HouseholdRow {
    /// Structural separator emitted after each household block. Carries no
    /// data fields.
    Divider,
    /// A household member together with its resolved mobile number: the
    /// trimmed original when non-blank, else a generated one.
    Member { record: VoterRecord, mobile: String },
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct GroupingResult {
    /// The output rows, one block per accepted household, each block
    /// followed by exactly one divider.
    pub rows: Vec<HouseholdRow>,
    /// Post-dedup sizes of the accepted households, in emission order.
    pub household_sizes: Vec<usize>,
}

/// Errors that prevent the grouping from running at all.
///
/// The grouping itself is total: once the rules are accepted, every input
/// produces a result. Households outside the size bounds are dropped
/// silently, which is a filtering outcome and not an error.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum GroupingErrors {
    InvalidSizeBounds,
    InvalidPrefixLength,
}

impl Error for GroupingErrors {}

impl Display for GroupingErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GroupingErrors::InvalidSizeBounds => {
                write!(f, "invalid household size bounds in grouping rules")
            }
            GroupingErrors::InvalidPrefixLength => {
                write!(f, "invalid fuzzy prefix length in grouping rules")
            }
        }
    }
}

// ********* Configuration **********

/// The rules that govern one grouping run.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct GroupingRules {
    /// Inclusive lower bound on the post-dedup household size.
    pub min_household_size: usize,
    /// Inclusive upper bound on the post-dedup household size.
    pub max_household_size: usize,
    /// Number of leading characters compared by the middle-name fuzzy match.
    pub fuzzy_prefix_len: usize,
    /// Replace blank mobile numbers with generated ones in the output.
    pub backfill_mobile: bool,
}

impl GroupingRules {
    pub const DEFAULT_RULES: GroupingRules = GroupingRules {
        min_household_size: 6,
        max_household_size: 15,
        fuzzy_prefix_len: 5,
        backfill_mobile: true,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolved_full_name_prefers_the_assembled_name() {
        let rec = VoterRecord {
            full_name: Some("John A Smith".to_string()),
            first_name: Some("Johnny".to_string()),
            ..VoterRecord::default()
        };
        assert_eq!(rec.resolved_full_name(), "John A Smith");
    }

    #[test]
    fn resolved_full_name_joins_the_parts() {
        let rec = VoterRecord {
            first_name: Some("John".to_string()),
            middle_name: Some("A".to_string()),
            last_name: Some("Smith".to_string()),
            ..VoterRecord::default()
        };
        assert_eq!(rec.resolved_full_name(), "John A Smith");
    }

    #[test]
    fn resolved_full_name_keeps_the_inner_gap_of_a_missing_middle_name() {
        // The slots are joined with single spaces before trimming, so a
        // missing middle name leaves a doubled space between first and last.
        let rec = VoterRecord {
            first_name: Some("John".to_string()),
            last_name: Some("Smith".to_string()),
            ..VoterRecord::default()
        };
        assert_eq!(rec.resolved_full_name(), "John  Smith");
    }

    #[test]
    fn resolved_full_name_of_an_empty_record_is_empty() {
        assert_eq!(VoterRecord::default().resolved_full_name(), "");
    }
}
