mod config;
use log::{debug, info};

use rand::Rng;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::hash::Hash;

pub mod builder;
pub mod manual;

pub use crate::config::*;

// **** Private structures ****

/// Map with first-insertion iteration order and exact-key lookup.
///
/// Overwriting an existing key replaces the value but keeps the original
/// position. Both indices built by the grouping passes depend on this:
/// head detection is last-write-wins and household assembly walks the heads
/// in the order their keys first appeared.
struct OrderedIndex<K, V> {
    entries: Vec<(K, V)>,
    positions: HashMap<K, usize>,
}

impl<K: Eq + Hash + Clone, V> OrderedIndex<K, V> {
    fn new() -> OrderedIndex<K, V> {
        OrderedIndex {
            entries: Vec::new(),
            positions: HashMap::new(),
        }
    }

    fn insert(&mut self, key: K, value: V) {
        match self.positions.get(&key) {
            Some(&idx) => {
                self.entries[idx].1 = value;
            }
            None => {
                self.positions.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    fn get(&self, key: &K) -> Option<&V> {
        self.positions.get(key).map(|&idx| &self.entries[idx].1)
    }

    fn get_mut_or_insert_with(&mut self, key: K, default: impl FnOnce() -> V) -> &mut V {
        let idx = match self.positions.get(&key) {
            Some(&idx) => idx,
            None => {
                let idx = self.entries.len();
                self.positions.insert(key.clone(), idx);
                self.entries.push((key, default()));
                idx
            }
        };
        &mut self.entries[idx].1
    }

    fn iter(&self) -> impl Iterator<Item = &(K, V)> {
        self.entries.iter()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

// **** Name helpers ****

fn norm(part: Option<&str>) -> String {
    part.unwrap_or("").trim().to_lowercase()
}

/// Lower-cases and trims two optional name components and joins them with a
/// single space. Total over all inputs; two keys are equal only by exact
/// string equality.
pub fn normalize_key(a: Option<&str>, b: Option<&str>) -> String {
    format!("{} {}", norm(a), norm(b))
}

/// The first two space-separated tokens of a composite key. Missing tokens
/// come back empty; any further tokens are ignored.
fn split_key(key: &str) -> (&str, &str) {
    let mut parts = key.split(' ');
    (parts.next().unwrap_or(""), parts.next().unwrap_or(""))
}

/// Two name fragments fuzzy-match when either one starts with the other
/// truncated to its first `prefix_len` characters. Symmetric by
/// construction.
fn fuzzy_match(a: &str, b: &str, prefix_len: usize) -> bool {
    let a_prefix: String = a.chars().take(prefix_len).collect();
    let b_prefix: String = b.chars().take(prefix_len).collect();
    a.starts_with(&b_prefix) || b.starts_with(&a_prefix)
}

/// Total age parse for sorting: leading sign and digits are taken, anything
/// else counts as zero.
pub fn parse_age_or_zero(age: Option<&str>) -> i64 {
    let s = age.unwrap_or("").trim();
    let (sign, rest) = match s.strip_prefix('-') {
        Some(r) => (-1, r),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse::<i64>().map(|v| sign * v).unwrap_or(0)
}

/// Generates a 10-digit mobile number: the leading digit is drawn from
/// {7, 8, 9}, the remaining nine from {0..9}. Numbers are independent per
/// call and are not checked for uniqueness.
pub fn generate_mobile<R: Rng>(rng: &mut R) -> String {
    let mut number = String::with_capacity(10);
    let first = [b'7', b'8', b'9'][rng.gen_range(0..3)];
    number.push(first as char);
    for _ in 0..9 {
        number.push((b'0' + rng.gen_range(0..10u8)) as char);
    }
    number
}

// **** Grouping passes ****

/// Builds the head index: one candidate head per normalized (first, last)
/// key. A record is a candidate only when both parts are non-empty after
/// trimming; the last record in input order wins for a repeated key.
fn detect_heads(records: &[VoterRecord]) -> OrderedIndex<String, VoterRecord> {
    let mut heads: OrderedIndex<String, VoterRecord> = OrderedIndex::new();
    for rec in records.iter() {
        let first = rec.first_name.as_deref().map(str::trim).unwrap_or("");
        let last = rec.last_name.as_deref().map(str::trim).unwrap_or("");
        if first.is_empty() || last.is_empty() {
            continue;
        }
        let key = normalize_key(rec.first_name.as_deref(), rec.last_name.as_deref());
        heads.insert(key, rec.clone());
    }
    heads
}

/// Builds the sibling clusters keyed by "<middle> <last>".
///
/// Single left-to-right pass: the existing keys are scanned in insertion
/// order and the first one whose last component matches exactly and whose
/// middle component fuzzy-matches absorbs the record; otherwise a new key is
/// minted. A cluster keeps the key it was minted with even when later
/// records would have suggested a different representative.
fn cluster_siblings(
    records: &[VoterRecord],
    prefix_len: usize,
) -> OrderedIndex<String, Vec<VoterRecord>> {
    let mut clusters: OrderedIndex<String, Vec<VoterRecord>> = OrderedIndex::new();
    for rec in records.iter() {
        let (middle_raw, last_raw) = match (rec.middle_name.as_deref(), rec.last_name.as_deref()) {
            (Some(m), Some(l)) if !m.is_empty() && !l.is_empty() => (m, l),
            _ => continue,
        };
        let middle = middle_raw.trim().to_lowercase();
        let last = last_raw.trim().to_lowercase();

        let mut matched_key: Option<String> = None;
        for (existing, _) in clusters.iter() {
            let (existing_mid, existing_last) = split_key(existing);
            if existing_last == last
                && !existing_mid.is_empty()
                && !middle.is_empty()
                && fuzzy_match(existing_mid, &middle, prefix_len)
            {
                matched_key = Some(existing.clone());
                break;
            }
        }

        let key = matched_key.unwrap_or_else(|| format!("{} {}", middle, last));
        debug!(
            "cluster_siblings: record {:?} -> cluster {:?}",
            rec.vcard_id, key
        );
        clusters.get_mut_or_insert_with(key, Vec::new).push(rec.clone());
    }
    clusters
}

/// Assembles the households: one candidate per head, expanded with the
/// first-level cluster under the head's own first+last key and, one hop
/// further, the clusters under each first-level member's first+last key.
/// Candidates are deduplicated by card id, bounded by the size rules,
/// sorted by descending age and emitted with a trailing divider.
fn assemble_households<R: Rng>(
    heads: &OrderedIndex<String, VoterRecord>,
    clusters: &OrderedIndex<String, Vec<VoterRecord>>,
    rules: &GroupingRules,
    rng: &mut R,
) -> GroupingResult {
    let mut rows: Vec<HouseholdRow> = Vec::new();
    let mut household_sizes: Vec<usize> = Vec::new();

    for (key, head) in heads.iter() {
        let (first, last) = split_key(key);
        let first_level_key = format!("{} {}", first, last);
        let first_level: &[VoterRecord] = clusters
            .get(&first_level_key)
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        let mut family: Vec<&VoterRecord> = Vec::with_capacity(1 + first_level.len());
        family.push(head);
        family.extend(first_level.iter());
        for member in first_level.iter() {
            let member_key =
                normalize_key(member.first_name.as_deref(), member.last_name.as_deref());
            if let Some(second_level) = clusters.get(&member_key) {
                family.extend(second_level.iter());
            }
        }

        // Dedup by card id: the last record wins for a repeated id, at the
        // position where the id first appeared. Records without an id share
        // one key and collapse together.
        let mut unique: OrderedIndex<Option<String>, &VoterRecord> = OrderedIndex::new();
        for rec in family {
            unique.insert(rec.vcard_id.clone(), rec);
        }

        if unique.len() < rules.min_household_size || unique.len() > rules.max_household_size {
            debug!(
                "assemble_households: head {:?}: size {:?} out of bounds, dropping",
                key,
                unique.len()
            );
            continue;
        }

        let mut members: Vec<&VoterRecord> = unique.iter().map(|(_, rec)| *rec).collect();
        members.sort_by_key(|rec| Reverse(parse_age_or_zero(rec.age.as_deref())));

        household_sizes.push(members.len());
        for rec in members {
            let mobile = match rec.mobile.as_deref().map(str::trim) {
                Some(m) if !m.is_empty() => m.to_string(),
                _ if rules.backfill_mobile => generate_mobile(rng),
                _ => String::new(),
            };
            rows.push(HouseholdRow::Member {
                record: rec.clone(),
                mobile,
            });
        }
        rows.push(HouseholdRow::Divider);
    }

    GroupingResult {
        rows,
        household_sizes,
    }
}

/// Runs the household grouping with the given rules for the given records.
///
/// Arguments:
/// * `records` the voter-roll records to process, in list order
/// * `rules` the size bounds and matching parameters for this run
/// * `rng` the source of digits for mobile backfill; inject a seeded
///   generator for reproducible output
pub fn run_household_grouping<R: Rng>(
    records: &[VoterRecord],
    rules: &GroupingRules,
    rng: &mut R,
) -> Result<GroupingResult, GroupingErrors> {
    if rules.min_household_size == 0 || rules.min_household_size > rules.max_household_size {
        return Err(GroupingErrors::InvalidSizeBounds);
    }
    if rules.fuzzy_prefix_len == 0 {
        return Err(GroupingErrors::InvalidPrefixLength);
    }

    info!(
        "run_household_grouping: processing {:?} records, rules: {:?}",
        records.len(),
        rules
    );

    let heads = detect_heads(records);
    let clusters = cluster_siblings(records, rules.fuzzy_prefix_len);
    debug!(
        "run_household_grouping: {:?} candidate heads, {:?} sibling clusters",
        heads.len(),
        clusters.len()
    );

    let result = assemble_households(&heads, &clusters, rules, rng);
    info!(
        "run_household_grouping: accepted {:?} households, {:?} output rows",
        result.household_sizes.len(),
        result.rows.len()
    );
    Ok(result)
}
