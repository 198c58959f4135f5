pub use crate::config::*;

use rand::Rng;

/// A builder for assembling a voter roll before grouping.
///
/// ```
/// pub use household_grouping::builder::Builder;
/// pub use household_grouping::GroupingRules;
/// # use household_grouping::GroupingErrors;
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
///
/// let mut builder = Builder::new(&GroupingRules::DEFAULT_RULES)?;
/// builder.add_named("CARD-1", "John", "", "Smith")?;
///
/// let mut rng = StdRng::seed_from_u64(42);
/// let result = builder.run(&mut rng)?;
/// // A single candidate head is far below the default size bounds.
/// assert!(result.rows.is_empty());
/// # Ok::<(), GroupingErrors>(())
/// ```
pub struct Builder {
    pub(crate) _rules: GroupingRules,
    pub(crate) _records: Vec<VoterRecord>,
}

impl Builder {
    pub fn new(rules: &GroupingRules) -> Result<Builder, GroupingErrors> {
        if rules.min_household_size == 0 || rules.min_household_size > rules.max_household_size {
            return Err(GroupingErrors::InvalidSizeBounds);
        }
        if rules.fuzzy_prefix_len == 0 {
            return Err(GroupingErrors::InvalidPrefixLength);
        }
        Ok(Builder {
            _rules: rules.clone(),
            _records: Vec::new(),
        })
    }

    /// Adds a record from its name parts. Empty strings count as missing.
    ///
    /// It is the simplest use case; records with more fields go through
    /// [`Builder::add_record`].
    pub fn add_named(
        &mut self,
        vcard_id: &str,
        first: &str,
        middle: &str,
        last: &str,
    ) -> Result<(), GroupingErrors> {
        let opt = |s: &str| {
            if s.is_empty() {
                None
            } else {
                Some(s.to_string())
            }
        };
        let record = VoterRecord {
            vcard_id: opt(vcard_id),
            first_name: opt(first),
            middle_name: opt(middle),
            last_name: opt(last),
            ..VoterRecord::default()
        };
        self.add_record(&record)
    }

    pub fn add_record(&mut self, record: &VoterRecord) -> Result<(), GroupingErrors> {
        self._records.push(record.clone());
        Ok(())
    }

    /// Runs the grouping over the records added so far.
    pub fn run<R: Rng>(&self, rng: &mut R) -> Result<GroupingResult, GroupingErrors> {
        crate::run_household_grouping(&self._records, &self._rules, rng)
    }
}
