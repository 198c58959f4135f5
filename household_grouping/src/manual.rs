/*!

This is the long-form manual for `household_grouping` and `rolltab`.

## Input formats

The following formats are supported:
* `csv` Comma Separated Values with a header row
* `xlsx` Excel workbooks, first worksheet or a named one

Field names are matched against the header row exactly and case-sensitively.
The fields used by the grouping are:

| Header          | Meaning                                      |
|-----------------|----------------------------------------------|
| `VCARDID`       | unique card identifier, dedup key            |
| `E_FIRST_NAME`  | first name (English)                         |
| `E_MIDDLE_NAME` | middle name (English)                        |
| `E_LAST_NAME`   | last name (English)                          |
| `E_FULLNAME`    | pre-assembled full name, preferred if present|
| `L_FULLNAME`    | full name in the local script                |
| `SEX`           | pass-through                                 |
| `AGE`           | age, parsed leniently for sorting            |
| `MOBILE`        | mobile number, backfilled when blank         |
| `PART_NO`       | pass-through                                 |
| `SRNO`          | serial number in part, pass-through          |

Missing columns are tolerated: the affected records simply never become
household heads or cluster members.

## The grouping heuristic

A record whose first and last name are both present is a candidate *head of
household*. Records carrying a middle and a last name are clustered by
`"<middle> <last>"`, where middle names agreeing on their first five
characters (by default) fall into the same cluster. Each head is then
expanded with the cluster under its own first+last key and, one hop further,
with the clusters under each of those members' first+last keys. After
deduplication by `VCARDID`, households of 6 to 15 members (inclusive, by
default) are kept, sorted oldest first, and separated by divider rows.

Households outside the size bounds are dropped silently. Blank mobile
numbers are replaced by generated 10-digit numbers starting with 7, 8 or 9;
pass a seed to make a run reproducible.

## Operations

`rolltab` bundles the grouping with a few linear list operations:

* `family` (default): run the household grouping and print the table.
* `merge`: join a detail export (keyed `VCARDID`) into a ward list (keyed
  `EPIC_NO`), coalescing names and applying the configured age offset.
* `booth`: keep the rows of the second list whose `SERIAL_NO` appears among
  the first list's `SERIAL_NO_IN_BOOTH` values.
* `search`: multi-word search over `VOTER_FULL_NAME`, `FULLNAME_MARATHI` and
  `EPIC_NO`; every word must match at least one of them.
* `surname`: group records by exact `E_LAST_NAME` in first-encounter order.

## Configuration

`rolltab` comes with sensible defaults but users may want to apply specific
rules (for example, wider household bounds). The program accepts a
configuration file in JSON:

```json
{
  "outputSettings": { "listName": "pawane-ward-7", "outputDirectory": "out" },
  "voterFileSources": [
    { "provider": "csv", "filePath": "ward7.csv" }
  ],
  "rules": {
    "minHouseholdSize": "6",
    "maxHouseholdSize": "15",
    "fuzzyPrefixLength": "5",
    "backfillMobile": true,
    "randomSeed": "42",
    "ageOffset": "2"
  }
}
```

Notes:
- numeric rule values are carried as strings and validated with explicit
  error messages;
- file paths are resolved relative to the configuration file;
- `excelWorksheetName` (string, optional) selects the worksheet for
  Excel-based sources;
- the `--input` and `--out` flags override the sources and the output
  location from the file.

 */
