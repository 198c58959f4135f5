use log::{info, warn};

use household_grouping::*;
use snafu::{prelude::*, Snafu};

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::SeedableRng;

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::roll::config_reader::*;

pub mod config_reader;
pub mod io_common;
pub mod io_csv;
pub mod io_xlsx;
pub mod lists;
pub mod merge;

/// One parsed input row: header name to cell text. Header names are matched
/// exactly and case-sensitively everywhere.
pub type RawRow = HashMap<String, String>;

/// A parsed tabular file: the header row in file order plus the data rows.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

#[derive(Debug, Snafu)]
pub enum RollError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The workbook has no usable worksheet"))]
    EmptyExcel {},
    #[snafu(display("Error opening the CSV file"))]
    CsvOpen { source: csv::Error },
    #[snafu(display("Error parsing a CSV line"))]
    CsvLineParse { source: csv::Error },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display(""))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error creating file {path}"))]
    CreatingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing the output table"))]
    WritingTable { source: csv::Error },
    #[snafu(display("Error flushing the output table"))]
    FlushingTable { source: std::io::Error },
    #[snafu(display("Grouping failed: {source}"))]
    Grouping { source: GroupingErrors },
    #[snafu(display("The configuration file has no parent directory"))]
    MissingParentDir {},

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type RollResult<T> = Result<T, RollError>;

pub fn run_app(args: &Args) -> RollResult<()> {
    let mode = args.mode.as_deref().unwrap_or("family");
    match mode {
        "family" => run_family(args),
        "merge" => run_merge(args),
        "booth" => run_booth(args),
        "search" => run_search(args),
        "surname" => run_surnames(args),
        x => whatever!("Unknown mode {:?}", x),
    }
}

fn read_input_table(
    path: &str,
    input_type: Option<&str>,
    worksheet: Option<&str>,
) -> RollResult<RawTable> {
    let resolved = match input_type {
        Some(t) => t.to_string(),
        None if path.to_lowercase().ends_with(".xlsx") => "xlsx".to_string(),
        None => "csv".to_string(),
    };
    info!("Attempting to read list file {:?} as {:?}", path, resolved);
    match resolved.as_str() {
        "csv" => io_csv::read_raw_table(path),
        "xlsx" => io_xlsx::read_raw_table(path, worksheet),
        x => whatever!("Input type not implemented {:?}", x),
    }
}

// **** family mode ****

fn run_family(args: &Args) -> RollResult<()> {
    let config: Option<RollConfig> = match &args.config {
        Some(path) => Some(read_config(path)?),
        None => None,
    };

    let rules = match &config {
        Some(c) => validate_rules(&c.rules)?,
        None => GroupingRules::DEFAULT_RULES,
    };
    let seed = match &config {
        Some(c) => random_seed(&c.rules)?,
        None => None,
    };

    let mut raw_rows: Vec<RawRow> = Vec::new();
    if let Some(input) = &args.input {
        let table = read_input_table(
            input,
            args.input_type.as_deref(),
            args.excel_worksheet_name.as_deref(),
        )?;
        raw_rows.extend(table.rows);
    } else if let Some(c) = &config {
        if c.voter_file_sources.is_empty() {
            whatever!("no file sources detected");
        }
        let config_path = args.config.as_deref().unwrap_or("");
        let root_p = Path::new(config_path)
            .parent()
            .context(MissingParentDirSnafu {})?;
        for source in &c.voter_file_sources {
            let p = root_p.join(&source.file_path);
            let p2 = p.as_path().display().to_string();
            let table = read_input_table(
                &p2,
                Some(source.provider.as_str()),
                source.excel_worksheet_name.as_deref(),
            )?;
            raw_rows.extend(table.rows);
        }
    } else {
        whatever!("No input provided: use the --input or --config option");
    }

    let records = io_common::voter_records(&raw_rows);
    info!("run_family: {:?} records read", records.len());

    let mut rng: StdRng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    let result = run_household_grouping(&records, &rules, &mut rng).context(GroupingSnafu {})?;

    let list_name = config
        .as_ref()
        .map(|c| c.output_settings.list_name.clone())
        .or_else(|| args.input.as_deref().map(io_common::simplify_file_name))
        .unwrap_or_else(|| "voter list".to_string());

    let target = match args.out.as_deref() {
        Some("stdout") => None,
        Some(p) => Some(PathBuf::from(p)),
        None => config
            .as_ref()
            .and_then(|c| c.output_settings.output_directory.as_ref())
            .map(|dir| Path::new(dir).join(format!("{}_households.csv", list_name))),
    };
    let mut wtr = open_table_writer(&target)?;
    io_csv::write_household_table(&mut wtr, &result.rows)?;
    if let Some(p) = &target {
        info!("run_family: table written to {:?}", p);
    }

    // Assemble the final json
    let summary_js = build_summary_js(&list_name, &result);
    let pretty_js_summary =
        serde_json::to_string_pretty(&summary_js).context(ParsingJsonSnafu {})?;
    println!("summary:{}", pretty_js_summary);

    // The reference summary, if provided for comparison
    if let Some(summary_p) = &args.reference {
        let summary_ref = read_summary(summary_p.clone())?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_summary {
            warn!("Found differences with the reference summary");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_summary.as_ref(),
                "\n",
            );
            whatever!("Difference detected between computed summary and reference summary")
        }
    }

    Ok(())
}

fn validate_rules(roll_rules: &RollRules) -> RollResult<GroupingRules> {
    let res = GroupingRules {
        min_household_size: match roll_rules.min_household_size.parse::<usize>() {
            Result::Ok(x) if x >= 1 => x,
            x => {
                whatever!("Failed to understand minHouseholdSize option: {:?}", x)
            }
        },
        max_household_size: match roll_rules.max_household_size.parse::<usize>() {
            Result::Ok(x) if x >= 1 => x,
            x => {
                whatever!("Failed to understand maxHouseholdSize option: {:?}", x)
            }
        },
        fuzzy_prefix_len: match roll_rules.fuzzy_prefix_length.parse::<usize>() {
            Result::Ok(x) if x >= 1 => x,
            x => {
                whatever!("Failed to understand fuzzyPrefixLength option: {:?}", x)
            }
        },
        backfill_mobile: roll_rules.backfill_mobile.unwrap_or(true),
    };
    Ok(res)
}

fn build_summary_js(list_name: &str, result: &GroupingResult) -> JSValue {
    let mut households: Vec<JSValue> = Vec::new();
    let mut current: Vec<JSValue> = Vec::new();
    for row in result.rows.iter() {
        match row {
            HouseholdRow::Member { record, .. } => {
                current.push(json!(record.vcard_id.clone().unwrap_or_default()));
            }
            HouseholdRow::Divider => {
                households.push(json!({
                    "size": current.len(),
                    "members": current
                }));
                current = Vec::new();
            }
        }
    }
    json!({
        "listName": list_name,
        "householdCount": households.len(),
        "households": households
    })
}

// **** linear list modes ****

fn run_merge(args: &Args) -> RollResult<()> {
    let detail_path = match &args.input {
        Some(p) => p.clone(),
        None => whatever!("The merge mode requires --input with the detail export"),
    };
    let ward_path = match &args.secondary {
        Some(p) => p.clone(),
        None => whatever!("The merge mode requires --secondary with the ward list"),
    };
    let detail = read_input_table(
        &detail_path,
        args.input_type.as_deref(),
        args.excel_worksheet_name.as_deref(),
    )?;
    let ward = read_input_table(&ward_path, None, None)?;

    let offset = match &args.config {
        Some(path) => age_offset(&read_config(path)?.rules)?,
        None => merge::DEFAULT_AGE_OFFSET,
    };

    let merged = merge::merge_ward_rows(&detail.rows, &ward.rows, offset);
    info!(
        "run_merge: {:?} ward rows merged against {:?} detail rows",
        merged.len(),
        detail.rows.len()
    );

    let headers: Vec<String> = merge::MERGED_HEADERS.iter().map(|h| h.to_string()).collect();
    let mut wtr = open_table_writer(&flag_target(args))?;
    io_csv::write_raw_table(&mut wtr, &headers, &merged)
}

fn run_booth(args: &Args) -> RollResult<()> {
    let done_path = match &args.input {
        Some(p) => p.clone(),
        None => whatever!("The booth mode requires --input with the voting-done list"),
    };
    let roll_path = match &args.secondary {
        Some(p) => p.clone(),
        None => whatever!("The booth mode requires --secondary with the full roll"),
    };
    let done = read_input_table(
        &done_path,
        args.input_type.as_deref(),
        args.excel_worksheet_name.as_deref(),
    )?;
    let roll = read_input_table(&roll_path, None, None)?;

    let matched = lists::booth_done_rows(&done.rows, &roll);
    info!(
        "run_booth: {:?} of {:?} rows matched",
        matched.rows.len(),
        roll.rows.len()
    );

    let mut wtr = open_table_writer(&flag_target(args))?;
    io_csv::write_raw_table(&mut wtr, &matched.headers, &matched.rows)?;
    println!("matched:{}", matched.rows.len());
    Ok(())
}

fn run_search(args: &Args) -> RollResult<()> {
    let input = match &args.input {
        Some(p) => p.clone(),
        None => whatever!("The search mode requires --input with the voter list"),
    };
    let query = match &args.query {
        Some(q) => q.clone(),
        None => whatever!("The search mode requires --query"),
    };
    let table = read_input_table(
        &input,
        args.input_type.as_deref(),
        args.excel_worksheet_name.as_deref(),
    )?;

    let found = lists::search_rows(&table, &query);
    info!(
        "run_search: {:?} of {:?} rows kept for {:?}",
        found.rows.len(),
        table.rows.len(),
        query
    );

    let mut wtr = open_table_writer(&flag_target(args))?;
    io_csv::write_raw_table(&mut wtr, &found.headers, &found.rows)?;
    println!("results:{}", found.rows.len());
    Ok(())
}

fn run_surnames(args: &Args) -> RollResult<()> {
    let input = match &args.input {
        Some(p) => p.clone(),
        None => whatever!("The surname mode requires --input with the voter list"),
    };
    let table = read_input_table(
        &input,
        args.input_type.as_deref(),
        args.excel_worksheet_name.as_deref(),
    )?;

    let groups = lists::surname_groups(&table.rows);
    info!("run_surnames: {:?} surname groups", groups.len());

    let grouped = lists::surname_table(&groups);
    let mut wtr = open_table_writer(&flag_target(args))?;
    io_csv::write_raw_table(&mut wtr, &grouped.headers, &grouped.rows)
}

// **** output plumbing ****

fn flag_target(args: &Args) -> Option<PathBuf> {
    match args.out.as_deref() {
        None | Some("stdout") => None,
        Some(p) => Some(PathBuf::from(p)),
    }
}

fn open_table_writer(target: &Option<PathBuf>) -> RollResult<csv::Writer<Box<dyn std::io::Write>>> {
    let out: Box<dyn std::io::Write> = match target {
        Some(p) => {
            let path = p.as_path().display().to_string();
            Box::new(File::create(p).context(CreatingOutputSnafu { path })?)
        }
        None => Box::new(std::io::stdout()),
    };
    Ok(csv::Writer::from_writer(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roll_rules(min: &str, max: &str, prefix: &str) -> RollRules {
        RollRules {
            min_household_size: min.to_string(),
            max_household_size: max.to_string(),
            fuzzy_prefix_length: prefix.to_string(),
            backfill_mobile: None,
            random_seed: None,
            age_offset: None,
        }
    }

    #[test]
    fn validate_rules_accepts_the_default_bounds() {
        let rules = validate_rules(&roll_rules("6", "15", "5")).unwrap();
        assert_eq!(rules, GroupingRules::DEFAULT_RULES);
    }

    #[test]
    fn validate_rules_rejects_unparseable_options() {
        assert!(validate_rules(&roll_rules("many", "15", "5")).is_err());
        assert!(validate_rules(&roll_rules("0", "15", "5")).is_err());
        assert!(validate_rules(&roll_rules("6", "15", "0")).is_err());
    }

    #[test]
    fn random_seed_is_optional_but_strict() {
        assert_eq!(random_seed(&roll_rules("6", "15", "5")).unwrap(), None);
        let mut with_seed = roll_rules("6", "15", "5");
        with_seed.random_seed = Some("42".to_string());
        assert_eq!(random_seed(&with_seed).unwrap(), Some(42));
        with_seed.random_seed = Some("not-a-seed".to_string());
        assert!(random_seed(&with_seed).is_err());
    }

    #[test]
    fn the_config_file_format_is_understood() {
        let text = r#"{
            "outputSettings": {"listName": "ward-7", "outputDirectory": "out"},
            "voterFileSources": [
                {"provider": "csv", "filePath": "ward7.csv"},
                {"provider": "xlsx", "filePath": "ward8.xlsx", "excelWorksheetName": "Roll"}
            ],
            "rules": {
                "minHouseholdSize": "6",
                "maxHouseholdSize": "15",
                "fuzzyPrefixLength": "5",
                "backfillMobile": true,
                "randomSeed": "7",
                "ageOffset": "2"
            }
        }"#;
        let config: RollConfig = serde_json::from_str(text).unwrap();
        assert_eq!(config.output_settings.list_name, "ward-7");
        assert_eq!(config.voter_file_sources.len(), 2);
        assert_eq!(config.voter_file_sources[1].provider, "xlsx");
        assert_eq!(
            config.voter_file_sources[1].excel_worksheet_name.as_deref(),
            Some("Roll")
        );
        assert_eq!(validate_rules(&config.rules).unwrap(), GroupingRules::DEFAULT_RULES);
        assert_eq!(random_seed(&config.rules).unwrap(), Some(7));
        assert_eq!(age_offset(&config.rules).unwrap(), 2);
    }

    #[test]
    fn the_summary_lists_households_in_order() {
        let member = |id: &str| HouseholdRow::Member {
            record: VoterRecord {
                vcard_id: Some(id.to_string()),
                ..VoterRecord::default()
            },
            mobile: "7000000000".to_string(),
        };
        let result = GroupingResult {
            rows: vec![
                member("a"),
                member("b"),
                HouseholdRow::Divider,
                member("c"),
                HouseholdRow::Divider,
            ],
            household_sizes: vec![2, 1],
        };
        let js = build_summary_js("ward-7", &result);
        assert_eq!(js["listName"], json!("ward-7"));
        assert_eq!(js["householdCount"], json!(2));
        assert_eq!(js["households"][0]["size"], json!(2));
        assert_eq!(js["households"][0]["members"], json!(["a", "b"]));
        assert_eq!(js["households"][1]["members"], json!(["c"]));
    }
}
