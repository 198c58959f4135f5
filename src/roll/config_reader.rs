use crate::roll::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;
use snafu::prelude::*;
use std::fs;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "listName")]
    pub list_name: String,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
    #[serde(rename = "listDate")]
    pub list_date: Option<String>,
    #[serde(rename = "ward")]
    pub ward: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RollRules {
    #[serde(rename = "minHouseholdSize")]
    pub min_household_size: String,
    #[serde(rename = "maxHouseholdSize")]
    pub max_household_size: String,
    #[serde(rename = "fuzzyPrefixLength")]
    pub fuzzy_prefix_length: String,
    #[serde(rename = "backfillMobile")]
    pub backfill_mobile: Option<bool>,
    #[serde(rename = "randomSeed")]
    pub random_seed: Option<String>,
    #[serde(rename = "ageOffset")]
    pub age_offset: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RollConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    #[serde(rename = "voterFileSources")]
    pub voter_file_sources: Vec<FileSource>,
    pub rules: RollRules,
}

pub fn read_config(path: &str) -> RollResult<RollConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu {
        path: path.to_string(),
    })?;
    let config: RollConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(config)
}

pub fn read_summary(path: String) -> RollResult<JSValue> {
    let contents = fs::read_to_string(path.clone()).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

pub fn random_seed(rules: &RollRules) -> RollResult<Option<u64>> {
    match rules.random_seed.clone().map(|s| s.parse::<u64>()) {
        None => Ok(None),
        Some(Result::Ok(x)) => Ok(Some(x)),
        x => {
            whatever!("Cannot use random seed {:?}", x)
        }
    }
}

pub fn age_offset(rules: &RollRules) -> RollResult<i64> {
    match rules.age_offset.clone().map(|s| s.parse::<i64>()) {
        None => Ok(merge::DEFAULT_AGE_OFFSET),
        Some(Result::Ok(x)) => Ok(x),
        x => {
            whatever!("Failed to understand ageOffset option: {:?}", x)
        }
    }
}
