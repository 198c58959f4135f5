use clap::Parser;

/// This is a voter-roll administration program.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (default family) The operation to run: family groups the roll into
    /// reviewable households; merge joins a detail export into a ward list;
    /// booth keeps the rows already marked as voted; search filters the list;
    /// surname groups the list by last name.
    #[clap(short, long, value_parser)]
    pub mode: Option<String>,

    /// (file path, optional) The file describing the grouping run. (Only JSON
    /// descriptions are currently supported.) For more information about the
    /// file format, read the documentation of the `household_grouping` crate.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) The primary input list. Overrides the file sources that may
    /// be specified with the --config option. For the merge mode this is the
    /// detail export; for the booth mode this is the voting-done list.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (default by file extension) The type of the primary input: csv or xlsx.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (file path) The secondary input list, required by the merge mode (ward
    /// list) and the booth mode (full roll).
    #[clap(short, long, value_parser)]
    pub secondary: Option<String>,

    /// (string) The query for the search mode. Every word must match one of
    /// the searchable columns.
    #[clap(short = 'q', long, value_parser)]
    pub query: Option<String>,

    /// (file path, 'stdout' or empty) Where the result table is written in CSV
    /// format. Setting this option overrides the output directory that may be
    /// specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference grouping summary in JSON format. If provided,
    /// rolltab will check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (first worksheet by default) When using an Excel file, indicates the
    /// name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard
    /// output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
