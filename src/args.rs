use clap::Parser;

/// This is a scoring and reporting program for the POMS mood questionnaire.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The Excel workbook (.xlsx) with the raw questionnaire answers. The first
    /// row holds the column names; a 姓名 column identifies each respondent and each of the
    /// 40 question columns starts with its question number.
    #[clap(short, long, value_parser)]
    pub input: String,

    /// (file path or empty) Optional Excel workbook with a 姓名 column giving the desired
    /// order of the respondents in all the outputs.
    #[clap(short, long, value_parser)]
    pub order: Option<String>,

    /// (append or drop) What to do with respondents that are missing from the order file:
    /// append them after the listed ones, or drop them.
    #[clap(long, value_parser, default_value = "append")]
    pub unlisted: String,

    /// (file path or empty) If specified, the result table is written there as CSV
    /// (UTF-8 with a byte-order mark, for spreadsheet compatibility).
    #[clap(long, value_parser)]
    pub csv_out: Option<String>,

    /// (file path or empty) If specified, the summary statistics are written there in
    /// JSON format.
    #[clap(long, value_parser)]
    pub json_out: Option<String>,

    /// (file path or empty) If specified, the selected chart is rendered there as SVG.
    #[clap(long, value_parser)]
    pub chart_out: Option<String>,

    /// (radar, bar, box or scatter) The chart type to render. Radar and bar plot the
    /// per-scale means; box and scatter plot the individual scores.
    #[clap(long, value_parser, default_value = "bar")]
    pub chart_type: String,

    /// (list of comma-separated scale names or not specified) The scales to plot. Accepts
    /// the Chinese scale names, the ASCII aliases (tension, anger, fatigue, depression,
    /// vigor, confusion, self-esteem) and TMD. Defaults to TMD alone.
    #[clap(long, value_parser, use_value_delimiter = true)]
    pub scales: Option<Vec<String>>,

    /// If passed as an argument, question columns are matched by bare numeric prefix,
    /// replicating the historical binding ambiguity between e.g. 1 and 10-19.
    #[clap(long, takes_value = false)]
    pub prefix_match: bool,

    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
