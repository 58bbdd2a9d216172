mod config;
use log::{debug, warn};

use std::collections::HashMap;

pub use crate::config::*;

// The five response labels of the instrument and their severity scores.
const SCORE_MAP: [(&str, u8); 5] = [
    ("几乎没有", 0),
    ("有一点", 1),
    ("适中", 2),
    ("相当多", 3),
    ("非常地", 4),
];

/// Exact, case-sensitive match of a trimmed cell value against the five
/// response labels. `None` for anything else, including the empty string.
fn lookup(label: &str) -> Option<u8> {
    let trimmed = label.trim();
    SCORE_MAP
        .iter()
        .find(|(l, _)| *l == trimmed)
        .map(|(_, score)| *score)
}

/// The severity score of a response label.
///
/// Any unrecognized input scores 0. This is the lossy policy of the
/// instrument tooling: a skipped question and a lowest-severity answer are
/// indistinguishable in the output. Use [score_rows] to obtain counters for
/// the defaulted cells.
pub fn lookup_score(label: &str) -> u8 {
    lookup(label).unwrap_or(0)
}

fn column_matches(column: &str, question: u8, mode: ColumnMatchMode) -> bool {
    let name = column.trim();
    let number = question.to_string();
    match mode {
        ColumnMatchMode::Prefix => name.starts_with(&number),
        ColumnMatchMode::LeadingNumber => {
            name.starts_with(&number)
                && !name[number.len()..]
                    .chars()
                    .next()
                    .map_or(false, |c| c.is_ascii_digit())
        }
    }
}

// The raw value of the first column matching the question number, if any.
fn find_question_cell<'a>(
    row: &'a RawRow,
    question: u8,
    mode: ColumnMatchMode,
) -> Option<&'a str> {
    row.cells
        .iter()
        .find(|(column, _)| column_matches(column, question, mode))
        .map(|(_, value)| value.as_str())
}

fn total_mood_disturbance(subscales: &[u32; 7]) -> i64 {
    let get = |s: Scale| subscales[s.index()] as i64;
    let negative = get(Scale::Tension)
        + get(Scale::Anger)
        + get(Scale::Fatigue)
        + get(Scale::Depression)
        + get(Scale::Confusion);
    let positive = get(Scale::Vigor) + get(Scale::SelfEsteem);
    negative - positive + 100
}

/// Scores one respondent row.
///
/// For each subscale question, the first matching column is read, trimmed
/// and looked up; unrecognized labels and missing columns contribute 0 and
/// are counted in `diagnostics`. A row with no matching column at all
/// scores 0 on every subscale and TMD = 100.
pub fn score_row(
    row: &RawRow,
    rules: &ScoringRules,
    diagnostics: &mut ScoreDiagnostics,
) -> ResultRow {
    let mut subscales = [0u32; 7];
    for (idx, scale) in ALL_SCALES.iter().enumerate() {
        let mut total: u32 = 0;
        for &question in scale.questions() {
            match find_question_cell(row, question, rules.column_match) {
                Some(value) => match lookup(value) {
                    Some(score) => total += score as u32,
                    None => {
                        debug!(
                            "score_row: {}: unrecognized label {:?} for question {}",
                            row.name, value, question
                        );
                        diagnostics.unknown_labels += 1;
                    }
                },
                None => {
                    debug!(
                        "score_row: {}: no column found for question {}",
                        row.name, question
                    );
                    diagnostics.missing_columns += 1;
                }
            }
        }
        subscales[idx] = total;
    }
    let tmd = total_mood_disturbance(&subscales);
    ResultRow {
        name: row.name.clone(),
        subscales,
        tmd,
    }
}

/// Scores every row of the input table, preserving the input order.
pub fn score_rows(rows: &[RawRow], rules: &ScoringRules) -> ScoredBatch {
    let mut diagnostics = ScoreDiagnostics::default();
    let scored: Vec<ResultRow> = rows
        .iter()
        .map(|row| score_row(row, rules, &mut diagnostics))
        .collect();
    debug!(
        "score_rows: scored {} rows, diagnostics: {:?}",
        scored.len(),
        diagnostics
    );
    ScoredBatch {
        rows: scored,
        diagnostics,
    }
}

/// Re-sorts the result table by the position of each identifier in `order`.
///
/// The sort is stable: duplicate identifiers keep their relative order, and
/// a duplicated entry in the order list counts at its first position. Rows
/// whose identifier is absent from the list follow `policy`.
pub fn apply_name_order(
    rows: Vec<ResultRow>,
    order: &[String],
    policy: UnlistedOrderPolicy,
) -> Vec<ResultRow> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    for (idx, name) in order.iter().enumerate() {
        positions.entry(name.as_str()).or_insert(idx);
    }

    let mut listed: Vec<ResultRow> = Vec::new();
    let mut unlisted: Vec<ResultRow> = Vec::new();
    for row in rows {
        if positions.contains_key(row.name.as_str()) {
            listed.push(row);
        } else {
            unlisted.push(row);
        }
    }
    listed.sort_by_key(|row| positions[row.name.as_str()]);

    match policy {
        UnlistedOrderPolicy::AppendLast => {
            listed.extend(unlisted);
        }
        UnlistedOrderPolicy::Drop => {
            if !unlisted.is_empty() {
                warn!(
                    "apply_name_order: dropping {} rows absent from the order list",
                    unlisted.len()
                );
            }
        }
    }
    listed
}

/// Per-column mean and sample standard deviation over the result table.
///
/// Covers the seven subscales and TMD. An empty table yields an empty
/// summary; a single row yields `sd: None` for every column.
pub fn aggregate(rows: &[ResultRow]) -> Vec<ColumnSummary> {
    if rows.is_empty() {
        return Vec::new();
    }
    let n = rows.len();
    ALL_COLUMNS
        .iter()
        .map(|&column| {
            let values: Vec<f64> = rows
                .iter()
                .map(|row| row.column_score(column) as f64)
                .collect();
            let mean = values.iter().sum::<f64>() / n as f64;
            let sd = if n < 2 {
                None
            } else {
                let variance =
                    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
                Some(variance.sqrt())
            };
            ColumnSummary { column, mean, sd }
        })
        .collect()
}

/// Reshapes the result table into (respondent, scale, score) triples for
/// the selected columns, one triple per row and column.
pub fn melt(rows: &[ResultRow], columns: &[ScoreColumn]) -> Vec<MeltedPoint> {
    let mut res: Vec<MeltedPoint> = Vec::with_capacity(rows.len() * columns.len());
    for row in rows {
        for &column in columns {
            res.push(MeltedPoint {
                name: row.name.clone(),
                column,
                score: row.column_score(column),
            });
        }
    }
    res
}

/// Folds melted points to one mean per column, preserving the order in
/// which the columns first appear.
pub fn mean_series(points: &[MeltedPoint]) -> Vec<(ScoreColumn, f64)> {
    let mut order: Vec<ScoreColumn> = Vec::new();
    let mut acc: HashMap<ScoreColumn, (i64, usize)> = HashMap::new();
    for point in points {
        let entry = acc.entry(point.column).or_insert_with(|| {
            order.push(point.column);
            (0, 0)
        });
        entry.0 += point.score;
        entry.1 += 1;
    }
    order
        .iter()
        .map(|column| {
            let (sum, count) = acc[column];
            (*column, sum as f64 / count as f64)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LABELS: [&str; 5] = ["几乎没有", "有一点", "适中", "相当多", "非常地"];

    // A full 40-question row where every answer carries the same label.
    fn uniform_row(name: &str, label: &str) -> RawRow {
        let cells = (1u8..=40)
            .map(|q| (format!("{}.题目", q), label.to_string()))
            .collect();
        RawRow {
            name: name.to_string(),
            cells,
        }
    }

    fn check_tmd_invariant(row: &ResultRow) {
        let negative: i64 = [
            Scale::Tension,
            Scale::Anger,
            Scale::Fatigue,
            Scale::Depression,
            Scale::Confusion,
        ]
        .iter()
        .map(|&s| row.subscale(s) as i64)
        .sum();
        let positive =
            row.subscale(Scale::Vigor) as i64 + row.subscale(Scale::SelfEsteem) as i64;
        assert_eq!(row.tmd, negative - positive + 100);
    }

    #[test]
    fn lookup_known_labels() {
        for (idx, label) in LABELS.iter().enumerate() {
            assert_eq!(lookup_score(label), idx as u8);
            assert_eq!(lookup_score(&format!("  {}  ", label)), idx as u8);
        }
    }

    #[test]
    fn lookup_unknown_labels_score_zero() {
        for bad in ["", "  ", "2", "almost none", "几乎", "非常地了"] {
            assert_eq!(lookup_score(bad), 0);
        }
    }

    #[test]
    fn zero_severity_row_has_tmd_100() {
        let mut diag = ScoreDiagnostics::default();
        let row = score_row(
            &uniform_row("A", "几乎没有"),
            &ScoringRules::DEFAULT_RULES,
            &mut diag,
        );
        for &scale in ALL_SCALES.iter() {
            assert_eq!(row.subscale(scale), 0);
        }
        assert_eq!(row.tmd, 100);
        assert!(diag.is_clean());
        check_tmd_invariant(&row);
    }

    #[test]
    fn max_severity_row_scores_four_per_question() {
        let mut diag = ScoreDiagnostics::default();
        let row = score_row(
            &uniform_row("A", "非常地"),
            &ScoringRules::DEFAULT_RULES,
            &mut diag,
        );
        for &scale in ALL_SCALES.iter() {
            assert_eq!(row.subscale(scale), 4 * scale.questions().len() as u32);
        }
        assert!(diag.is_clean());
        check_tmd_invariant(&row);
    }

    #[test]
    fn moderate_row_matches_instrument_totals() {
        // All 40 answers at 适中 (score 2). The totals follow directly from
        // the question counts of each subscale.
        let mut diag = ScoreDiagnostics::default();
        let row = score_row(
            &uniform_row("A", "适中"),
            &ScoringRules::DEFAULT_RULES,
            &mut diag,
        );
        assert_eq!(row.subscale(Scale::Tension), 12);
        assert_eq!(row.subscale(Scale::Anger), 14);
        assert_eq!(row.subscale(Scale::Fatigue), 10);
        assert_eq!(row.subscale(Scale::Depression), 12);
        assert_eq!(row.subscale(Scale::Vigor), 12);
        assert_eq!(row.subscale(Scale::Confusion), 10);
        assert_eq!(row.subscale(Scale::SelfEsteem), 10);
        // (12 + 14 + 10 + 12 + 10) - (12 + 10) + 100
        assert_eq!(row.tmd, 136);
        check_tmd_invariant(&row);
    }

    #[test]
    fn tmd_invariant_holds_on_mixed_answers() {
        let cells = (1u8..=40)
            .map(|q| {
                let label = LABELS[(q as usize * 7) % LABELS.len()];
                (format!("{}.题目", q), label.to_string())
            })
            .collect();
        let raw = RawRow {
            name: "B".to_string(),
            cells,
        };
        let mut diag = ScoreDiagnostics::default();
        let row = score_row(&raw, &ScoringRules::DEFAULT_RULES, &mut diag);
        assert!(diag.is_clean());
        check_tmd_invariant(&row);
    }

    #[test]
    fn missing_columns_contribute_zero() {
        let raw = RawRow {
            name: "C".to_string(),
            cells: vec![("1.感到紧张".to_string(), "相当多".to_string())],
        };
        let mut diag = ScoreDiagnostics::default();
        let row = score_row(&raw, &ScoringRules::DEFAULT_RULES, &mut diag);
        assert_eq!(row.subscale(Scale::Tension), 3);
        for &scale in &[
            Scale::Anger,
            Scale::Fatigue,
            Scale::Depression,
            Scale::Vigor,
            Scale::Confusion,
            Scale::SelfEsteem,
        ] {
            assert_eq!(row.subscale(scale), 0);
        }
        // 39 of the 40 question slots found no column.
        assert_eq!(diag.missing_columns, 39);
        assert_eq!(diag.unknown_labels, 0);
        check_tmd_invariant(&row);
    }

    #[test]
    fn unknown_labels_are_counted() {
        let mut diag = ScoreDiagnostics::default();
        let row = score_row(
            &uniform_row("D", "N/A"),
            &ScoringRules::DEFAULT_RULES,
            &mut diag,
        );
        assert_eq!(row.tmd, 100);
        // One slot per question across the seven lists: 6+7+5+6+6+5+5.
        assert_eq!(diag.unknown_labels, 40);
        assert_eq!(diag.missing_columns, 0);
    }

    #[test]
    fn prefix_mode_keeps_the_historical_misbinding() {
        // A "10." column listed before the "1." column captures question 1
        // under bare prefix matching.
        let raw = RawRow {
            name: "E".to_string(),
            cells: vec![
                ("10.感到疲乏".to_string(), "适中".to_string()),
                ("1.感到紧张".to_string(), "非常地".to_string()),
            ],
        };
        let legacy = ScoringRules {
            column_match: ColumnMatchMode::Prefix,
            ..ScoringRules::DEFAULT_RULES
        };
        let mut diag = ScoreDiagnostics::default();
        let row = score_row(&raw, &legacy, &mut diag);
        // Question 1 (Tension) bound to the "10." column.
        assert_eq!(row.subscale(Scale::Tension), 2);
        // Question 10 (Fatigue) also binds to the "10." column.
        assert_eq!(row.subscale(Scale::Fatigue), 2);
    }

    #[test]
    fn leading_number_mode_binds_whole_numbers() {
        let raw = RawRow {
            name: "E".to_string(),
            cells: vec![
                ("10.感到疲乏".to_string(), "适中".to_string()),
                ("1.感到紧张".to_string(), "非常地".to_string()),
            ],
        };
        let mut diag = ScoreDiagnostics::default();
        let row = score_row(&raw, &ScoringRules::DEFAULT_RULES, &mut diag);
        assert_eq!(row.subscale(Scale::Tension), 4);
        assert_eq!(row.subscale(Scale::Fatigue), 2);
    }

    fn scored(names: &[&str]) -> Vec<ResultRow> {
        names
            .iter()
            .map(|n| {
                let mut diag = ScoreDiagnostics::default();
                score_row(
                    &uniform_row(n, "适中"),
                    &ScoringRules::DEFAULT_RULES,
                    &mut diag,
                )
            })
            .collect()
    }

    #[test]
    fn reorder_follows_a_full_permutation_exactly() {
        let rows = scored(&["a", "b", "c", "d"]);
        let order: Vec<String> = ["c", "a", "d", "b"].iter().map(|s| s.to_string()).collect();
        let res = apply_name_order(rows, &order, UnlistedOrderPolicy::AppendLast);
        let names: Vec<&str> = res.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["c", "a", "d", "b"]);
    }

    #[test]
    fn reorder_appends_unlisted_rows_last() {
        let rows = scored(&["a", "b", "c", "d"]);
        let order: Vec<String> = ["d", "b"].iter().map(|s| s.to_string()).collect();
        let res = apply_name_order(rows, &order, UnlistedOrderPolicy::AppendLast);
        let names: Vec<&str> = res.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["d", "b", "a", "c"]);
    }

    #[test]
    fn reorder_can_drop_unlisted_rows() {
        let rows = scored(&["a", "b", "c"]);
        let order: Vec<String> = vec!["b".to_string()];
        let res = apply_name_order(rows, &order, UnlistedOrderPolicy::Drop);
        let names: Vec<&str> = res.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["b"]);
    }

    #[test]
    fn reorder_keeps_duplicate_names_in_relative_order() {
        let mut rows = scored(&["a", "b", "a"]);
        rows[0].subscales[0] = 1;
        rows[2].subscales[0] = 2;
        let order: Vec<String> = ["a", "b"].iter().map(|s| s.to_string()).collect();
        let res = apply_name_order(rows, &order, UnlistedOrderPolicy::AppendLast);
        let names: Vec<&str> = res.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a", "a", "b"]);
        assert_eq!(res[0].subscales[0], 1);
        assert_eq!(res[1].subscales[0], 2);
    }

    #[test]
    fn aggregate_of_identical_rows_has_zero_sd() {
        let rows = scored(&["a", "b"]);
        let summary = aggregate(&rows);
        assert_eq!(summary.len(), ALL_COLUMNS.len());
        for entry in summary {
            assert_eq!(entry.mean, rows[0].column_score(entry.column) as f64);
            assert_eq!(entry.sd, Some(0.0));
        }
    }

    #[test]
    fn aggregate_of_a_single_row_has_no_sd() {
        let rows = scored(&["a"]);
        let summary = aggregate(&rows);
        for entry in summary {
            assert_eq!(entry.sd, None);
        }
    }

    #[test]
    fn aggregate_of_an_empty_table_is_empty() {
        assert!(aggregate(&[]).is_empty());
    }

    #[test]
    fn aggregate_computes_sample_sd() {
        let mut rows = scored(&["a", "b"]);
        rows[0].tmd = 100;
        rows[1].tmd = 104;
        let summary = aggregate(&rows);
        let tmd = summary
            .iter()
            .find(|e| e.column == ScoreColumn::Tmd)
            .unwrap();
        assert_eq!(tmd.mean, 102.0);
        // Sample (N-1) semantics: sqrt(((2)^2 + (2)^2) / 1).
        assert!((tmd.sd.unwrap() - 8.0f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn melt_produces_one_triple_per_row_and_column() {
        let rows = scored(&["a", "b"]);
        let columns = [ScoreColumn::Subscale(Scale::Tension), ScoreColumn::Tmd];
        let points = melt(&rows, &columns);
        assert_eq!(points.len(), 4);
        assert_eq!(points[0].name, "a");
        assert_eq!(points[0].column, ScoreColumn::Subscale(Scale::Tension));
        assert_eq!(points[0].score, 12);
        assert_eq!(points[3].column, ScoreColumn::Tmd);
        assert_eq!(points[3].score, 136);
    }

    #[test]
    fn mean_series_preserves_selection_order() {
        let rows = scored(&["a", "b"]);
        let columns = [ScoreColumn::Tmd, ScoreColumn::Subscale(Scale::Anger)];
        let means = mean_series(&melt(&rows, &columns));
        assert_eq!(means.len(), 2);
        assert_eq!(means[0].0, ScoreColumn::Tmd);
        assert_eq!(means[0].1, 136.0);
        assert_eq!(means[1].0, ScoreColumn::Subscale(Scale::Anger));
        assert_eq!(means[1].1, 14.0);
    }
}
