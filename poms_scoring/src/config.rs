// ********* Input data structures ***********

/// The header name of the respondent identifier column, in the primary
/// workbook, the order workbook and the exported table.
pub const NAME_COLUMN: &str = "姓名";

/// One respondent's row of raw answers, as parsed by the readers.
///
/// The cells keep the worksheet column order: question lookup scans them left
/// to right and the first matching column wins.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RawRow {
    pub name: String,
    pub cells: Vec<(String, String)>,
}

// ********* Output data structures *********

/// The seven POMS subscales, in instrument order.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum Scale {
    Tension,
    Anger,
    Fatigue,
    Depression,
    Vigor,
    Confusion,
    SelfEsteem,
}

pub const ALL_SCALES: [Scale; 7] = [
    Scale::Tension,
    Scale::Anger,
    Scale::Fatigue,
    Scale::Depression,
    Scale::Vigor,
    Scale::Confusion,
    Scale::SelfEsteem,
];

impl Scale {
    /// The instrument question numbers contributing to this subscale.
    ///
    /// These lists are fixed by the instrument and must not be "fixed" in
    /// code: question 37 appears in the Anger list only, and the seven lists
    /// cover 40 distinct questions.
    pub fn questions(&self) -> &'static [u8] {
        match self {
            Scale::Tension => &[1, 8, 15, 21, 28, 35],
            Scale::Anger => &[2, 9, 16, 22, 29, 36, 37],
            Scale::Fatigue => &[3, 10, 17, 23, 30],
            Scale::Depression => &[4, 11, 18, 24, 31, 38],
            Scale::Vigor => &[5, 12, 19, 25, 32, 39],
            Scale::Confusion => &[6, 13, 20, 26, 33],
            Scale::SelfEsteem => &[7, 14, 27, 34, 40],
        }
    }

    /// The scale name as printed by the instrument and in all the outputs.
    pub fn name(&self) -> &'static str {
        match self {
            Scale::Tension => "紧张",
            Scale::Anger => "愤怒",
            Scale::Fatigue => "疲劳",
            Scale::Depression => "抑郁",
            Scale::Vigor => "精力",
            Scale::Confusion => "慌乱",
            Scale::SelfEsteem => "自尊感",
        }
    }

    /// ASCII alias accepted on the command line.
    pub fn alias(&self) -> &'static str {
        match self {
            Scale::Tension => "tension",
            Scale::Anger => "anger",
            Scale::Fatigue => "fatigue",
            Scale::Depression => "depression",
            Scale::Vigor => "vigor",
            Scale::Confusion => "confusion",
            Scale::SelfEsteem => "self-esteem",
        }
    }

    pub(crate) fn index(&self) -> usize {
        *self as usize
    }
}

/// A scored column of the result table: one of the seven subscales, or the
/// composite TMD pseudo-scale.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum ScoreColumn {
    Subscale(Scale),
    Tmd,
}

pub const ALL_COLUMNS: [ScoreColumn; 8] = [
    ScoreColumn::Subscale(Scale::Tension),
    ScoreColumn::Subscale(Scale::Anger),
    ScoreColumn::Subscale(Scale::Fatigue),
    ScoreColumn::Subscale(Scale::Depression),
    ScoreColumn::Subscale(Scale::Vigor),
    ScoreColumn::Subscale(Scale::Confusion),
    ScoreColumn::Subscale(Scale::SelfEsteem),
    ScoreColumn::Tmd,
];

impl ScoreColumn {
    pub fn name(&self) -> &'static str {
        match self {
            ScoreColumn::Subscale(s) => s.name(),
            ScoreColumn::Tmd => "TMD",
        }
    }
}

/// One scored respondent: the seven subscale totals plus the derived TMD.
///
/// The subscale array is indexed in `ALL_SCALES` order. TMD is signed and
/// unclamped: adversarial inputs may push it below zero or far above the
/// typical instrument range.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ResultRow {
    pub name: String,
    pub subscales: [u32; 7],
    pub tmd: i64,
}

impl ResultRow {
    pub fn subscale(&self, scale: Scale) -> u32 {
        self.subscales[scale.index()]
    }

    pub fn column_score(&self, column: ScoreColumn) -> i64 {
        match column {
            ScoreColumn::Subscale(s) => self.subscale(s) as i64,
            ScoreColumn::Tmd => self.tmd,
        }
    }
}

/// The scored table together with the data-quality counters accumulated
/// while scoring it.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ScoredBatch {
    pub rows: Vec<ResultRow>,
    pub diagnostics: ScoreDiagnostics,
}

/// Counters for the cells that were silently scored as 0.
///
/// Scoring never fails: unrecognized labels and missing question columns
/// default to 0 by design. These counters let callers detect data-quality
/// problems without changing the scoring semantics.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct ScoreDiagnostics {
    /// Cells whose trimmed value was not one of the five response labels.
    pub unknown_labels: u64,
    /// Question numbers with no matching column in the row.
    pub missing_columns: u64,
}

impl ScoreDiagnostics {
    pub fn is_clean(&self) -> bool {
        self.unknown_labels == 0 && self.missing_columns == 0
    }
}

/// Per-column mean and sample standard deviation.
///
/// The standard deviation uses the (N-1) sample convention and is `None`
/// with fewer than two rows.
#[derive(PartialEq, Debug, Clone)]
pub struct ColumnSummary {
    pub column: ScoreColumn,
    pub mean: f64,
    pub sd: Option<f64>,
}

/// One (respondent, scale, score) triple, the long-form shape consumed by
/// the chart renderers.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct MeltedPoint {
    pub name: String,
    pub column: ScoreColumn,
    pub score: i64,
}

// ********* Configuration **********

/// How a question number is matched against the column names of a row.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ColumnMatchMode {
    /// The trimmed column name starts with the decimal question number and
    /// the next character is not another digit. This fixes the historical
    /// ambiguity between question 1 and questions 10-19 (and 2/20-29, ...).
    LeadingNumber,
    /// Bare string-prefix match, first matching column wins. Replicates the
    /// historical binding, ambiguities included.
    Prefix,
}

/// What to do with scored rows whose identifier does not appear in the
/// supplied name-order list.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum UnlistedOrderPolicy {
    /// Keep them, after all the listed rows, in their original relative
    /// order. The default, to avoid silent data loss.
    AppendLast,
    /// Remove them from the result table.
    Drop,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ScoringRules {
    pub column_match: ColumnMatchMode,
    pub unlisted_order: UnlistedOrderPolicy,
}

impl ScoringRules {
    pub const DEFAULT_RULES: ScoringRules = ScoringRules {
        column_match: ColumnMatchMode::LeadingNumber,
        unlisted_order: UnlistedOrderPolicy::AppendLast,
    };
}

/// The chart types understood by the presentation layer.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ChartKind {
    /// One point per selected scale at its mean score, closed polygon.
    RadarMean,
    /// One bar per selected scale at its mean score.
    BarMean,
    /// One box-and-whisker distribution per selected scale, individual
    /// points overlaid.
    BoxIndividual,
    /// One point per (respondent, scale) pair.
    ScatterIndividual,
}
