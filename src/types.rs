use chrono::NaiveDate;
use tabled::Tabled;

/// A single spreadsheet cell after cleaning. Raw input cells are plain
/// strings; cleaning converts them into one of these tagged values so the
/// later stages never have to re-guess what a cell holds.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Missing,
}

impl CellValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            CellValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Plain-text rendering for console previews and group labels.
    pub fn display(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => format!("{}", n),
            CellValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            CellValue::Missing => String::new(),
        }
    }
}

/// Unvalidated tabular data exactly as decoded from the input file: a header
/// row plus string cells. Rows may be shorter than the header when the CSV
/// is ragged; the cleaner pads them out.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Validated, type-converted tabular data. The configured date column holds
/// `Date` values, configured numeric columns hold `Number`, and no required
/// column is `Missing`. Rows keep the order they had in the raw table.
#[derive(Debug, Clone)]
pub struct CleanTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl CleanTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All numbers in the named column, in row order.
    pub fn column_numbers(&self, name: &str) -> Vec<f64> {
        match self.column_index(name) {
            Some(idx) => self
                .rows
                .iter()
                .filter_map(|row| row.get(idx).and_then(CellValue::as_number))
                .collect(),
            None => Vec::new(),
        }
    }
}

/// How many rows each cleaning stage removed, plus whether the recency
/// filter had to be skipped to avoid an empty report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanReport {
    pub input_rows: usize,
    pub date_dropped: usize,
    pub numeric_dropped: usize,
    pub missing_dropped: usize,
    pub window_dropped: usize,
    pub window_skipped: bool,
    pub output_rows: usize,
}

impl CleanReport {
    pub fn total_dropped(&self) -> usize {
        self.date_dropped + self.numeric_dropped + self.missing_dropped + self.window_dropped
    }
}

/// Sum/mean/extrema for one numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats {
    pub column: String,
    pub sum: f64,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankingEntry {
    pub label: String,
    pub value: f64,
}

/// An ordered top-N list of category totals, e.g. products by revenue.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    pub dimension: String,
    pub measure: String,
    pub entries: Vec<RankingEntry>,
}

impl Ranking {
    pub fn title(&self) -> String {
        format!("Top {}s by {}", self.dimension, self.measure)
    }
}

/// One labelled scalar for the Summary sheet and the console preview.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricEntry {
    pub label: String,
    pub value: f64,
    pub currency: bool,
}

/// Everything the aggregator computes over the cleaned table. Recomputed
/// fresh each run, never persisted.
#[derive(Debug, Clone)]
pub struct Summary {
    pub total_records: usize,
    pub column_stats: Vec<ColumnStats>,
    pub rankings: Vec<Ranking>,
}

impl Summary {
    /// Scalar metrics in presentation order: Total/Avg/Max/Min per numeric
    /// column, then the record count. Revenue-named columns are flagged so
    /// the renderer can apply a currency format.
    pub fn metric_entries(&self) -> Vec<MetricEntry> {
        let mut entries = Vec::new();
        for stats in &self.column_stats {
            let currency = is_currency_column(&stats.column);
            entries.push(MetricEntry {
                label: format!("Total {}", stats.column),
                value: stats.sum,
                currency,
            });
            entries.push(MetricEntry {
                label: format!("Avg {}", stats.column),
                value: stats.mean,
                currency,
            });
            entries.push(MetricEntry {
                label: format!("Max {}", stats.column),
                value: stats.max,
                currency,
            });
            entries.push(MetricEntry {
                label: format!("Min {}", stats.column),
                value: stats.min,
                currency,
            });
        }
        entries.push(MetricEntry {
            label: "Total Records".to_string(),
            value: self.total_records as f64,
            currency: false,
        });
        entries
    }
}

/// Columns whose values represent money get a currency display format.
pub fn is_currency_column(name: &str) -> bool {
    name.contains("Revenue")
}

// Console preview rows rendered with `tabled`.

#[derive(Debug, Tabled, Clone)]
pub struct MetricPreviewRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

#[derive(Debug, Tabled, Clone)]
pub struct RankingPreviewRow {
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Value")]
    pub value: String,
}
