// Summary aggregation.
//
// Pure computations over the cleaned table: per-column scalar statistics
// and top-N category rankings. Nothing here touches the filesystem or the
// run log.
use std::collections::HashMap;

use crate::config::Config;
use crate::types::{CellValue, CleanTable, ColumnStats, Ranking, RankingEntry, Summary};
use crate::util::average;

/// Dimensions ranked in the report, when the columns exist in the input.
const RANKING_DIMENSIONS: &[&str] = &["Product", "Region"];

/// Preferred measure for the rankings.
const DEFAULT_MEASURE: &str = "Revenue";

/// Rankings keep at most this many entries.
pub const TOP_N: usize = 5;

pub fn summarize(table: &CleanTable, config: &Config) -> Summary {
    let column_stats = config
        .numeric_columns
        .iter()
        .filter_map(|name| column_stats(table, name))
        .collect();

    let rankings = match ranking_measure(table, config) {
        Some(measure) => RANKING_DIMENSIONS
            .iter()
            .filter_map(|dimension| rank_by(table, dimension, measure))
            .collect(),
        None => Vec::new(),
    };

    Summary {
        total_records: table.len(),
        column_stats,
        rankings,
    }
}

/// Revenue when configured and present, otherwise the first numeric column
/// that made it into the cleaned table.
fn ranking_measure<'a>(table: &CleanTable, config: &'a Config) -> Option<&'a str> {
    let present: Vec<&'a str> = config
        .numeric_columns
        .iter()
        .map(String::as_str)
        .filter(|name| table.column_index(name).is_some())
        .collect();
    present
        .iter()
        .copied()
        .find(|name| *name == DEFAULT_MEASURE)
        .or_else(|| present.first().copied())
}

fn column_stats(table: &CleanTable, column: &str) -> Option<ColumnStats> {
    let values = table.column_numbers(column);
    if values.is_empty() {
        return None;
    }
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    for v in &values {
        min = min.min(*v);
        max = max.max(*v);
        sum += v;
    }
    Some(ColumnStats {
        column: column.to_string(),
        sum,
        mean: average(&values),
        min,
        max,
    })
}

/// Total the measure per category and keep the top entries, descending.
/// Categories appear in first-seen order before sorting, and the sort is
/// stable, so ties rank in the order the data introduced them. Rows with a
/// missing category label are left out.
fn rank_by(table: &CleanTable, dimension: &str, measure: &str) -> Option<Ranking> {
    let dim_idx = table.column_index(dimension)?;
    let measure_idx = table.column_index(measure)?;

    let mut totals: HashMap<String, f64> = HashMap::new();
    let mut order: Vec<String> = Vec::new();
    for row in &table.rows {
        let label = match &row[dim_idx] {
            CellValue::Missing => continue,
            cell => cell.display(),
        };
        let Some(value) = row[measure_idx].as_number() else {
            continue;
        };
        if !totals.contains_key(&label) {
            order.push(label.clone());
        }
        *totals.entry(label).or_insert(0.0) += value;
    }

    let mut entries: Vec<RankingEntry> = order
        .into_iter()
        .map(|label| {
            let value = totals[&label];
            RankingEntry { label, value }
        })
        .collect();
    entries.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(std::cmp::Ordering::Equal));
    entries.truncate(TOP_N);

    Some(Ranking {
        dimension: dimension.to_string(),
        measure: measure.to_string(),
        entries,
    })
}
