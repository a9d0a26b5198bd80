//! Growth ranking over the merged trend table
//!
//! For every keyword column the ranker reads the first and last cells,
//! the column maximum, and the column mean, then computes relative
//! growth. Columns whose baseline is missing or not strictly positive
//! are excluded silently; that is a compute guard, not a failure. The
//! final sort is a stable descending sort on the growth percentage, so
//! ties keep their column order.

use statrs::statistics::Statistics;
use std::collections::HashMap;

use crate::models::TrendSummary;
use crate::trends::{TrendSeries, PARTIAL_MARKER_COLUMN};

/// Rank keywords by relative interest growth, descending
///
/// `links` maps each keyword back to the page that produced it; a
/// keyword without a link entry gets an empty link rather than being
/// dropped.
#[must_use]
pub fn rank(series: &TrendSeries, links: &HashMap<String, String>) -> Vec<TrendSummary> {
    let mut summaries = Vec::new();

    for column in series.columns() {
        if column == PARTIAL_MARKER_COLUMN {
            continue;
        }

        let cells = series.column_cells(column);

        // Baseline guard: first cell must be present and strictly positive
        let Some(start_value) = cells.first().copied().flatten() else {
            continue;
        };
        if start_value <= 0.0 {
            continue;
        }

        // A missing final cell reads as zero interest
        let end_value = cells.last().copied().flatten().unwrap_or(0.0);

        let present: Vec<f64> = cells.iter().copied().flatten().collect();
        let max_value = present.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let avg_value = present.iter().mean();

        let percent_increase = (end_value - start_value) / start_value * 100.0;

        summaries.push(TrendSummary {
            keyword: column.clone(),
            link: links.get(column).cloned().unwrap_or_default(),
            start_value,
            end_value,
            max_value,
            avg_value,
            percent_increase,
        });
    }

    // Stable sort: ties retain column order, no secondary key
    summaries.sort_by(|a, b| {
        b.percent_increase
            .partial_cmp(&a.percent_increase)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    summaries
}
