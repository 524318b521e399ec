//! Plain-text grid tables for query results and load summaries.

use std::fmt::Write as _;
use std::path::Path;

use console::style;
use taxi_query_analytics_models::{
    NeighborhoodLoadSummary, QueryResult, TripLoadSummary, TripRow, TripSummaryRow,
};

pub const TRIP_HEADERS: [&str; 6] = [
    "Pickup (datetime)",
    "Pickup [Lat, Lon]",
    "Dropoff (datetime)",
    "Dropoff [Lat, Lon]",
    "Dist (mi)",
    "Cost (USD)",
];

const SUMMARY_HEADERS: [&str; 5] = [
    "Pickup (datetime)",
    "Dropoff (datetime)",
    "Duration (min)",
    "Dist (mi)",
    "Cost (USD)",
];

/// A grid table with a header row.
#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    #[must_use]
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(ToString::to_string).collect(),
            rows: Vec::new(),
        }
    }

    /// Adds a row. Missing cells render empty; extra cells are dropped.
    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    #[must_use]
    pub fn render(&self) -> String {
        let widths: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .map(|(column, header)| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(column))
                    .map(|cell| cell.chars().count())
                    .chain(std::iter::once(header.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let border = separator(&widths, '+');
        let mut out = String::new();
        out.push_str(&border);
        out.push_str(&line(&widths, &self.headers));
        out.push_str(&separator(&widths, '|'));
        for row in &self.rows {
            out.push_str(&line(&widths, row));
        }
        out.push_str(&border);
        out
    }
}

fn separator(widths: &[usize], edge: char) -> String {
    let inner: Vec<String> = widths.iter().map(|w| "-".repeat(w + 2)).collect();
    format!("{edge}{}{edge}\n", inner.join("+"))
}

fn line(widths: &[usize], cells: &[String]) -> String {
    let mut out = String::from("|");
    for (column, width) in widths.iter().copied().enumerate() {
        let cell = cells.get(column).map_or("", String::as_str);
        let _ = write!(out, " {cell:<width$} |");
    }
    out.push('\n');
    out
}

fn coordinates(pair: [f64; 2]) -> String {
    format!("[{}, {}]", pair[0], pair[1])
}

fn trip_table(rows: &[TripRow]) -> Table {
    let mut table = Table::new(&TRIP_HEADERS);
    for row in rows {
        table.push(vec![
            row.pickup_datetime.clone(),
            coordinates(row.pickup_coordinates),
            row.dropoff_datetime.clone(),
            coordinates(row.dropoff_coordinates),
            row.trip_distance.to_string(),
            row.total_amount.to_string(),
        ]);
    }
    table
}

fn summary_table(rows: &[TripSummaryRow]) -> Table {
    let mut table = Table::new(&SUMMARY_HEADERS);
    for row in rows {
        table.push(vec![
            row.pickup_datetime.clone(),
            row.dropoff_datetime.clone(),
            row.duration_min.to_string(),
            row.trip_distance.to_string(),
            row.total_amount.to_string(),
        ]);
    }
    table
}

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{}", style(title).bold().cyan());
}

/// Renders a query result: timing, match count, and the sample tables.
#[must_use]
pub fn render_query(title: &str, result: &QueryResult) -> String {
    let n = result.sample_size.get();
    let mut out = String::new();

    heading(&mut out, title);
    let mut metrics = Table::new(&["Metric", "Value"]);
    metrics.push(vec![
        "Execution time (ms)".to_string(),
        format!("{:.3}", result.elapsed_ms),
    ]);
    metrics.push(vec!["Matching trips".to_string(), result.total.to_string()]);
    out.push_str(&metrics.render());

    if result.total == 0 {
        out.push_str("No trips matched.\n");
    } else if result.shows_all() {
        heading(&mut out, "Trips");
        out.push_str(&trip_table(&result.first).render());
        let _ = writeln!(
            out,
            "All {} results are shown in the table above because there are fewer than {}.",
            result.total,
            result.sample_size.both_ends()
        );
    } else {
        heading(&mut out, &format!("First {n} trips"));
        out.push_str(&trip_table(&result.first).render());
        heading(&mut out, &format!("Last {n} trips"));
        out.push_str(&trip_table(&result.last).render());
    }

    out
}

/// Renders the summary of a trip load.
#[must_use]
pub fn render_trip_load(source: &Path, summary: &TripLoadSummary) -> String {
    let mut out = String::new();

    heading(&mut out, "Trip load summary");
    let mut metrics = Table::new(&["Metric", "Value"]);
    metrics.push(vec!["File".to_string(), source.display().to_string()]);
    metrics.push(vec!["Trips loaded".to_string(), summary.loaded.to_string()]);
    metrics.push(vec![
        "Load time (ms)".to_string(),
        format!("{:.3}", summary.elapsed_ms),
    ]);
    out.push_str(&metrics.render());

    if let Some(shortest) = &summary.shortest {
        heading(&mut out, "Shortest trip");
        out.push_str(&summary_table(std::slice::from_ref(shortest)).render());
    }
    if let Some(longest) = &summary.longest {
        heading(&mut out, "Longest trip");
        out.push_str(&summary_table(std::slice::from_ref(longest)).render());
    }
    if !summary.first.is_empty() {
        heading(&mut out, "First trips");
        out.push_str(&summary_table(&summary.first).render());
        heading(&mut out, "Last trips");
        out.push_str(&summary_table(&summary.last).render());
    }

    out
}

/// Renders the summary of a neighborhood load.
#[must_use]
pub fn render_neighborhood_load(source: &Path, summary: &NeighborhoodLoadSummary) -> String {
    let mut out = String::new();

    heading(&mut out, "Neighborhood load summary");
    let mut metrics = Table::new(&["Metric", "Value"]);
    metrics.push(vec!["File".to_string(), source.display().to_string()]);
    metrics.push(vec![
        "Neighborhoods loaded".to_string(),
        summary.loaded.to_string(),
    ]);
    metrics.push(vec!["Rows skipped".to_string(), summary.skipped.to_string()]);
    metrics.push(vec![
        "Load time (ms)".to_string(),
        format!("{:.3}", summary.elapsed_ms),
    ]);
    out.push_str(&metrics.render());

    if summary.first.is_empty() {
        out.push_str(
            "No neighborhoods loaded. Check the ';' delimiter and the columns \
             borough;neighborhood;latitude;longitude.\n",
        );
    } else {
        let mut table = Table::new(&["Borough", "Neighborhood", "Latitude", "Longitude"]);
        for record in &summary.first {
            table.push(vec![
                record.borough.clone(),
                record.neighborhood.clone(),
                record.latitude.to_string(),
                record.longitude.to_string(),
            ]);
        }
        heading(&mut out, "First neighborhoods");
        out.push_str(&table.render());
    }

    out
}
