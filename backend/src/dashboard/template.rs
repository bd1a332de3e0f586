//! Downloadable example CSV in the layout the pipeline expects.

use crate::error::{CsvError, CsvResult};
use crate::transform::assembler::ColumnMap;
use crate::transform::trend::TREND_POINTS;

const CURRENT_WEEK: &str = "10 Mar - 16 Mar";
const PREVIOUS_WEEK: &str = "03 Mar - 09 Mar";

struct ExampleRow {
    l1: &'static str,
    l2: &'static str,
    id: &'static str,
    name: &'static str,
    /// Current, previous, then the three monthly averages
    periods: [&'static str; 5],
    trend: [&'static str; TREND_POINTS],
}

const EXAMPLES: [ExampleRow; 2] = [
    ExampleRow {
        l1: "Bookings",
        l2: "Bookings",
        id: "total-bookings",
        name: "Total Bookings",
        periods: ["100955", "99480", "97892", "99639", "95292"],
        trend: [
            "95000", "96000", "97000", "98000", "99000", "100000", "101000", //
            "102000", "101000", "100500", "101500", "100955", "101200", "101500",
        ],
    },
    ExampleRow {
        l1: "Conversion and Market share",
        l2: "Funnel conversion - Overall",
        id: "overall-conversion",
        name: "Overall conversion",
        periods: ["0.71", "0.78", "0.68", "0.69", "0.74"],
        trend: [
            "0.70", "0.72", "0.74", "0.76", "0.78", "0.76", "0.74", //
            "0.72", "0.73", "0.72", "0.71", "0.70", "0.71", "0.72",
        ],
    },
];

/// Header row: identity, name, two weeks, three averages, explicit trend points.
pub fn template_headers(map: &ColumnMap) -> Vec<String> {
    let mut headers = vec![
        map.l1.clone(),
        map.l2.clone(),
        map.id.clone(),
        map.name.clone(),
        CURRENT_WEEK.to_string(),
        PREVIOUS_WEEK.to_string(),
        map.feb_avg.clone(),
        map.jan_avg.clone(),
        map.dec_avg.clone(),
    ];
    headers.extend((0..TREND_POINTS).map(|i| format!("{}{}", map.trend_prefix, i)));
    headers
}

/// Render the example CSV for `map`.
pub fn template_csv(map: &ColumnMap) -> CsvResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(template_headers(map))?;

    for row in &EXAMPLES {
        let identity = [row.l1, row.l2, row.id, row.name];
        writer.write_record(identity.iter().chain(&row.periods).chain(&row.trend))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| CsvError::EncodingError(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| CsvError::EncodingError(e.to_string()))
}
