//! CSV ingest and normalization.
//!
//! Two inputs are read here:
//!
//! - the raw video table written by `fetch` (`read_video_csv`)
//! - the processed table written by `process` (`load_samples`), turned into a
//!   clean list of `(duration_minutes, views_per_month)` samples
//!
//! Rows with missing values are dropped (counted, not reported). Rows with
//! values that are present but unusable are skipped and reported with their
//! line number. No fitting logic lives here.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use csv::StringRecord;
use tracing::{debug, warn};

use crate::data::duration::parse_duration_minutes;
use crate::domain::{DatasetStats, Sample, VideoRecord};
use crate::error::AppError;

/// Accepted names for the view-rate column, in priority order.
pub const VIEW_RATE_COLUMNS: [&str; 2] = ["views_per_month", "views_por_mes"];

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub id: Option<String>,
    pub message: String,
}

/// Ingest output: samples + stats + bookkeeping.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub samples: Vec<Sample>,
    pub stats: DatasetStats,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    /// Rows skipped because a value was missing (empty or non-numeric).
    pub rows_dropped: usize,
    /// Column the durations came from.
    pub x_column: String,
    /// Column the view rates came from.
    pub y_column: String,
}

impl IngestedData {
    pub fn rows_used(&self) -> usize {
        self.samples.len()
    }
}

enum DurationSource {
    Minutes(usize),
    Readable(usize),
}

/// Load a processed CSV into fit samples.
pub fn load_samples(path: &Path) -> Result<IngestedData, AppError> {
    let (mut reader, header_map) = open_csv(path)?;

    let (y_column, y_idx) = VIEW_RATE_COLUMNS
        .iter()
        .find_map(|name| header_map.get(*name).map(|&idx| (name.to_string(), idx)))
        .ok_or_else(|| {
            AppError::new(
                2,
                format!("CSV missing '{}' column", VIEW_RATE_COLUMNS[0]),
            )
        })?;

    let (x_column, x_source) = if let Some(&idx) = header_map.get("duration_minutes") {
        ("duration_minutes".to_string(), DurationSource::Minutes(idx))
    } else if let Some(&idx) = header_map.get("duration_readable") {
        ("duration_readable".to_string(), DurationSource::Readable(idx))
    } else {
        return Err(AppError::new(
            2,
            "CSV missing a duration column (`duration_minutes` or `duration_readable`).",
        ));
    };
    let id_idx = header_map.get("video_id").copied();

    let mut samples = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;
    let mut rows_dropped = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: 1-based lines, plus the header line.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    id: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };
        let id = id_idx.and_then(|i| record.get(i)).map(str::to_string);

        let x = match x_source {
            DurationSource::Minutes(i) => parse_number(record.get(i)),
            DurationSource::Readable(i) => record.get(i).and_then(parse_duration_minutes),
        };
        let y = parse_number(record.get(y_idx));

        let (Some(x), Some(y)) = (x, y) else {
            rows_dropped += 1;
            continue;
        };

        if !(x.is_finite() && x > 0.0) {
            row_errors.push(RowError {
                line,
                id,
                message: format!("Duration must be positive, got {x}."),
            });
            continue;
        }
        if !(y.is_finite() && y >= 0.0) {
            row_errors.push(RowError {
                line,
                id,
                message: format!("View rate must be non-negative, got {y}."),
            });
            continue;
        }

        samples.push(Sample::new(x, y));
    }

    let stats = DatasetStats::from_samples(&samples).ok_or_else(|| {
        AppError::new(3, "No valid data left after preprocessing. Check your CSV!")
    })?;

    debug!(
        rows_read,
        rows_used = samples.len(),
        rows_dropped,
        row_errors = row_errors.len(),
        "loaded fit samples"
    );

    Ok(IngestedData {
        samples,
        stats,
        row_errors,
        rows_read,
        rows_dropped,
        x_column,
        y_column,
    })
}

/// Read the raw video table written by `fetch`.
///
/// Unreadable rows are skipped and returned alongside the records.
pub fn read_video_csv(path: &Path) -> Result<(Vec<VideoRecord>, Vec<RowError>), AppError> {
    let (mut reader, header_map) = open_csv(path)?;

    for required in ["video_id", "published_at", "views", "duration_readable"] {
        if !header_map.contains_key(required) {
            return Err(AppError::new(2, format!("Missing required column: `{required}`")));
        }
    }

    let mut videos = Vec::new();
    let mut row_errors = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    id: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_video_row(&record, &header_map) {
            Ok(video) => videos.push(video),
            Err(message) => {
                let id = get_optional(&record, &header_map, "video_id").map(str::to_string);
                warn!(line, "skipping video row: {message}");
                row_errors.push(RowError { line, id, message });
            }
        }
    }

    Ok((videos, row_errors))
}

fn open_csv(path: &Path) -> Result<(csv::Reader<File>, HashMap<String, usize>), AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();

    Ok((reader, build_header_map(&headers)))
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase().replace([' ', '-'], "_")
}

fn parse_video_row(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<VideoRecord, String> {
    let video_id = get_optional(record, header_map, "video_id")
        .ok_or("Missing `video_id` value.")?
        .to_string();
    let title = get_optional(record, header_map, "title").unwrap_or("").to_string();

    let raw_date = get_optional(record, header_map, "published_at").ok_or("Missing `published_at` value.")?;
    let published_at = parse_timestamp(raw_date).ok_or_else(|| format!("Invalid `published_at` '{raw_date}'."))?;

    let views = parse_number(get_optional(record, header_map, "views"))
        .filter(|v| *v >= 0.0)
        .ok_or("Missing/invalid `views` value.")? as u64;

    let duration_readable = get_optional(record, header_map, "duration_readable")
        .unwrap_or("")
        .to_string();

    Ok(VideoRecord {
        video_id,
        title,
        published_at,
        views,
        duration_readable,
    })
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, key: &str) -> Option<&'a str> {
    header_map
        .get(key)
        .and_then(|&idx| record.get(idx))
        .filter(|s| !s.is_empty())
}

/// Parse a number, tolerating thousands separators (`"12,345"`).
fn parse_number(raw: Option<&str>) -> Option<f64> {
    let cleaned = raw?.trim().replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// RFC 3339, `YYYY-MM-DD HH:MM:SS` (UTC), or a bare date (midnight UTC).
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(ts.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ts| ts.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_processed_samples_and_drops_missing() {
        let file = write_csv(
            "video_id,duration_minutes,views_per_month\n\
             a,10.5,1200\n\
             b,,800\n\
             c,3,\"1,500\"\n\
             d,4,n/a\n",
        );
        let data = load_samples(file.path()).unwrap();
        assert_eq!(data.rows_read, 4);
        assert_eq!(data.rows_used(), 2);
        assert_eq!(data.rows_dropped, 2);
        assert_eq!(data.samples[0], Sample::new(10.5, 1200.0));
        assert_eq!(data.samples[1], Sample::new(3.0, 1500.0));
        assert_eq!(data.y_column, "views_per_month");
    }

    #[test]
    fn falls_back_to_readable_duration_and_legacy_column() {
        let file = write_csv("\u{feff}Duration_Readable,Views_Por_Mes\n00:04:30,90\nlive,10\n");
        let data = load_samples(file.path()).unwrap();
        assert_eq!(data.x_column, "duration_readable");
        assert_eq!(data.y_column, "views_por_mes");
        assert_eq!(data.samples, vec![Sample::new(4.5, 90.0)]);
        assert_eq!(data.rows_dropped, 1);
    }

    #[test]
    fn reports_out_of_contract_rows() {
        let file = write_csv("video_id,duration_minutes,views_per_month\na,0,10\nb,5,-3\nc,5,3\n");
        let data = load_samples(file.path()).unwrap();
        assert_eq!(data.rows_used(), 1);
        assert_eq!(data.row_errors.len(), 2);
        assert_eq!(data.row_errors[0].line, 2);
        assert_eq!(data.row_errors[0].id.as_deref(), Some("a"));
        assert_eq!(data.row_errors[1].line, 3);
    }

    #[test]
    fn missing_view_column_is_a_usage_error() {
        let file = write_csv("duration_minutes,views\n1,2\n");
        let err = load_samples(file.path()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains("views_per_month"));
    }

    #[test]
    fn nothing_usable_is_a_data_error() {
        let file = write_csv("duration_minutes,views_per_month\n,\n");
        assert_eq!(load_samples(file.path()).unwrap_err().exit_code(), 3);
    }

    #[test]
    fn reads_raw_video_table() {
        let file = write_csv(
            "Video ID,Title,Published At,Views,duration_readable\n\
             v1,First,2024-10-05T12:00:00Z,\"12,000\",00:12:30\n\
             v2,Second,2024-11-01 08:30:00,50,01:00:00\n\
             v3,Third,2025-01-02,7,00:00:59\n\
             v4,Broken,yesterday,7,00:00:59\n",
        );
        let (videos, errors) = read_video_csv(file.path()).unwrap();
        assert_eq!(videos.len(), 3);
        assert_eq!(videos[0].views, 12_000);
        assert_eq!(videos[1].published_at.to_rfc3339(), "2024-11-01T08:30:00+00:00");
        assert_eq!(videos[2].published_at.date_naive(), NaiveDate::from_ymd_opt(2025, 1, 2).unwrap());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line, 5);
        assert_eq!(errors[0].id.as_deref(), Some("v4"));
    }

    #[test]
    fn missing_file_is_a_usage_error() {
        let err = load_samples(Path::new("definitely/not/here.csv")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
