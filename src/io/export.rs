//! CSV writers.
//!
//! - raw video table (`fetch`)
//! - processed video table with derived columns (`process`)
//! - per-sample fit results (`fit --export`)
//! - bare samples (`simulate`)
//!
//! Every file is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::{File, create_dir_all};
use std::path::Path;

use crate::domain::{FitResult, ProcessedVideo, Sample, VideoRecord};
use crate::error::AppError;
use crate::models::evaluate;

pub const VIDEO_HEADER: [&str; 5] = ["video_id", "title", "published_at", "views", "duration_readable"];

/// Write the raw video table.
pub fn write_video_csv(path: &Path, videos: &[VideoRecord]) -> Result<(), AppError> {
    let mut writer = create_writer(path)?;
    write_row(&mut writer, VIDEO_HEADER)?;
    for v in videos {
        write_row(&mut writer, video_fields(v))?;
    }
    flush(writer)
}

/// Write the processed table: raw columns plus derived ones.
///
/// A missing `duration_minutes` is written as an empty cell so the fit step
/// drops the row.
pub fn write_processed_csv(path: &Path, rows: &[ProcessedVideo]) -> Result<(), AppError> {
    let mut writer = create_writer(path)?;

    let mut header: Vec<&str> = VIDEO_HEADER.to_vec();
    header.extend(["duration_minutes", "months_since_release", "views_per_month"]);
    write_row(&mut writer, header)?;

    for row in rows {
        let mut fields = video_fields(&row.video).to_vec();
        fields.push(
            row.duration_minutes
                .map(|m| format!("{m:.6}"))
                .unwrap_or_default(),
        );
        fields.push(row.months_since_release.to_string());
        fields.push(row.views_per_month.to_string());
        write_row(&mut writer, fields)?;
    }
    flush(writer)
}

/// Write observed vs fitted values for each sample.
pub fn write_results_csv(path: &Path, samples: &[Sample], fit: &FitResult) -> Result<(), AppError> {
    let mut writer = create_writer(path)?;
    write_row(&mut writer, ["x", "y_obs", "y_fit", "residual"])?;
    for s in samples {
        let y_fit = evaluate(s.x, &fit.params);
        write_row(
            &mut writer,
            [
                format!("{:.6}", s.x),
                format!("{:.4}", s.y),
                format!("{y_fit:.4}"),
                format!("{:.4}", s.y - y_fit),
            ],
        )?;
    }
    flush(writer)
}

/// Write samples with the processed-table column names so `fit` can read them back.
pub fn write_samples_csv(path: &Path, samples: &[Sample]) -> Result<(), AppError> {
    let mut writer = create_writer(path)?;
    write_row(&mut writer, ["duration_minutes", "views_per_month"])?;
    for s in samples {
        write_row(&mut writer, [format!("{:.6}", s.x), format!("{:.6}", s.y)])?;
    }
    flush(writer)
}

fn video_fields(v: &VideoRecord) -> [String; 5] {
    [
        v.video_id.clone(),
        v.title.clone(),
        v.published_at.to_rfc3339(),
        v.views.to_string(),
        v.duration_readable.clone(),
    ]
}

fn create_writer(path: &Path) -> Result<csv::Writer<File>, AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir_all(parent).map_err(|e| {
            AppError::new(2, format!("Failed to create directory '{}': {e}", parent.display()))
        })?;
    }
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create CSV '{}': {e}", path.display())))?;
    Ok(csv::Writer::from_writer(file))
}

fn write_row<I, T>(writer: &mut csv::Writer<File>, fields: I) -> Result<(), AppError>
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    writer
        .write_record(fields)
        .map_err(|e| AppError::new(2, format!("Failed to write CSV row: {e}")))
}

fn flush(mut writer: csv::Writer<File>) -> Result<(), AppError> {
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush CSV: {e}")))
}
