//! Views-per-month derivation.
//!
//! A video's monthly view rate is its total views divided by the number of
//! calendar months since release, counting the release month as zero and
//! flooring the result at one month.

use chrono::{Datelike, NaiveDate};

use crate::data::duration::parse_duration_minutes;
use crate::domain::{ProcessedVideo, VideoRecord};

/// Calendar months between `published` and `today` (day of month ignored), at least 1.
pub fn months_since_release(published: NaiveDate, today: NaiveDate) -> i64 {
    let months = (today.year() as i64 - published.year() as i64) * 12
        + (today.month() as i64 - published.month() as i64);
    months.max(1)
}

/// `views / months`, rounded half-to-even.
pub fn views_per_month(views: u64, months: i64) -> i64 {
    let months = months.max(1);
    (views as f64 / months as f64).round_ties_even() as i64
}

/// Derive duration minutes and view rate for one video.
pub fn process_video(video: VideoRecord, today: NaiveDate) -> ProcessedVideo {
    let duration_minutes = parse_duration_minutes(&video.duration_readable);
    let months = months_since_release(video.published_at.date_naive(), today);
    let rate = views_per_month(video.views, months);
    ProcessedVideo {
        video,
        duration_minutes,
        months_since_release: months,
        views_per_month: rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn counts_calendar_months() {
        assert_eq!(months_since_release(date(2024, 1, 31), date(2025, 3, 1)), 14);
        assert_eq!(months_since_release(date(2025, 2, 1), date(2025, 3, 31)), 1);
    }

    #[test]
    fn same_month_counts_as_one() {
        assert_eq!(months_since_release(date(2025, 3, 1), date(2025, 3, 31)), 1);
    }

    #[test]
    fn future_release_is_floored() {
        assert_eq!(months_since_release(date(2026, 1, 1), date(2025, 3, 1)), 1);
    }

    #[test]
    fn view_rate_rounds_half_to_even() {
        assert_eq!(views_per_month(1_000, 4), 250);
        assert_eq!(views_per_month(5, 2), 2);
        assert_eq!(views_per_month(7, 2), 4);
        assert_eq!(views_per_month(10, 3), 3);
        assert_eq!(views_per_month(10, 0), 10);
    }

    #[test]
    fn process_video_fills_derived_fields() {
        let video = VideoRecord {
            video_id: "abc".to_string(),
            title: "Intro".to_string(),
            published_at: Utc.with_ymd_and_hms(2024, 10, 5, 12, 0, 0).unwrap(),
            views: 12_000,
            duration_readable: "00:12:30".to_string(),
        };
        let processed = process_video(video, date(2025, 10, 16));
        assert_eq!(processed.months_since_release, 12);
        assert_eq!(processed.views_per_month, 1_000);
        assert_eq!(processed.duration_minutes, Some(12.5));
    }

    #[test]
    fn unparseable_duration_is_left_missing() {
        let video = VideoRecord {
            video_id: "x".to_string(),
            title: "Live".to_string(),
            published_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            views: 10,
            duration_readable: "live".to_string(),
        };
        let processed = process_video(video, date(2025, 2, 1));
        assert_eq!(processed.duration_minutes, None);
    }
}
