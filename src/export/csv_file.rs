//! CSV export of summary records

use super::types::{ExportError, CSV_HEADER, EXPORT_FILE_PREFIX};
use crate::stats::{digit_label, SummaryRecord};
use std::fs;
use std::path::{Path, PathBuf};

/// Wall-clock format of the `Time` column
const TIME_FORMAT: &str = "%H:%M:%S";

/// Render records as CSV text: one header row, then one row per record
pub fn format_csv(records: &[SummaryRecord]) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    for record in records {
        writer.write_record([
            record.timestamp.format(TIME_FORMAT).to_string(),
            record.session_id.clone(),
            record.resolution.to_string(),
            record.network_label.clone(),
            record.frames_per_interval.to_string(),
            record.avg_latency_ms.to_string(),
            digit_label(record.dominant_left_digit),
            digit_label(record.dominant_right_digit),
        ])?;
    }

    let bytes = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// File name for a session's export; the id is percent-encoded
pub fn export_file_name(session_id: &str) -> String {
    format!("{}{}.csv", EXPORT_FILE_PREFIX, urlencoding::encode(session_id))
}

/// Write the export file into `output_dir`.
///
/// Returns `Ok(None)` without touching the filesystem when there are no
/// records.
pub fn write_csv(
    records: &[SummaryRecord],
    output_dir: &Path,
    session_id: &str,
) -> Result<Option<PathBuf>, ExportError> {
    if records.is_empty() {
        tracing::warn!("Nothing to export: no summary records accumulated");
        return Ok(None);
    }

    if !output_dir.is_dir() {
        return Err(ExportError::OutputDirNotFound(
            output_dir.to_string_lossy().to_string(),
        ));
    }

    let path = output_dir.join(export_file_name(session_id));
    fs::write(&path, format_csv(records)?)?;

    tracing::info!("Exported {} records to {:?}", records.len(), path);
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::Resolution;
    use crate::stats::IntervalStats;
    use chrono::{Local, TimeZone};
    use tempfile::tempdir;

    fn record(session: &str, frames: u32, left: Option<u8>) -> SummaryRecord {
        SummaryRecord::from_interval(
            Local.with_ymd_and_hms(2026, 3, 1, 14, 5, 9).unwrap(),
            session,
            Resolution::preset(320, 240).unwrap(),
            "4G",
            IntervalStats {
                frames,
                avg_latency_ms: 120,
                dominant_left: left,
                dominant_right: None,
            },
        )
    }

    #[test]
    fn test_two_records_make_three_lines() {
        let text = format_csv(&[record("a", 12, Some(5)), record("a", 9, None)]).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Time,Session,Resolution,NetworkLabel,FPS,Latency(ms),Left,Right");
        assert_eq!(lines[1], "14:05:09,a,320x240,4G,12,120,5,-");
        assert_eq!(lines[2], "14:05:09,a,320x240,4G,9,120,-,-");
    }

    #[test]
    fn test_free_text_with_comma_is_quoted() {
        let text = format_csv(&[record("lab, run 2", 1, None)]).unwrap();
        let row = text.lines().nth(1).unwrap();
        assert!(row.contains("\"lab, run 2\""));
    }

    #[test]
    fn test_file_name_is_filesystem_safe() {
        assert_eq!(export_file_name("s1"), "final_data_s1.csv");
        assert_eq!(export_file_name("a/b c"), "final_data_a%2Fb%20c.csv");
    }

    #[test]
    fn test_write_csv() {
        let dir = tempdir().unwrap();
        let path = write_csv(&[record("s1", 3, Some(1))], dir.path(), "s1")
            .unwrap()
            .unwrap();

        assert_eq!(path, dir.path().join("final_data_s1.csv"));
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn test_empty_export_is_a_noop() {
        let dir = tempdir().unwrap();
        assert!(write_csv(&[], dir.path(), "s1").unwrap().is_none());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_missing_output_dir() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            write_csv(&[record("s1", 1, None)], &missing, "s1"),
            Err(ExportError::OutputDirNotFound(_))
        ));
    }
}
