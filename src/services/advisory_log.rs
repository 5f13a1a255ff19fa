//! Append-only CSV log of advisory sessions.
//!
//! Columns: timestamp, farmer, location, soil, stage, current_temp,
//! current_humidity, forecast (JSON array, empty when absent), advisory
//! (JSON array of lines). The header is written once, when the file is new or
//! empty. Rows are read by column position, so files started under an older,
//! shorter header still yield every column of rows appended later. Older
//! rows whose advisory column joins lines with `" | "` are still understood.
//! There is no update or delete path.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::errors::AppError;
use crate::models::{AdvisoryEntry, CropStage, ForecastDay, SoilType, WeatherSnapshot};

const LOG_COLUMNS: [&str; 9] = [
    "timestamp",
    "farmer",
    "location",
    "soil",
    "stage",
    "current_temp",
    "current_humidity",
    "forecast",
    "advisory",
];

/// Separator used by rows written before the advisory column held JSON.
const LEGACY_LINE_SEPARATOR: &str = " | ";

/// The log does not store the weather description.
const UNLOGGED_CONDITION: &str = "unknown";

#[derive(Debug, Serialize, Deserialize)]
struct LogRow {
    timestamp: String,
    farmer: String,
    location: String,
    soil: String,
    stage: String,
    current_temp: Option<f64>,
    current_humidity: Option<u8>,
    #[serde(default)]
    forecast: Option<String>,
    #[serde(default)]
    advisory: Option<String>,
}

impl LogRow {
    fn from_entry(entry: &AdvisoryEntry) -> Result<Self, AppError> {
        let forecast = match &entry.forecast {
            Some(days) => Some(serde_json::to_string(days).map_err(|e| {
                AppError::InternalError(format!("Failed to serialize forecast: {}", e))
            })?),
            None => None,
        };

        let advisory = serde_json::to_string(&entry.advisory_lines).map_err(|e| {
            AppError::InternalError(format!("Failed to serialize advisory lines: {}", e))
        })?;

        Ok(Self {
            timestamp: entry.timestamp.to_rfc3339(),
            farmer: entry.farmer_name.clone(),
            location: entry.location.clone(),
            soil: entry.soil_type.to_string(),
            stage: entry.crop_stage.to_string(),
            current_temp: entry.weather.as_ref().map(|w| w.temperature),
            current_humidity: entry.weather.as_ref().map(|w| w.humidity),
            forecast,
            advisory: Some(advisory),
        })
    }

    fn into_entry(self) -> Result<AdvisoryEntry, String> {
        let timestamp = DateTime::parse_from_rfc3339(&self.timestamp)
            .map_err(|e| format!("bad timestamp '{}': {}", self.timestamp, e))?
            .with_timezone(&Utc);

        let weather = match (self.current_temp, self.current_humidity) {
            (Some(temperature), Some(humidity)) => Some(WeatherSnapshot {
                temperature,
                humidity,
                condition: UNLOGGED_CONDITION.to_string(),
            }),
            _ => None,
        };

        let forecast = match self.forecast.as_deref().map(str::trim) {
            Some(blob) if !blob.is_empty() => Some(
                serde_json::from_str::<Vec<ForecastDay>>(blob)
                    .map_err(|e| format!("bad forecast column: {}", e))?,
            ),
            _ => None,
        };

        let advisory_lines = self
            .advisory
            .as_deref()
            .map(parse_advisory_lines)
            .unwrap_or_default();

        Ok(AdvisoryEntry {
            timestamp,
            farmer_name: self.farmer,
            location: self.location,
            soil_type: SoilType::parse(&self.soil),
            crop_stage: CropStage::parse(&self.stage),
            weather,
            forecast,
            advisory_lines,
        })
    }
}

fn parse_advisory_lines(column: &str) -> Vec<String> {
    let column = column.trim();
    if column.is_empty() {
        return Vec::new();
    }
    if column.starts_with('[') {
        if let Ok(lines) = serde_json::from_str::<Vec<String>>(column) {
            return lines;
        }
    }
    column
        .split(LEGACY_LINE_SEPARATOR)
        .map(str::to_string)
        .collect()
}

/// Handle to the CSV log at a configured path.
#[derive(Debug, Clone)]
pub struct AdvisoryLog {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl AdvisoryLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry, creating the file (and its directory) if needed.
    pub fn append(&self, entry: &AdvisoryEntry) -> Result<(), AppError> {
        let row = LogRow::from_entry(entry)?;
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let needs_header = file.metadata()?.len() == 0;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer.serialize(&row)?;
        writer.flush()?;

        tracing::debug!(
            "Appended advisory for '{}' to {}",
            entry.farmer_name,
            self.path.display()
        );
        Ok(())
    }

    /// Read every entry, oldest first. A missing file is an empty log.
    ///
    /// Rows that cannot be understood are skipped with a warning.
    pub fn read_all(&self) -> Result<Vec<AdvisoryEntry>, AppError> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let columns = csv::StringRecord::from(LOG_COLUMNS.to_vec());
        if reader.headers()?.len() < LOG_COLUMNS.len() {
            tracing::debug!(
                "{} has a short header, reading rows by position",
                self.path.display()
            );
        }

        let mut entries = Vec::new();
        for (row_idx, result) in reader.records().enumerate() {
            let parsed = result
                .map_err(|e| e.to_string())
                .and_then(|record| {
                    record
                        .deserialize::<LogRow>(Some(&columns))
                        .map_err(|e| e.to_string())
                })
                .and_then(LogRow::into_entry);
            match parsed {
                Ok(entry) => entries.push(entry),
                Err(e) => tracing::warn!(
                    "Skipping unreadable row {} in {}: {}",
                    row_idx + 1,
                    self.path.display(),
                    e
                ),
            }
        }

        Ok(entries)
    }

    /// `append` on the blocking pool.
    pub async fn append_async(&self, entry: AdvisoryEntry) -> Result<(), AppError> {
        let log = self.clone();
        tokio::task::spawn_blocking(move || log.append(&entry))
            .await
            .map_err(|e| AppError::InternalError(format!("Advisory log task failed: {}", e)))?
    }

    /// `read_all` on the blocking pool.
    pub async fn read_all_async(&self) -> Result<Vec<AdvisoryEntry>, AppError> {
        let log = self.clone();
        tokio::task::spawn_blocking(move || log.read_all())
            .await
            .map_err(|e| AppError::InternalError(format!("Advisory log task failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;

    fn entry(farmer: &str, with_weather: bool) -> AdvisoryEntry {
        AdvisoryEntry {
            timestamp: "2024-05-01T06:30:00Z".parse().unwrap(),
            farmer_name: farmer.to_string(),
            location: "Mandya".to_string(),
            soil_type: SoilType::Red,
            crop_stage: CropStage::Flowering,
            weather: with_weather.then(|| WeatherSnapshot {
                temperature: 31.5,
                humidity: 72,
                condition: "haze".to_string(),
            }),
            forecast: with_weather.then(|| {
                vec![ForecastDay {
                    date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
                    avg_temp: 30.2,
                    avg_humidity: 77.5,
                    condition: "light rain".to_string(),
                }]
            }),
            advisory_lines: vec![
                "Best crops for Red soil: Millets, Groundnut, Pulses, Potato.".to_string(),
                "Flowering stage: apply potash, and avoid water stress.".to_string(),
            ],
        }
    }

    #[test]
    fn test_round_trip_with_weather() {
        let dir = tempfile::tempdir().unwrap();
        let log = AdvisoryLog::new(dir.path().join("log.csv"));

        log.append(&entry("Ravi", true)).unwrap();
        let entries = log.read_all().unwrap();

        assert_eq!(entries.len(), 1);
        let read = &entries[0];
        assert_eq!(read.farmer_name, "Ravi");
        assert_eq!(read.soil_type, SoilType::Red);
        assert_eq!(read.crop_stage, CropStage::Flowering);
        assert_eq!(read.weather.as_ref().unwrap().temperature, 31.5);
        assert_eq!(read.weather.as_ref().unwrap().humidity, 72);
        assert_eq!(read.forecast.as_ref().unwrap()[0].avg_humidity, 77.5);
        assert_eq!(read.advisory_lines, entry("Ravi", true).advisory_lines);
    }

    #[test]
    fn test_header_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");
        let log = AdvisoryLog::new(&path);

        log.append(&entry("A", true)).unwrap();
        log.append(&entry("B", false)).unwrap();
        log.append(&entry("C", true)).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.matches("timestamp,farmer").count(), 1);
        assert!(contents.starts_with(
            "timestamp,farmer,location,soil,stage,current_temp,current_humidity,forecast,advisory"
        ));

        let names: Vec<String> = log
            .read_all()
            .unwrap()
            .into_iter()
            .map(|e| e.farmer_name)
            .collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_entry_without_weather_reads_back_absent() {
        let dir = tempfile::tempdir().unwrap();
        let log = AdvisoryLog::new(dir.path().join("log.csv"));

        log.append(&entry("Lakshmi", false)).unwrap();
        let read = log.read_all().unwrap().remove(0);
        assert!(read.weather.is_none());
        assert!(read.forecast.is_none());
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = AdvisoryLog::new(dir.path().join("nope.csv"));
        assert!(log.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let log = AdvisoryLog::new(dir.path().join("data").join("log.csv"));
        log.append(&entry("Ravi", false)).unwrap();
        assert!(log.path().exists());
    }

    #[test]
    fn test_tolerates_rows_without_forecast_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("old.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "timestamp,farmer,location,soil,stage,current_temp,current_humidity").unwrap();
        writeln!(file, "2024-04-01T10:00:00+00:00,Old Farmer,Hassan,Black,Sowing,29.0,60").unwrap();
        drop(file);

        let entries = AdvisoryLog::new(&path).read_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].soil_type, SoilType::Black);
        assert!(entries[0].forecast.is_none());
        assert!(entries[0].advisory_lines.is_empty());
    }

    #[test]
    fn test_append_under_short_header_keeps_all_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("old.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "timestamp,farmer,location,soil,stage,current_temp,current_humidity").unwrap();
        writeln!(file, "2024-04-01T10:00:00+00:00,Old Farmer,Hassan,Black,Sowing,29.0,60").unwrap();
        drop(file);

        let log = AdvisoryLog::new(&path);
        let mut new_entry = entry("New Farmer", true);
        new_entry.advisory_lines = vec!["a".to_string(), "b".to_string()];
        log.append(&new_entry).unwrap();

        let entries = log.read_all().unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].advisory_lines.is_empty());
        assert_eq!(entries[1].farmer_name, "New Farmer");
        assert_eq!(entries[1].advisory_lines, vec!["a", "b"]);
        assert_eq!(entries[1].forecast.as_ref().unwrap()[0].condition, "light rain");
    }

    #[test]
    fn test_line_containing_separator_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let log = AdvisoryLog::new(dir.path().join("log.csv"));
        let mut e = entry("Ravi", false);
        e.advisory_lines = vec!["Rice | Wheat, then \"Pulses\"".to_string(), "Done.".to_string()];

        log.append(&e).unwrap();
        let read = log.read_all().unwrap().remove(0);
        assert_eq!(read.advisory_lines, e.advisory_lines);
    }

    #[test]
    fn test_reads_pipe_joined_advisory_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipes.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "{}", LOG_COLUMNS.join(",")).unwrap();
        writeln!(
            file,
            "2024-04-02T08:00:00+00:00,Meena,Tumkur,Red,Vegetative,,,,Line one. | Line two."
        )
        .unwrap();
        drop(file);

        let entries = AdvisoryLog::new(&path).read_all().unwrap();
        assert_eq!(entries[0].advisory_lines, vec!["Line one.", "Line two."]);
        assert!(entries[0].weather.is_none());
    }

    #[test]
    fn test_skips_unreadable_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mixed.csv");
        let log = AdvisoryLog::new(&path);
        log.append(&entry("Good", true)).unwrap();

        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "yesterday,Bad,X,Red,Sowing,,,,").unwrap();
        drop(file);

        let entries = log.read_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].farmer_name, "Good");
    }

    #[tokio::test]
    async fn test_async_wrappers() {
        let dir = tempfile::tempdir().unwrap();
        let log = AdvisoryLog::new(dir.path().join("log.csv"));
        log.append_async(entry("Async", true)).await.unwrap();
        assert_eq!(log.read_all_async().await.unwrap().len(), 1);
    }
}
