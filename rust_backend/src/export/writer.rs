//! File writers for the lakehouse directory.

use anyhow::{bail, Context, Result};
use polars::prelude::*;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::frames::{bus_lines_frame, bus_stations_frame, minute_ridership_frame};
use crate::models::{BusLine, BusStation, MinuteRidership};

pub const STAGING_PREFIX: &str = "mta_staging_data";
pub const BUS_STATIONS_FILE: &str = "bus_stations.csv";
pub const BUS_LINES_PREFIX: &str = "bus_lines";
pub const RIDERSHIP_PREFIX: &str = "ridership";
pub const DEFAULT_ROWS_PER_FILE: usize = 1_000_000;

/// Paths below `<output>/mta_staging_data`.
#[derive(Debug, Clone)]
pub struct ExportLayout {
    root: PathBuf,
}

impl ExportLayout {
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            root: output_dir.as_ref().join(STAGING_PREFIX),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn bus_stations_csv(&self) -> PathBuf {
        self.root.join(BUS_STATIONS_FILE)
    }

    pub fn bus_lines_dir(&self) -> PathBuf {
        self.root.join(BUS_LINES_PREFIX)
    }

    pub fn ridership_dir(&self) -> PathBuf {
        self.root.join(RIDERSHIP_PREFIX)
    }
}

/// Remove whatever exists at `prefix` (file or directory tree).
pub fn clear_prefix(prefix: &Path) -> Result<()> {
    if prefix.is_dir() {
        fs::remove_dir_all(prefix)
            .with_context(|| format!("Failed to clear {}", prefix.display()))?;
        debug!("Cleared {}", prefix.display());
    } else if prefix.exists() {
        fs::remove_file(prefix)
            .with_context(|| format!("Failed to remove {}", prefix.display()))?;
        debug!("Removed {}", prefix.display());
    }
    Ok(())
}

fn create_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    File::create(path).with_context(|| format!("Failed to create {}", path.display()))
}

/// Write the anonymized stations as CSV with a header row.
pub fn write_bus_stations_csv(path: &Path, stations: &[BusStation]) -> Result<PathBuf> {
    clear_prefix(path)?;
    let mut df = bus_stations_frame(stations)?;
    let file = create_file(path)?;
    CsvWriter::new(file)
        .include_header(true)
        .finish(&mut df)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote {} bus stations to {}", stations.len(), path.display());
    Ok(path.to_path_buf())
}

/// Write the bus lines as newline-delimited JSON, one line object per row.
pub fn write_bus_lines_ndjson(path: &Path, lines: &[BusLine]) -> Result<PathBuf> {
    let mut out = BufWriter::new(create_file(path)?);
    for line in lines {
        serde_json::to_writer(&mut out, line)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(path.to_path_buf())
}

/// Write the bus lines under `dir` as `bus_lines.parquet` and `bus_lines.ndjson`.
pub fn write_bus_lines(dir: &Path, lines: &[BusLine]) -> Result<Vec<PathBuf>> {
    clear_prefix(dir)?;
    let parquet_path = dir.join("bus_lines.parquet");
    let mut df = bus_lines_frame(lines)?;
    ParquetWriter::new(create_file(&parquet_path)?)
        .finish(&mut df)
        .with_context(|| format!("Failed to write {}", parquet_path.display()))?;

    let ndjson_path = write_bus_lines_ndjson(&dir.join("bus_lines.ndjson"), lines)?;
    info!("Wrote {} bus lines to {}", lines.len(), dir.display());
    Ok(vec![parquet_path, ndjson_path])
}

/// File name of the `index`th ridership partition.
pub fn part_file_name(index: usize) -> String {
    format!("part-{:05}.parquet", index)
}

/// Write minute ridership as `part-NNNNN.parquet` files of at most
/// `rows_per_file` rows each. No rows means no files.
pub fn write_minute_ridership(
    dir: &Path,
    minutes: &[MinuteRidership],
    rows_per_file: usize,
) -> Result<Vec<PathBuf>> {
    if rows_per_file == 0 {
        bail!("rows_per_file must be positive");
    }
    clear_prefix(dir)?;
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let mut written = Vec::new();
    for (index, chunk) in minutes.chunks(rows_per_file).enumerate() {
        let path = dir.join(part_file_name(index));
        let mut df = minute_ridership_frame(chunk)?;
        ParquetWriter::new(create_file(&path)?)
            .finish(&mut df)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        debug!("Wrote {} minute rows to {}", chunk.len(), path.display());
        written.push(path);
    }
    info!(
        "Wrote {} minute rows in {} files to {}",
        minutes.len(),
        written.len(),
        dir.display()
    );
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StationId;
    use chrono::{TimeDelta, TimeZone, Utc};
    use tempfile::TempDir;

    fn minutes(n: usize) -> Vec<MinuteRidership> {
        let start = Utc.with_ymd_and_hms(2024, 3, 7, 6, 0, 0).unwrap();
        (0..n)
            .map(|i| MinuteRidership {
                transit_timestamp: start + TimeDelta::minutes(i as i64),
                station_id: StationId(1),
                ridership: i as u64,
            })
            .collect()
    }

    fn read_parquet(path: &Path) -> DataFrame {
        ParquetReader::new(File::open(path).unwrap()).finish().unwrap()
    }

    #[test]
    fn test_layout_paths() {
        let layout = ExportLayout::new("/out");
        assert_eq!(layout.root(), Path::new("/out/mta_staging_data"));
        assert_eq!(
            layout.bus_stations_csv(),
            PathBuf::from("/out/mta_staging_data/bus_stations.csv")
        );
        assert_eq!(layout.ridership_dir(), PathBuf::from("/out/mta_staging_data/ridership"));
    }

    #[test]
    fn test_part_file_name() {
        assert_eq!(part_file_name(0), "part-00000.parquet");
        assert_eq!(part_file_name(12), "part-00012.parquet");
    }

    #[test]
    fn test_minutes_are_partitioned() {
        let dir = TempDir::new().unwrap();
        let files = write_minute_ridership(dir.path(), &minutes(25), 10).unwrap();
        assert_eq!(files.len(), 3);

        let heights: Vec<usize> = files.iter().map(|p| read_parquet(p).height()).collect();
        assert_eq!(heights, vec![10, 10, 5]);
    }

    #[test]
    fn test_rewrite_clears_previous_parts() {
        let dir = TempDir::new().unwrap();
        write_minute_ridership(dir.path(), &minutes(30), 10).unwrap();
        write_minute_ridership(dir.path(), &minutes(5), 10).unwrap();

        let count = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_zero_rows_per_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        assert!(write_minute_ridership(dir.path(), &minutes(1), 0).is_err());
    }

    #[test]
    fn test_bus_stations_csv_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(BUS_STATIONS_FILE);
        let stations = vec![BusStation {
            bus_stop_id: StationId(5),
            address: "12 Main St, Springfield".to_string(),
            school_zone: true,
            seating: false,
            borough: "Queens".to_string(),
            latitude: 40.7,
            longitude: -73.9,
        }];
        write_bus_stations_csv(&path, &stations).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next(),
            Some("bus_stop_id,address,school_zone,seating,borough,latitude,longitude")
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("5,\"12 Main St, Springfield\",true,false,Queens,"));
    }

    #[test]
    fn test_bus_lines_parquet_and_ndjson() {
        let dir = TempDir::new().unwrap();
        let lines = vec![BusLine {
            bus_line_id: 0,
            bus_line: "Q-101".to_string(),
            number_of_stops: 2,
            stops: vec![StationId(2), StationId(1)],
            frequency_minutes: 5,
        }];
        let files = write_bus_lines(dir.path(), &lines).unwrap();
        assert_eq!(files.len(), 2);

        let df = read_parquet(&files[0]);
        assert_eq!(df.height(), 1);

        let ndjson = fs::read_to_string(&files[1]).unwrap();
        let parsed: BusLine = serde_json::from_str(ndjson.lines().next().unwrap()).unwrap();
        assert_eq!(parsed, lines[0]);
    }
}
