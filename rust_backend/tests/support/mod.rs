//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use ridership_lakehouse::parsing::RAW_FIELDNAMES;

/// One raw snapshot row: `(timestamp, station id, station name, ridership)`.
pub type RawRow<'a> = (&'a str, &'a str, &'a str, u64);

/// Write a raw ridership CSV with the full export header.
pub fn write_raw_csv(dir: &Path, rows: &[RawRow<'_>]) -> PathBuf {
    let path = dir.join("raw-mta-data.csv");
    let mut content = RAW_FIELDNAMES.join(",");
    content.push('\n');
    for (i, (ts, station, name, ridership)) in rows.iter().enumerate() {
        content.push_str(&format!(
            "{},subway,{},{},Manhattan,omny,Full Fare,{},0,40.{:04},-73.9{:03},POINT (-73.9 40.7),1,2,3\n",
            ts, station, name, ridership, 7000 + i, i
        ));
    }
    fs::write(&path, content).unwrap();
    path
}

/// A small snapshot: `stations` stations over two hours, with a split fare
/// class row per station and hour.
pub fn sample_rows(stations: usize) -> Vec<(String, String, String, u64)> {
    let mut rows = Vec::new();
    for station in 0..stations {
        for (hour, ts) in ["03/07/2024 06:00:00 AM", "03/07/2024 07:00:00 AM"]
            .iter()
            .enumerate()
        {
            let base = (station as u64 + 1) * 20 + hour as u64 * 65;
            rows.push((
                ts.to_string(),
                (100 + station).to_string(),
                format!("Station {}", station),
                base,
            ));
            rows.push((
                ts.to_string(),
                (100 + station).to_string(),
                format!("Station {}", station),
                7,
            ));
        }
    }
    rows
}

pub fn write_sample_csv(dir: &Path, stations: usize) -> PathBuf {
    let owned = sample_rows(stations);
    let rows: Vec<RawRow<'_>> = owned
        .iter()
        .map(|(ts, id, name, r)| (ts.as_str(), id.as_str(), name.as_str(), *r))
        .collect();
    write_raw_csv(dir, &rows)
}

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// Restores the variables on unwind and serializes access to the process
/// environment across parallel tests. `None` removes a variable.
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}
