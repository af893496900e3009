//! Per-stop bus occupancy simulation.
//!
//! For every line, buses leave the first stop every `frequency_minutes` and
//! reach stop `k` after `k * minutes_between_stops`. At each stop riders
//! alight first, then waiting riders board while capacity remains. Riders
//! who do not fit wait for the next bus of the same line. The first bus of
//! a line collects riders who arrived during one headway before it.

use chrono::{DateTime, TimeDelta, Utc};
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{info, warn};

use super::demand::{split_share, RidershipIndex};
use crate::generation::{resolve_seed, seeded_rng};
use crate::models::{format_ride_id, BusLine, BusRide, BusSize, StationId};

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("A {hours} hour simulation starting at {start} ends out of range")]
    WindowOutOfRange { start: DateTime<Utc>, hours: u32 },
}

/// Simulation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// First departure time. Defaults to the earliest hour of ridership data.
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    #[serde(default = "default_hours")]
    pub hours: u32,
    #[serde(default = "default_minutes_between_stops")]
    pub minutes_between_stops: u32,
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_enabled() -> bool {
    true
}

fn default_hours() -> u32 {
    24
}

fn default_minutes_between_stops() -> u32 {
    2
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            start: None,
            hours: default_hours(),
            minutes_between_stops: default_minutes_between_stops(),
            seed: None,
        }
    }
}

#[derive(Debug)]
pub struct BusRideSimulator {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    minutes_between_stops: u32,
    seed: u64,
    rng: ChaCha8Rng,
}

/// Per (line, stop) state carried between consecutive buses of a line.
#[derive(Debug, Clone, Copy)]
struct StopState {
    last_visit: DateTime<Utc>,
    left_behind: u64,
}

impl BusRideSimulator {
    /// Simulate departures in `[start, end)`.
    pub fn new(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        minutes_between_stops: u32,
        seed: Option<u64>,
    ) -> Self {
        let seed = resolve_seed(seed, "bus rides");
        Self {
            start,
            end,
            minutes_between_stops,
            seed,
            rng: seeded_rng(seed),
        }
    }

    /// Build a simulator from configuration, starting at `default_start`
    /// when no explicit start is configured.
    pub fn from_config(
        config: &SimulationConfig,
        default_start: DateTime<Utc>,
    ) -> Result<Self, SimulationError> {
        let start = config.start.unwrap_or(default_start);
        let end = TimeDelta::try_hours(i64::from(config.hours))
            .and_then(|span| start.checked_add_signed(span))
            .ok_or(SimulationError::WindowOutOfRange {
                start,
                hours: config.hours,
            })?;
        Ok(Self::new(start, end, config.minutes_between_stops, config.seed))
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn window(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        (self.start, self.end)
    }

    /// Run every line over the simulation window.
    ///
    /// Rows are ordered by line, departure and stop index.
    pub fn simulate(&mut self, lines: &[BusLine], demand: &RidershipIndex) -> Vec<BusRide> {
        let serving = lines_per_station(lines);
        let mut rides = Vec::new();

        for line in lines {
            if line.frequency_minutes == 0 || line.stops.is_empty() {
                warn!(line = %line.bus_line, "Skipping line without service");
                continue;
            }

            let headway = TimeDelta::minutes(line.frequency_minutes as i64);
            // The first bus collects riders who arrived during one headway before it
            let mut stops: Vec<StopState> = vec![
                StopState {
                    last_visit: self.start - headway,
                    left_behind: 0,
                };
                line.stops.len()
            ];

            let mut departure = self.start;
            while departure < self.end {
                let size = *BusSize::ALL
                    .choose(&mut self.rng)
                    .unwrap_or(&BusSize::Standard);
                self.run_bus(line, departure, size, &serving, demand, &mut stops, &mut rides);
                departure += headway;
            }
        }

        info!(
            rides = rides.len(),
            lines = lines.len(),
            seed = self.seed,
            "Simulated bus rides"
        );
        rides
    }

    #[allow(clippy::too_many_arguments)]
    fn run_bus(
        &self,
        line: &BusLine,
        departure: DateTime<Utc>,
        size: BusSize,
        serving: &HashMap<StationId, Vec<i64>>,
        demand: &RidershipIndex,
        stops: &mut [StopState],
        rides: &mut Vec<BusRide>,
    ) {
        let ride_id = format_ride_id(line.bus_line_id, departure);
        let total_capacity = size.total_capacity() as u64;
        let num_stops = line.stops.len();
        let mut onboard: u64 = 0;

        for (index, (&station, state)) in line.stops.iter().zip(stops.iter_mut()).enumerate() {
            let at_stop =
                departure + TimeDelta::minutes(index as i64 * self.minutes_between_stops as i64);
            let last_stop = index + 1 == num_stops;

            let arrived = demand.riders_between(station, state.last_visit, at_stop);
            let (participants, rank) = serving
                .get(&station)
                .map(|ids| {
                    let rank = ids.iter().position(|&id| id == line.bus_line_id).unwrap_or(0);
                    (ids.len(), rank)
                })
                .unwrap_or((1, 0));
            let passengers_in_stop = split_share(arrived, participants, rank) + state.left_behind;

            // Riders leave evenly over the remaining stops; everyone leaves at the last one
            let alighting = onboard / (num_stops - index) as u64;
            let after_alighting = onboard - alighting;
            let boarding = if last_stop {
                0
            } else {
                passengers_in_stop.min(total_capacity - after_alighting)
            };
            onboard = after_alighting + boarding;
            let remaining_at_stop = passengers_in_stop - boarding;

            state.last_visit = at_stop;
            state.left_behind = remaining_at_stop;

            rides.push(BusRide {
                bus_ride_id: ride_id.clone(),
                bus_line_id: line.bus_line_id,
                bus_line: line.bus_line.clone(),
                bus_size: size,
                seating_capacity: size.seating_capacity(),
                standing_capacity: size.standing_capacity(),
                total_capacity: size.total_capacity(),
                bus_stop_id: station,
                bus_stop_index: index,
                num_of_bus_stops: num_stops,
                last_stop,
                timestamp_at_stop: at_stop,
                passengers_in_stop,
                passengers_alighting: alighting,
                passengers_boarding: boarding,
                remaining_capacity: total_capacity - onboard,
                remaining_at_stop,
                total_passengers: onboard,
            });
        }
    }
}

/// Line ids serving each station, in ascending order.
fn lines_per_station(lines: &[BusLine]) -> HashMap<StationId, Vec<i64>> {
    let mut serving: HashMap<StationId, Vec<i64>> = HashMap::new();
    for line in lines {
        for station in &line.stops {
            serving.entry(*station).or_default().push(line.bus_line_id);
        }
    }
    for ids in serving.values_mut() {
        ids.sort_unstable();
        ids.dedup();
    }
    serving
}
