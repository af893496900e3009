//! Synthetic bus lines sampled from the station population.
//!
//! Stop counts follow a normal distribution (mean 35, standard deviation 2
//! by default) and stops are drawn uniformly without replacement, so a line
//! is always a simple path and never a loop.

use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

use super::error::{GenerationError, GenerationResult};
use super::faker::FakeData;
use super::rng::{resolve_seed, seeded_rng};
use crate::models::{BusLine, StationId};

/// Parameters of the generated bus network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusNetworkConfig {
    #[serde(default = "default_line_count")]
    pub line_count: usize,
    #[serde(default = "default_mean_stops")]
    pub mean_stops: f64,
    #[serde(default = "default_std_dev_stops")]
    pub std_dev_stops: f64,
    #[serde(default = "default_frequencies")]
    pub frequencies: Vec<u32>,
    /// Seed of the route generator. Drawn from entropy and logged when unset.
    #[serde(default)]
    pub route_seed: Option<u64>,
}

fn default_line_count() -> usize {
    25
}

fn default_mean_stops() -> f64 {
    35.0
}

fn default_std_dev_stops() -> f64 {
    2.0
}

fn default_frequencies() -> Vec<u32> {
    vec![5, 10, 15, 20]
}

impl Default for BusNetworkConfig {
    fn default() -> Self {
        Self {
            line_count: default_line_count(),
            mean_stops: default_mean_stops(),
            std_dev_stops: default_std_dev_stops(),
            frequencies: default_frequencies(),
            route_seed: None,
        }
    }
}

pub struct BusNetworkGenerator {
    config: BusNetworkConfig,
    seed: u64,
    rng: ChaCha8Rng,
    stop_count: Normal<f64>,
}

impl BusNetworkGenerator {
    pub fn new(config: BusNetworkConfig) -> GenerationResult<Self> {
        if config.frequencies.is_empty() {
            return Err(GenerationError::EmptyFrequencies);
        }
        let stop_count = Normal::new(config.mean_stops, config.std_dev_stops)
            .map_err(|e| GenerationError::InvalidDistribution(e.to_string()))?;
        let seed = resolve_seed(config.route_seed, "routes");

        Ok(Self {
            config,
            seed,
            rng: seeded_rng(seed),
            stop_count,
        })
    }

    /// Seed actually used by the route generator.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Generate `line_count` lines over `station_ids`.
    ///
    /// Duplicate ids in the input are ignored; line codes come from `fake`.
    pub fn generate(
        &mut self,
        station_ids: &[StationId],
        fake: &mut FakeData,
    ) -> GenerationResult<Vec<BusLine>> {
        let mut seen = HashSet::with_capacity(station_ids.len());
        let population: Vec<StationId> = station_ids
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect();

        let lines = (0..self.config.line_count)
            .map(|index| self.generate_line(index, &population, fake))
            .collect::<GenerationResult<Vec<_>>>()?;

        info!(
            lines = lines.len(),
            stations = population.len(),
            seed = self.seed,
            "Generated bus network"
        );
        Ok(lines)
    }

    fn generate_line(
        &mut self,
        index: usize,
        population: &[StationId],
        fake: &mut FakeData,
    ) -> GenerationResult<BusLine> {
        // Truncation toward zero, like an integer cast of the sample
        let drawn = self.stop_count.sample(&mut self.rng) as i64;
        let number_of_stops = drawn.max(1) as usize;
        if number_of_stops > population.len() {
            return Err(GenerationError::NotEnoughStations {
                requested: number_of_stops,
                available: population.len(),
            });
        }

        let bus_line = fake.unique_line_code()?;
        let stops: Vec<StationId> = population
            .choose_multiple(&mut self.rng, number_of_stops)
            .copied()
            .collect();
        let frequency_minutes = *self
            .config
            .frequencies
            .choose(&mut self.rng)
            .ok_or(GenerationError::EmptyFrequencies)?;

        debug!(line = %bus_line, stops = number_of_stops, frequency_minutes, "Generated bus line");

        Ok(BusLine {
            bus_line_id: index as i64 + 1,
            bus_line,
            number_of_stops,
            stops,
            frequency_minutes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station_ids(n: i64) -> Vec<StationId> {
        (1..=n).map(StationId).collect()
    }

    fn config(seed: u64) -> BusNetworkConfig {
        BusNetworkConfig {
            route_seed: Some(seed),
            ..Default::default()
        }
    }

    #[test]
    fn test_routes_have_no_repeated_stops() {
        let mut generator = BusNetworkGenerator::new(config(11)).unwrap();
        let mut fake = FakeData::seeded(42);
        let lines = generator.generate(&station_ids(400), &mut fake).unwrap();

        assert_eq!(lines.len(), 25);
        for line in &lines {
            let unique: HashSet<_> = line.stops.iter().collect();
            assert_eq!(unique.len(), line.stops.len());
            assert_eq!(line.number_of_stops, line.stops.len());
            // 35 +/- 2: ten standard deviations is a generous plausibility bound
            assert!((15..=55).contains(&line.number_of_stops));
            assert!([5, 10, 15, 20].contains(&line.frequency_minutes));
        }
    }

    #[test]
    fn test_line_ids_are_sequential() {
        let mut generator = BusNetworkGenerator::new(config(2)).unwrap();
        let mut fake = FakeData::seeded(42);
        let lines = generator.generate(&station_ids(100), &mut fake).unwrap();
        let ids: Vec<i64> = lines.iter().map(|l| l.bus_line_id).collect();
        assert_eq!(ids, (1..=25).collect::<Vec<_>>());
    }

    #[test]
    fn test_same_seeds_same_network() {
        let ids = station_ids(200);
        let a = BusNetworkGenerator::new(config(5))
            .unwrap()
            .generate(&ids, &mut FakeData::seeded(42))
            .unwrap();
        let b = BusNetworkGenerator::new(config(5))
            .unwrap()
            .generate(&ids, &mut FakeData::seeded(42))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_too_few_stations_is_an_error() {
        let mut generator = BusNetworkGenerator::new(config(3)).unwrap();
        let mut fake = FakeData::seeded(42);
        let result = generator.generate(&station_ids(10), &mut fake);
        assert!(matches!(
            result,
            Err(GenerationError::NotEnoughStations { available: 10, .. })
        ));
    }

    #[test]
    fn test_duplicate_station_ids_are_ignored() {
        let mut ids = station_ids(3);
        ids.extend(station_ids(3));
        let mut generator = BusNetworkGenerator::new(BusNetworkConfig {
            line_count: 1,
            mean_stops: 3.0,
            std_dev_stops: 0.0,
            frequencies: vec![10],
            route_seed: Some(1),
        })
        .unwrap();
        let lines = generator.generate(&ids, &mut FakeData::seeded(42)).unwrap();
        assert_eq!(lines[0].stops.len(), 3);
    }

    #[test]
    fn test_empty_frequencies_rejected() {
        let result = BusNetworkGenerator::new(BusNetworkConfig {
            frequencies: vec![],
            ..config(1)
        });
        assert!(matches!(result, Err(GenerationError::EmptyFrequencies)));
    }

    #[test]
    fn test_negative_std_dev_rejected() {
        let result = BusNetworkGenerator::new(BusNetworkConfig {
            std_dev_stops: -1.0,
            ..config(1)
        });
        assert!(matches!(result, Err(GenerationError::InvalidDistribution(_))));
    }
}
