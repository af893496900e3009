//! End-to-end generation run.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use super::error::{PipelineError, PipelineResult};
use crate::config::LakehouseConfig;
use crate::db::repository::DatasetRepository;
use crate::db::services::{drop_dataset_if_exists, load_records, store_records};
use crate::db::{tables, TableRef, WarehouseRepository};
use crate::export::{write_bus_lines, write_bus_stations_csv, write_minute_ridership, ExportLayout};
use crate::generation::{anonymize_stations, BusNetworkGenerator, FakeData};
use crate::models::{
    BusLine, BusRide, BusStation, HourlyRidership, MinuteRidership, RawRidershipRecord, Station,
    StationId,
};
use crate::parsing::parse_ridership_csv;
use crate::simulation::{BusRideSimulator, RidershipIndex};
use crate::transformations::{aggregate_hourly, dedup_stations, find_discrepancies, interpolate_minutes};

/// Number of discrepancies echoed to the log before aborting.
const LOGGED_DISCREPANCIES: usize = 5;

/// What a run produced.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineReport {
    pub raw_rows: usize,
    pub stations: usize,
    pub hourly_rows: usize,
    pub minute_rows: usize,
    pub bus_lines: usize,
    pub bus_rides: usize,
    pub fake_seed: u64,
    pub route_seed: u64,
    pub simulation_seed: Option<u64>,
    pub simulation_window: Option<(DateTime<Utc>, DateTime<Utc>)>,
    pub files_written: Vec<PathBuf>,
    pub staging_dropped: bool,
}

/// Staging tables produced from the raw snapshot.
struct StagedRidership {
    stations: Vec<Station>,
    hourly: Vec<HourlyRidership>,
    minutes: Vec<MinuteRidership>,
}

/// Serving tables produced from the stations.
struct BusNetwork {
    stations: Vec<BusStation>,
    lines: Vec<BusLine>,
}

pub struct LakehousePipeline {
    repo: Arc<dyn WarehouseRepository>,
    config: LakehouseConfig,
}

impl LakehousePipeline {
    pub fn new(repo: Arc<dyn WarehouseRepository>, config: LakehouseConfig) -> Self {
        Self { repo, config }
    }

    pub fn config(&self) -> &LakehouseConfig {
        &self.config
    }

    fn staging(&self, table: &str) -> TableRef {
        TableRef::new(&self.config.pipeline.staging_dataset, table)
    }

    fn serving(&self, table: &str) -> TableRef {
        TableRef::new(&self.config.pipeline.dataset, table)
    }

    /// Run every step; the staging dataset is torn down at the end when
    /// configured, whether or not a later step failed.
    pub async fn run(&self) -> PipelineResult<PipelineReport> {
        let input = &self.config.pipeline.input_csv;
        if !input.is_file() {
            return Err(PipelineError::MissingInput(input.clone()));
        }
        info!("Starting lakehouse run from {}", input.display());

        let mut report = PipelineReport::default();
        let outcome = self.run_steps(&mut report).await;

        if self.config.pipeline.teardown_staging {
            match drop_dataset_if_exists(self.repo.as_ref(), &self.config.pipeline.staging_dataset)
                .await
            {
                Ok(dropped) => report.staging_dropped = dropped,
                Err(e) if outcome.is_ok() => return Err(e.into()),
                Err(e) => warn!("Staging teardown failed after an earlier error: {}", e),
            }
        }

        outcome?;
        info!(
            bus_lines = report.bus_lines,
            bus_rides = report.bus_rides,
            files = report.files_written.len(),
            "Lakehouse run finished"
        );
        Ok(report)
    }

    async fn run_steps(&self, report: &mut PipelineReport) -> PipelineResult<()> {
        let staged = self.stage_ridership(report).await?;
        self.check_consistency(&staged)?;
        let network = self.build_bus_network(&staged, report).await?;
        self.simulate_rides(&staged, &network, report).await?;
        self.export_ridership(&staged, report)?;
        Ok(())
    }

    /// Load the raw snapshot and derive stations, hourly and minute ridership.
    async fn stage_ridership(&self, report: &mut PipelineReport) -> PipelineResult<StagedRidership> {
        let repo = self.repo.as_ref();
        repo.create_dataset(&self.config.pipeline.staging_dataset)
            .await?;

        let raw = parse_ridership_csv(&self.config.pipeline.input_csv)?;
        report.raw_rows = store_records(repo, &self.staging(tables::RAW_MTA_DATA), &raw).await?;
        let raw: Vec<RawRidershipRecord> =
            load_records(repo, &self.staging(tables::RAW_MTA_DATA)).await?;

        let stations = dedup_stations(&raw)?;
        report.stations =
            store_records(repo, &self.staging(tables::MTA_DATA_STATIONS), &stations).await?;

        let hourly = aggregate_hourly(&raw)?;
        report.hourly_rows =
            store_records(repo, &self.staging(tables::MTA_DATA_PARSED), &hourly).await?;

        let minutes = interpolate_minutes(&hourly);
        report.minute_rows =
            store_records(repo, &self.staging(tables::RIDERSHIP), &minutes).await?;

        Ok(StagedRidership {
            stations,
            hourly,
            minutes,
        })
    }

    fn check_consistency(&self, staged: &StagedRidership) -> PipelineResult<()> {
        let discrepancies = find_discrepancies(&staged.minutes, &staged.hourly);
        if discrepancies.is_empty() {
            info!("Minute ridership is consistent with the hourly source");
            return Ok(());
        }
        for d in discrepancies.iter().take(LOGGED_DISCREPANCIES) {
            warn!(
                station = %d.station_id,
                hour = %d.transit_timestamp,
                minutes_total = d.ridership_agg,
                hourly_total = d.ridership,
                "Ridership discrepancy"
            );
        }
        Err(PipelineError::Inconsistent {
            count: discrepancies.len(),
        })
    }

    /// Anonymize stations, generate lines, write staging files and load the
    /// serving tables.
    async fn build_bus_network(
        &self,
        staged: &StagedRidership,
        report: &mut PipelineReport,
    ) -> PipelineResult<BusNetwork> {
        let generation = &self.config.generation;
        let mut fake = FakeData::seeded(generation.fake_seed);
        report.fake_seed = generation.fake_seed;

        let bus_stations = anonymize_stations(&staged.stations, &mut fake)?;

        let mut generator = BusNetworkGenerator::new(generation.network.clone())?;
        report.route_seed = generator.seed();
        let station_ids: Vec<StationId> = staged.stations.iter().map(|s| s.station_id).collect();
        let lines = generator.generate(&station_ids, &mut fake)?;

        let layout = ExportLayout::new(&self.config.pipeline.output_dir);
        report
            .files_written
            .push(write_bus_stations_csv(&layout.bus_stations_csv(), &bus_stations)?);
        report
            .files_written
            .extend(write_bus_lines(&layout.bus_lines_dir(), &lines)?);

        let repo = self.repo.as_ref();
        repo.create_dataset(&self.config.pipeline.dataset).await?;
        report.bus_lines = store_records(repo, &self.serving(tables::BUS_LINES), &lines).await?;
        store_records(repo, &self.serving(tables::BUS_STATIONS), &bus_stations).await?;

        Ok(BusNetwork {
            stations: bus_stations,
            lines,
        })
    }

    async fn simulate_rides(
        &self,
        staged: &StagedRidership,
        network: &BusNetwork,
        report: &mut PipelineReport,
    ) -> PipelineResult<()> {
        let simulation = &self.config.simulation;
        if !simulation.enabled {
            info!("Ride simulation disabled");
            return Ok(());
        }

        let demand = RidershipIndex::from_hourly(&staged.hourly);
        let Some(default_start) = simulation.start.or_else(|| demand.first_hour()) else {
            warn!("No ridership data, skipping ride simulation");
            return Ok(());
        };

        let mut simulator = BusRideSimulator::from_config(simulation, default_start)?;
        report.simulation_seed = Some(simulator.seed());
        report.simulation_window = Some(simulator.window());

        let rides: Vec<BusRide> = simulator.simulate(&network.lines, &demand);
        info!(
            rides = rides.len(),
            stops = network.stations.len(),
            "Simulated bus rides"
        );
        report.bus_rides =
            store_records(self.repo.as_ref(), &self.serving(tables::BUS_RIDES), &rides).await?;
        Ok(())
    }

    fn export_ridership(&self, staged: &StagedRidership, report: &mut PipelineReport) -> PipelineResult<()> {
        let layout = ExportLayout::new(&self.config.pipeline.output_dir);
        report.files_written.extend(write_minute_ridership(
            &layout.ridership_dir(),
            &staged.minutes,
            self.config.pipeline.rows_per_file,
        )?);
        Ok(())
    }
}
