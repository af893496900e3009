use super::error::GenerationResult;
use super::faker::FakeData;
use crate::models::{BusStation, Station};

/// Replace the identifying fields of a station with fakes.
///
/// The id, borough and coordinates are carried over unchanged.
pub fn anonymize_station(station: &Station, fake: &mut FakeData) -> GenerationResult<BusStation> {
    Ok(BusStation {
        bus_stop_id: station.station_id,
        address: fake.unique_address()?,
        school_zone: fake.boolean(),
        seating: fake.boolean(),
        borough: station.borough.clone(),
        latitude: station.latitude,
        longitude: station.longitude,
    })
}

pub fn anonymize_stations(
    stations: &[Station],
    fake: &mut FakeData,
) -> GenerationResult<Vec<BusStation>> {
    stations
        .iter()
        .map(|station| anonymize_station(station, fake))
        .collect()
}
