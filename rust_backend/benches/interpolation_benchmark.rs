use chrono::{TimeDelta, TimeZone, Utc};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

use ridership_lakehouse::models::{HourlyRidership, StationId};
use ridership_lakehouse::transformations::{find_discrepancies, interpolate_minutes, minute_share};

fn hourly_rows(stations: i64, hours: i64) -> Vec<HourlyRidership> {
    let start = Utc.with_ymd_and_hms(2024, 3, 7, 0, 0, 0).unwrap();
    (0..stations)
        .flat_map(|station| {
            (0..hours).map(move |hour| HourlyRidership {
                transit_timestamp: start + TimeDelta::hours(hour),
                station_id: StationId(station),
                ridership: ((station * 37 + hour * 11) % 900) as u64,
            })
        })
        .collect()
}

fn bench_minute_share(c: &mut Criterion) {
    let mut group = c.benchmark_group("minute_share");

    group.bench_function("one_hour", |b| {
        b.iter(|| {
            let mut total = 0;
            for minute in 0..60 {
                total += minute_share(black_box(4_321), minute);
            }
            black_box(total)
        });
    });

    group.finish();
}

fn bench_interpolation(c: &mut Criterion) {
    let mut group = c.benchmark_group("interpolate_minutes");

    for (stations, hours) in [(10, 24), (100, 24), (400, 24)] {
        let hourly = hourly_rows(stations, hours);
        group.bench_with_input(
            BenchmarkId::new("stations_x_day", stations),
            &hourly,
            |b, input| b.iter(|| interpolate_minutes(black_box(input))),
        );
    }

    group.finish();
}

fn bench_consistency_check(c: &mut Criterion) {
    let mut group = c.benchmark_group("consistency_check");

    let hourly = hourly_rows(100, 24);
    let minutes = interpolate_minutes(&hourly);
    group.bench_function("100_stations_day", |b| {
        b.iter(|| find_discrepancies(black_box(&minutes), black_box(&hourly)));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_minute_share,
    bench_interpolation,
    bench_consistency_check
);
criterion_main!(benches);
