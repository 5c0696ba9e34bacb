//! Performance benchmarks for output parsing, aggregation and config loading

use clap::Parser;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use transfer_benchmark::{
    cli::Cli,
    extract::{extract_numeric_field, gdrive_file_ids, parse_speed_readings, BYTES_PER_SECOND_FIELD, DUCK_SPEED_SUFFIX},
    models::{Config, SizeLabel},
    stats::{standard_error, Aggregator},
    types::{Site, Tool},
};

const LABELS: [&str; 6] = ["1M", "10M", "100M", "1G", "10G", "100G"];

/// `globus task show` output with many unrelated fields
fn globus_task_output(extra_fields: usize) -> String {
    let mut text = String::from("Label:                        None\nTask ID:                      4e3f-aa01\n");
    for i in 0..extra_fields {
        text.push_str(&format!("Field {}:                     value {}\n", i, i));
    }
    text.push_str("Bytes Per Second:             104857600\n");
    text
}

/// `duck` progress output with one reading per line
fn duck_progress_output(lines: usize) -> String {
    (0..lines)
        .map(|i| format!("Upload Temp_1G.txt ({} MB) {}.5 MB/sec\n", i, i % 90))
        .collect()
}

fn sample_rows(count: usize) -> Vec<(&'static str, f64)> {
    (0..count)
        .map(|i| (LABELS[i % LABELS.len()], 1.0 + (i % 17) as f64 * 0.25))
        .collect()
}

fn benchmark_output_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("output_parsing");

    for size in [10, 100, 1000] {
        let globus = globus_task_output(size);
        group.bench_with_input(BenchmarkId::new("extract_numeric_field", size), &globus, |b, text| {
            b.iter(|| black_box(extract_numeric_field(black_box(text), BYTES_PER_SECOND_FIELD)));
        });

        let duck = duck_progress_output(size);
        group.bench_with_input(BenchmarkId::new("parse_speed_readings", size), &duck, |b, text| {
            b.iter(|| black_box(parse_speed_readings(black_box(text), DUCK_SPEED_SUFFIX)));
        });
    }

    let listing: String = (0..500)
        .map(|i| format!("id{:05}    Temp_{}M.txt    bin    1 MB    2019-09-20 10:00:00\n", i, i))
        .collect();
    group.bench_function("gdrive_file_ids", |b| {
        b.iter(|| black_box(gdrive_file_ids(black_box(&listing), "Temp_499M.txt")));
    });

    group.bench_function("size_label_from_filename", |b| {
        b.iter(|| black_box(SizeLabel::from_filename(black_box("Temp_100M_irods_copy.txt"))));
    });

    group.finish();
}

fn benchmark_aggregation(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregation");
    let aggregator = Aggregator::default();

    for size in [30, 300, 3000] {
        let rows = sample_rows(size);
        group.bench_with_input(BenchmarkId::new("aggregate_values", size), &rows, |b, rows| {
            b.iter(|| black_box(aggregator.aggregate_values(rows.iter().copied())));
        });

        let values: Vec<f64> = rows.iter().map(|(_, v)| *v).collect();
        group.bench_with_input(BenchmarkId::new("standard_error", size), &values, |b, values| {
            b.iter(|| black_box(standard_error(black_box(values))));
        });
    }

    group.finish();
}

fn benchmark_config(c: &mut Criterion) {
    let mut group = c.benchmark_group("config");

    group.bench_function("parse_cli_args", |b| {
        b.iter(|| {
            black_box(Cli::parse_from([
                "tbench", "run", "--tool", "irods", "--source", "hpc", "--destination", "cyverse", "--file",
                "Temp_1M.txt", "--file", "Temp_1G.txt", "-n", "10",
            ]))
        });
    });

    let config = Config {
        tool: Tool::Irods,
        source: Site::Hpc,
        destination: Site::Cyverse,
        dummy_files: (1..=50).map(|i| format!("Temp_{}M.txt", i)).collect(),
        ..Config::default()
    };
    group.bench_function("validate_and_resolve_jobs", |b| {
        b.iter(|| {
            black_box(config.validate()).ok();
            black_box(config.jobs()).ok();
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_output_parsing, benchmark_aggregation, benchmark_config);

criterion_main!(benches);
