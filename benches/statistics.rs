//! Benchmarks for the statistics and masking engines
//!
//! - gc_content: NEON vs scalar GC counting on single sequences
//! - compute_stats: whole-table statistics, serial vs parallel row counts
//! - mask_table: interval merging and masking over many alignments
//!
//! Run with: cargo bench --bench statistics

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use virseq::config::{MaskConfig, StatsConfig};
use virseq::formats::sam::sam_from_reader;
use virseq::operations::masking::mask_table;
use virseq::operations::stats::{compute_stats, StatField};
use virseq::operations::{gc_content, gc_count};
use virseq::{SequenceRecord, SequenceTable};

/// Deterministic DNA with a sprinkling of Ns
fn generate_sequence(len: usize, seed: usize) -> Vec<u8> {
    (0..len)
        .map(|i| match (i * 7 + seed) % 23 {
            0 => b'N',
            r => [b'A', b'C', b'G', b'T'][r % 4],
        })
        .collect()
}

fn generate_table(rows: usize, len: usize) -> SequenceTable {
    (0..rows)
        .map(|i| SequenceRecord::new(format!("contig_{}", i), generate_sequence(len, i)))
        .collect()
}

fn bench_gc_content(c: &mut Criterion) {
    let mut group = c.benchmark_group("gc_content");

    for size in [100, 10_000, 1_000_000].iter() {
        let seq = generate_sequence(*size, 0);

        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::new("fraction", size), size, |b, _| {
            b.iter(|| gc_content(black_box(&seq)))
        });
        group.bench_with_input(BenchmarkId::new("scalar", size), size, |b, _| {
            b.iter(|| virseq::operations::gc_content::gc_count_scalar(black_box(&seq)))
        });
        group.bench_with_input(BenchmarkId::new("count", size), size, |b, _| {
            b.iter(|| gc_count(black_box(&seq)))
        });
    }

    group.finish();
}

/// Row counts straddle the parallel threshold
fn bench_compute_stats(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_stats");
    let config = StatsConfig {
        fields: vec![
            StatField::GcContent,
            StatField::NCount,
            StatField::Hash,
            StatField::KmerFreq,
        ],
        ..StatsConfig::default()
    };

    for rows in [500, 5_000].iter() {
        let table = generate_table(*rows, 1_500);
        group.throughput(Throughput::Elements(*rows as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), rows, |b, _| {
            b.iter(|| compute_stats(black_box(&table), &config))
        });
    }

    group.finish();
}

fn bench_mask_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("mask_table");
    let table = generate_table(50, 30_000);

    for alignments in [1_000, 20_000].iter() {
        let sam: String = (0..*alignments)
            .map(|i| {
                format!(
                    "q{}\t0\tcontig_{}\t{}\t60\t5S40M3D60M2I20M\t*\t0\t0\t*\t*\n",
                    i,
                    i % 50,
                    1 + (i * 131) % 29_000
                )
            })
            .collect();

        group.throughput(Throughput::Elements(*alignments as u64));
        group.bench_with_input(BenchmarkId::from_parameter(alignments), alignments, |b, _| {
            b.iter(|| mask_table(black_box(&table), sam_from_reader(sam.as_bytes()), &MaskConfig::default()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_gc_content, bench_compute_stats, bench_mask_table);
criterion_main!(benches);
