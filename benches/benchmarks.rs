//! Benchmarks for probecount
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use probecount::clustering::{Dbscan, Optics};
use probecount::fingerprint::{extract, FingerprintVector};
use probecount::frame::InformationElement;
use probecount::math::Metric;
use probecount::membership::MembershipStore;
use probecount::traits::ClusteringPrimitive;

// ============================================================================
// Membership Store Benchmarks
// ============================================================================

fn bench_membership(c: &mut Criterion) {
    let mut group = c.benchmark_group("membership");
    group.throughput(Throughput::Elements(1));

    for k in [3, 7, 12] {
        group.bench_function(format!("add_k{}", k), |b| {
            let mut store = MembershipStore::new(10_000, k).unwrap();
            let mut i = 0u64;
            b.iter(|| {
                store.add(&i.to_le_bytes());
                i = i.wrapping_add(1);
            });
        });
    }

    group.bench_function("check", |b| {
        let mut store = MembershipStore::new(10_000, 7).unwrap();
        for i in 0..1_000u64 {
            store.add(&i.to_le_bytes());
        }
        let mut i = 0u64;
        b.iter(|| {
            let hit = store.check(&i.to_le_bytes());
            i = i.wrapping_add(1);
            black_box(hit)
        });
    });

    group.bench_function("compress_10k", |b| {
        let mut store = MembershipStore::new(10_000, 7).unwrap();
        store.anonymization_noise(300);
        b.iter(|| black_box(store.compress()));
    });

    group.bench_function("decompress_10k", |b| {
        let mut store = MembershipStore::new(10_000, 7).unwrap();
        store.anonymization_noise(300);
        let text = store.compress();
        b.iter(|| black_box(MembershipStore::decompress(&text, 10_000, 7).unwrap()));
    });

    group.finish();
}

// ============================================================================
// Fingerprint Benchmarks
// ============================================================================

fn bench_fingerprint(c: &mut Criterion) {
    let mut group = c.benchmark_group("fingerprint");
    group.throughput(Throughput::Elements(1));

    let elements = vec![
        InformationElement::VhtCapabilities {
            info: Some(r"'\x92\x01\x80\x03\xfa\xff\x00\x00\xfa\xff\x00\x00'".into()),
        },
        InformationElement::ExtendedCapabilities {
            info: Some(r"'\x00\x00\x08\x04\x00\x00\x00\x40'".into()),
        },
        InformationElement::HtCapabilities {
            fields: vec![
                ("len".into(), "26".into()),
                ("Max_A_MSDU".into(), "1".into()),
                ("A_MPDU_Length".into(), "3".into()),
            ],
        },
        InformationElement::VendorSpecific {
            oui: Some("Microsoft Corp. (00:50:f2)".into()),
            info: Some(r"'\x08\x00\x10\x00'".into()),
        },
    ];

    group.bench_function("extract_frame", |b| {
        b.iter(|| black_box(extract(black_box(&elements))));
    });

    group.finish();
}

// ============================================================================
// Clustering Benchmarks
// ============================================================================

fn grid(count: usize) -> Vec<FingerprintVector> {
    (0..count)
        .map(|i| {
            let group = (i % 4) as f64 * 100.0;
            FingerprintVector::new(group + (i % 7) as f64, group, 29.0, (i % 3) as f64)
        })
        .collect()
}

fn bench_clustering(c: &mut Criterion) {
    let mut group = c.benchmark_group("clustering");

    for size in [100, 500] {
        let points = grid(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("dbscan_{}", size), |b| {
            let dbscan = Dbscan::new(5.0, 5, Metric::Euclidean);
            b.iter(|| black_box(dbscan.fit(&points).unwrap()));
        });

        group.bench_function(format!("optics_{}", size), |b| {
            let optics = Optics::new(5, Metric::Euclidean);
            b.iter(|| black_box(optics.fit(&points).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_membership, bench_fingerprint, bench_clustering);
criterion_main!(benches);
