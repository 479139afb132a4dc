//! Correctness and invariant tests for probecount
//!
//! These tests verify invariants that cut across modules: the membership
//! store's guarantees, fingerprint determinism, the counting rules and the
//! end-to-end pipeline. They complement the unit tests in each module by
//! focusing on properties that must always hold.
//!
//! Run with: cargo test --test correctness

use probecount::clustering::{ClusterEngine, ClusterLabel, Dbscan, Optics};
use probecount::config::Config;
use probecount::counting::{CountingMethod, RateCounter, ReferenceDeviceProfile, ReferenceTable};
use probecount::fingerprint::{canonical_byte_sum, extract, FingerprintDataset, FingerprintVector};
use probecount::frame::{Frame, InformationElement, MacAddress};
use probecount::math::Metric;
use probecount::membership::{estimate_intersection_cardinality, MembershipStore};
use probecount::traits::ClusteringPrimitive;
use probecount::{Error, Pipeline};

use rand::rngs::StdRng;
use rand::SeedableRng;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// Membership Store
// ============================================================================

mod membership {
    use super::*;
    use proptest::prelude::*;

    /// The absolute invariant: no false negatives, ever.
    #[test]
    fn zero_false_negatives() {
        let mut store = MembershipStore::new(10_000, 7).unwrap();

        let items: Vec<String> = (0..2_000).map(|i| format!("item_{}", i)).collect();
        for item in &items {
            store.add(item.as_bytes());
        }

        for item in &items {
            assert!(
                store.check(item.as_bytes()),
                "FALSE NEGATIVE: '{}' was inserted but check() returned false",
                item
            );
        }
    }

    proptest! {
        #[test]
        fn prop_no_false_negatives(
            first in proptest::collection::vec(any::<u64>(), 1..200),
            later in proptest::collection::vec(any::<u64>(), 0..200),
        ) {
            let mut store = MembershipStore::new(4_096, 5).unwrap();
            for x in &first {
                store.add(&x.to_le_bytes());
            }
            for x in &later {
                store.add(&x.to_le_bytes());
            }
            for x in first.iter().chain(&later) {
                prop_assert!(store.check(&x.to_le_bytes()));
            }
        }

        #[test]
        fn prop_noise_raises_count_exactly(d in 0usize..100, seed in any::<u64>()) {
            let mut store = MembershipStore::new(2_000, 4).unwrap();
            store.add(b"anchor");
            let m_before = store.m();
            let count_before = store.inserted_count();

            store.anonymization_noise_with_rng(d, &mut StdRng::seed_from_u64(seed));

            prop_assert_eq!(store.inserted_count(), count_before + d as u64);
            prop_assert!(store.m() >= m_before);
        }
    }

    #[test]
    fn false_positive_rate_tracks_fill() {
        let mut store = MembershipStore::new(10_000, 7).unwrap();
        for i in 0..1_000 {
            store.add(format!("item_{}", i).as_bytes());
        }

        let expected = store.false_positive_probability();
        let test_count = 100_000;
        let false_positives = (0..test_count)
            .filter(|i| store.check(format!("other_{}", i).as_bytes()))
            .count();
        let actual = false_positives as f64 / test_count as f64;

        assert!(
            (actual - expected).abs() < expected * 0.5,
            "FP rate {:.5} too far from (m/n)^k = {:.5}",
            actual,
            expected
        );
    }

    #[test]
    fn reset_clears_completely() {
        let mut store = MembershipStore::new(1_000, 3).unwrap();
        store.add(b"hello");
        store.anonymization_noise(10);

        store.reset();

        assert_eq!(store.m(), 0);
        assert_eq!(store.inserted_count(), 0);
        assert_eq!(store.estimate_cardinality().unwrap(), 0.0);
        assert!(!store.check(b"hello"));
    }

    #[test]
    fn self_intersection_is_identity() {
        let mut store = MembershipStore::new(5_000, 5).unwrap();
        for i in 0..300 {
            store.add(format!("mac_{}", i).as_bytes());
        }

        let both = store.intersect(&store).unwrap();
        assert!(both.iter_bits().eq(store.iter_bits()));
        assert_eq!(both.m(), store.m());
    }

    #[test]
    fn intersection_requires_same_shape() {
        let a = MembershipStore::new(1_000, 3).unwrap();
        let b = MembershipStore::new(2_000, 3).unwrap();
        let c = MembershipStore::new(1_000, 4).unwrap();

        assert!(matches!(a.intersect(&b), Err(Error::IncompatibleFilter { .. })));
        assert!(matches!(a.intersect(&c), Err(Error::IncompatibleFilter { .. })));
    }

    #[test]
    fn intersection_estimate_recovers_overlap() {
        let mut a = MembershipStore::new(20_000, 5).unwrap();
        let mut b = MembershipStore::new(20_000, 5).unwrap();
        for i in 0..600 {
            a.add(format!("a_{}", i).as_bytes());
        }
        for i in 0..300 {
            b.add(format!("a_{}", i).as_bytes());
        }
        for i in 0..300 {
            b.add(format!("b_{}", i).as_bytes());
        }

        let both = a.intersect(&b).unwrap();
        let overlap = estimate_intersection_cardinality(&a, &b, &both).unwrap();
        assert!((overlap - 300.0).abs() < 90.0, "overlap estimate {}", overlap);
    }

    #[test]
    fn full_store_cardinality_is_singular() {
        let mut store = MembershipStore::new(64, 2).unwrap();
        store.set_bits(&[true; 64]).unwrap();

        assert!(matches!(
            store.estimate_cardinality(),
            Err(Error::NumericalInstability(_))
        ));
    }

    #[test]
    fn compress_roundtrip_patterns() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut noisy = MembershipStore::new(777, 3).unwrap();
        noisy.anonymization_noise_with_rng(50, &mut rng);

        let mut zeros = MembershipStore::new(500, 3).unwrap();
        zeros.set_bits(&[false; 500]).unwrap();
        let mut ones = MembershipStore::new(500, 3).unwrap();
        ones.set_bits(&[true; 500]).unwrap();

        for store in [zeros, ones, noisy] {
            let text = store.compress();
            let restored = MembershipStore::decompress(&text, store.n(), store.k()).unwrap();
            assert!(restored.iter_bits().eq(store.iter_bits()));
            assert_eq!(restored.m(), store.m());
        }
    }

    #[test]
    fn persisted_json_roundtrip() {
        let mut store = MembershipStore::new(1_000, 4).unwrap();
        store.add(b"00:11:22:33:44:55");

        let json = serde_json::to_string(&store.to_persisted()).unwrap();
        let persisted = serde_json::from_str(&json).unwrap();
        let restored = MembershipStore::from_persisted(&persisted).unwrap();

        assert_eq!(restored, store);
        assert!(restored.check(b"00:11:22:33:44:55"));
    }

    #[test]
    fn deniability_in_unit_range() {
        let mut store = MembershipStore::new(10_000, 7).unwrap();
        assert_eq!(store.deniability(), 0.0);

        store.anonymization_noise_with_rng(30, &mut StdRng::seed_from_u64(1));
        for i in 0..100 {
            store.add(format!("mac_{}", i).as_bytes());
        }

        let gamma = store.deniability();
        assert!((0.0..=1.0).contains(&gamma));
    }
}

// ============================================================================
// Fingerprinting
// ============================================================================

mod fingerprint {
    use super::*;

    #[test]
    fn canonical_sum_of_plain_text() {
        assert_eq!(canonical_byte_sum("ab"), Some(195));
    }

    #[test]
    fn extraction_is_deterministic() {
        let elements = vec![
            InformationElement::VhtCapabilities {
                info: Some(r"'\x92\x01\x80\x03'".into()),
            },
            InformationElement::VendorSpecific {
                oui: Some("Broadcom (00:10:18)".into()),
                info: Some(r"\x02\x00\x00".into()),
            },
            InformationElement::VendorSpecific {
                oui: None,
                info: Some("zz".into()),
            },
        ];

        let first = extract(&elements);
        for _ in 0..10 {
            assert_eq!(extract(&elements), first);
        }
        assert_eq!(first.ext(), FingerprintVector::SENTINEL);
        assert_eq!(first.vht(), (0x92 + 0x01 + 0x80 + 0x03) as f64);
    }

    #[test]
    fn malformed_element_never_aborts_frame() {
        let elements = vec![
            InformationElement::VhtCapabilities {
                info: Some(r"\xg1".into()),
            },
            InformationElement::HtCapabilities {
                fields: vec![("len".into(), "26".into())],
            },
        ];

        let fp = extract(&elements);
        assert_eq!(fp.vht(), FingerprintVector::SENTINEL);
        assert_eq!(fp.ht(), 26.0);
    }
}

// ============================================================================
// Clustering
// ============================================================================

mod clustering {
    use super::*;

    fn blobs() -> Vec<FingerprintVector> {
        let mut points = Vec::new();
        for i in 0..10 {
            points.push(FingerprintVector::new(100.0 + i as f64 * 0.1, 8.0, 29.0, 50.0));
        }
        for i in 0..10 {
            points.push(FingerprintVector::new(400.0, 12.0 + i as f64 * 0.1, 40.0, 90.0));
        }
        points.push(FingerprintVector::new(-1.0, -1.0, -1.0, 5_000.0));
        points
    }

    #[test]
    fn primitives_agree_on_separated_blobs() {
        let points = blobs();
        let dbscan = Dbscan::new(1.0, 4, Metric::Euclidean).fit(&points).unwrap();
        let optics = Optics::new(4, Metric::Euclidean).fit(&points).unwrap();

        for labels in [dbscan, optics] {
            assert_eq!(labels.len(), points.len());
            assert!(labels[..10].iter().all(|&l| l == labels[0]));
            assert!(labels[10..20].iter().all(|&l| l == labels[10]));
            assert_ne!(labels[0], labels[10]);
            assert!(!labels[0].is_noise());
            assert_eq!(labels[20], ClusterLabel::Noise);
        }
    }

    #[test]
    fn engine_groups_mac_sets() {
        let points = blobs();
        let mut dataset = FingerprintDataset::new();
        for (i, p) in points.into_iter().enumerate() {
            // five addresses rotate through each blob
            dataset.push(p, MacAddress([0x02, 0, 0, 0, (i / 10) as u8, (i % 5) as u8]));
        }

        let clusters = ClusterEngine::new(Dbscan::new(1.0, 4, Metric::Euclidean))
            .run(&dataset)
            .unwrap();

        assert_eq!(clusters.len(), 2);
        for cluster in &clusters {
            assert_eq!(cluster.size(), 10);
            assert_eq!(cluster.mac_set.len(), 5);
        }
    }
}

// ============================================================================
// Counting
// ============================================================================

mod counting {
    use super::*;

    #[test]
    fn one_device_at_reference_rate() {
        let counter = RateCounter::new(CountingMethod::Advanced, 100.0, 1);
        assert_eq!(counter.estimate_with_rate(150, 150, 5.0, 30.0), 1);
    }

    #[test]
    fn implausible_rate_takes_default() {
        let counter = RateCounter::new(CountingMethod::Advanced, 100.0, 2);
        assert_eq!(counter.estimate_with_rate(10_000, 50, 5.0, 30.0), 2);
    }

    #[test]
    fn never_exceeds_distinct_addresses() {
        let counter = RateCounter::new(CountingMethod::Advanced, 1_000.0, 1);
        for frames in [10, 100, 1_000, 10_000] {
            for macs in 1..6 {
                assert!(counter.estimate_with_rate(frames, macs, 0.1, 30.0) <= macs as u64);
            }
        }
    }
}

// ============================================================================
// Pipeline
// ============================================================================

mod pipeline {
    use super::*;

    fn local_probe(ts: f64, last: u8) -> Frame {
        Frame::probe_request(ts, -45, MacAddress([0x5a, 0x3c, 0, 0, 0, last]))
            .with_element(InformationElement::VhtCapabilities {
                info: Some(r"\x92\x01\x80\x03".into()),
            })
            .with_element(InformationElement::HtCapabilities {
                fields: vec![("len".into(), "26".into())],
            })
    }

    fn global_probe(ts: f64, last: u8) -> Frame {
        Frame::probe_request(ts, -45, MacAddress([0x00, 0x1b, 0x63, 0, 0, last]))
    }

    fn capture() -> Vec<Frame> {
        let mut frames: Vec<Frame> = (0..3).map(|i| global_probe(i as f64, i)).collect();
        frames.extend((0..7).map(|i| local_probe(3.0 + i as f64, i)));
        frames
    }

    #[test]
    fn end_to_end_simple_count() {
        init_tracing();
        let config = Config {
            min_samples: 5,
            min_percentage: 0.02,
            counting_method: CountingMethod::Simple,
            ..Config::default()
        };
        let pipeline = Pipeline::from_config(config, ReferenceTable::default()).unwrap();
        let mut store = pipeline.prepare_store().unwrap();

        let report = pipeline.run(capture(), &mut store).unwrap();

        assert_eq!(report.global_devices, 3);
        assert_eq!(report.local_devices, 1);
        assert_eq!(report.total_devices, 4);
        assert_eq!(report.processed_frames, 10);
        assert_eq!(report.clusters, 1);
        assert_eq!(report.capture_window, 9.0);

        for i in 0..3 {
            let mac = MacAddress([0x00, 0x1b, 0x63, 0, 0, i]);
            assert!(store.check(mac.to_string().as_bytes()));
        }
        // 30 decoys, 3 global addresses, 1 cluster mean
        assert_eq!(store.inserted_count(), 34);
    }

    #[test]
    fn end_to_end_dbscan_matches_optics() {
        init_tracing();
        let config = Config {
            min_samples: 5,
            cluster_method: probecount::clustering::ClusterMethod::Dbscan,
            epsilon: 0.5,
            ..Config::default()
        };
        let pipeline = Pipeline::from_config(config, ReferenceTable::default()).unwrap();
        let mut store = pipeline.prepare_store().unwrap();

        let report = pipeline.run(capture(), &mut store).unwrap();
        assert_eq!(report.total_devices, 4);
    }

    #[test]
    fn end_to_end_advanced_count() {
        init_tracing();
        let prototype = extract(&local_probe(0.0, 0).elements);
        let table = ReferenceTable::new(vec![ReferenceDeviceProfile::new("phone", prototype, 0.1)]);
        let config = Config {
            min_samples: 5,
            counting_method: CountingMethod::Advanced,
            ..Config::default()
        };
        let pipeline = Pipeline::from_config(config, table).unwrap();
        let mut store = pipeline.prepare_store().unwrap();

        // 7 frames over 9 s at 0.1/s: round(7 / 0.9) = 8, capped by 7 addresses
        let report = pipeline.run(capture(), &mut store).unwrap();
        assert_eq!(report.local_devices, 7);
        assert_eq!(report.total_devices, 10);
    }

    #[test]
    fn advanced_count_requires_reference_table() {
        let config = Config {
            min_samples: 5,
            counting_method: CountingMethod::Advanced,
            ..Config::default()
        };
        let pipeline = Pipeline::from_config(config, ReferenceTable::default()).unwrap();
        let mut store = pipeline.prepare_store().unwrap();

        assert!(matches!(
            pipeline.run(capture(), &mut store),
            Err(Error::EmptyReferenceTable)
        ));
    }

    #[test]
    fn empty_capture_counts_nothing() {
        let pipeline = Pipeline::from_config(Config::default(), ReferenceTable::default()).unwrap();
        let mut store = pipeline.prepare_store().unwrap();

        let report = pipeline.run(Vec::new(), &mut store).unwrap();
        assert_eq!(report.total_devices, 0);
        assert_eq!(report.capture_window, 0.0);
    }

    #[test]
    fn report_serializes() {
        let pipeline = Pipeline::from_config(
            Config {
                min_samples: 5,
                ..Config::default()
            },
            ReferenceTable::default(),
        )
        .unwrap();
        let mut store = pipeline.prepare_store().unwrap();
        let report = pipeline.run(capture(), &mut store).unwrap();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["total_devices"], 4);
        assert_eq!(json["global_frames"], 3);
    }
}
