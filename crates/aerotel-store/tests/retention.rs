use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use aerotel_frame::Sample;
use aerotel_store::{SampleStore, DEFAULT_MAX_SAMPLES};
use chrono::{DateTime, TimeDelta, TimeZone, Utc};

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 8, 20, 6, 0, 0).unwrap()
}

fn sample(seq: u32, timestamp: DateTime<Utc>) -> Sample {
    Sample {
        pm1: seq as f32,
        pm25: 0.0,
        pm10: 0.0,
        sum_bins: seq as f32,
        temp: 0.0,
        altitude: 0.0,
        humidity: 0.0,
        xtra: 0.0,
        co2: 0.0,
        timestamp,
        latitude: 0.0,
        longitude: 0.0,
        heading: 0.0,
        clock_substituted: false,
    }
}

#[test]
fn snapshot_all_preserves_append_order() {
    let store = SampleStore::new();
    for seq in 0..250u32 {
        store.append(sample(seq, base() + TimeDelta::seconds((seq % 17) as i64)));
    }

    let seqs: Vec<u32> = store.snapshot_all().iter().map(|s| s.pm1 as u32).collect();
    assert_eq!(seqs, (0..250).collect::<Vec<_>>());
}

#[test]
fn cap_keeps_the_most_recent_samples() {
    // S5: 10 005 samples, 100 ms apart, into a 10 000 sample store.
    let store = SampleStore::new();
    for seq in 0..(DEFAULT_MAX_SAMPLES as u32 + 5) {
        store.append(sample(seq, base() + TimeDelta::milliseconds(seq as i64 * 100)));
    }

    let all = store.snapshot_all();
    assert_eq!(all.len(), DEFAULT_MAX_SAMPLES);
    assert_eq!(all[0].timestamp, base() + TimeDelta::milliseconds(500));
    assert_eq!(all[0].pm1 as u32, 5);
    assert_eq!(
        all.last().unwrap().pm1 as u32,
        DEFAULT_MAX_SAMPLES as u32 + 4
    );
}

#[test]
fn cap_with_small_store() {
    let store = SampleStore::with_capacity(3);
    for seq in 0..10u32 {
        store.append(sample(seq, base()));
    }
    let seqs: Vec<u32> = store.snapshot_all().iter().map(|s| s.pm1 as u32).collect();
    assert_eq!(seqs, vec![7, 8, 9]);
}

#[test]
fn window_returns_recent_samples_only() {
    // S6: t, t+30s, t+90s, t+121s with a 60 s window.
    let store = SampleStore::new();
    for (seq, offset) in [0i64, 30, 90, 121].into_iter().enumerate() {
        store.append(sample(seq as u32, base() + TimeDelta::seconds(offset)));
    }

    let window = store.snapshot(Duration::from_secs(60));
    let seqs: Vec<u32> = window.iter().map(|s| s.pm1 as u32).collect();
    assert_eq!(seqs, vec![2, 3]);
}

#[test]
fn window_matches_threshold_filter() {
    let store = SampleStore::new();
    let offsets: Vec<i64> = (0..200).map(|i| i * 3 + (i % 5)).collect();
    for (seq, offset) in offsets.iter().enumerate() {
        store.append(sample(seq as u32, base() + TimeDelta::seconds(*offset)));
    }
    let latest = store.latest().unwrap().timestamp;

    for window_secs in [0u64, 1, 7, 60, 299, 600, 10_000] {
        let threshold = latest - TimeDelta::seconds(window_secs as i64);
        let expected: Vec<Sample> = store
            .snapshot_all()
            .into_iter()
            .filter(|s| s.timestamp >= threshold)
            .collect();
        assert_eq!(
            store.snapshot(Duration::from_secs(window_secs)),
            expected,
            "window {window_secs}s"
        );
    }
}

#[test]
fn readers_see_appends_from_producer_thread() {
    let store = SampleStore::with_capacity(64);
    let done = Arc::new(AtomicBool::new(false));

    let reader = {
        let store = store.clone();
        let done = Arc::clone(&done);
        std::thread::spawn(move || {
            let mut last_seen = 0u32;
            while !done.load(Ordering::Acquire) {
                if let Some(latest) = store.latest() {
                    let seq = latest.pm1 as u32;
                    assert!(seq >= last_seen, "latest went backwards");
                    last_seen = seq;
                }
                let window = store.snapshot(Duration::from_secs(3600));
                assert!(window.len() <= 64);
                assert!(window
                    .windows(2)
                    .all(|pair| pair[0].pm1 < pair[1].pm1));
            }
        })
    };

    for seq in 1..=2_000u32 {
        store.append(sample(seq, base() + TimeDelta::milliseconds(seq as i64)));
    }
    done.store(true, Ordering::Release);
    reader.join().unwrap();

    assert_eq!(store.latest().unwrap().pm1 as u32, 2_000);
    assert_eq!(store.len(), 64);
}
