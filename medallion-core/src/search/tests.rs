// ============================================================================
// medallion-core/src/search/tests.rs
// ============================================================================
//
// Tests for the search controller, driven by synthetic size functions.

use super::controller::*;
use crate::config::QualityBounds;
use crate::error::CoreError;

use proptest::prelude::*;
use std::collections::BTreeSet;
use std::path::PathBuf;

const MIB: u64 = 1024 * 1024;

struct Run {
    tried: Vec<u32>,
    best: Candidate,
    note: AttainmentNote,
}

fn artifact(quality: u32) -> PathBuf {
    PathBuf::from(format!(".badge.tmp_q{quality}.webp"))
}

/// Drives a controller to completion, checking that exactly the committed
/// artifact is left outstanding.
fn drive(mut controller: SearchController, size: impl Fn(u32) -> u64) -> Run {
    let mut outstanding = BTreeSet::new();
    let mut quality = controller.start();
    let mut tried = vec![quality];

    loop {
        outstanding.insert(artifact(quality));
        let transition = controller
            .advance(AttemptOutcome::Success {
                size_bytes: size(quality),
                artifact: artifact(quality),
            })
            .unwrap();
        if let Some(discard) = &transition.discard {
            assert!(outstanding.remove(discard), "discarded unknown {discard:?}");
        }
        match transition.next {
            Next::Launch(next) => {
                assert!(!tried.contains(&next), "quality {next} tried twice");
                tried.push(next);
                quality = next;
            }
            Next::Commit { best, note } => {
                assert_eq!(controller.best(), Some(&best));
                assert_eq!(outstanding.len(), 1);
                assert!(outstanding.contains(&best.artifact));
                return Run { tried, best, note };
            }
            Next::Abort { reason } => panic!("unexpected abort: {reason}"),
        }
    }
}

fn controller(target: u64, min: u32, max: u32, max_attempts: u32) -> SearchController {
    SearchController::new(target, QualityBounds::new(min, max).unwrap(), max_attempts).unwrap()
}

#[test]
fn test_refine_finds_largest_fitting_quality() {
    // 8 MB at q100, 80 KB at q1
    let run = drive(controller(5 * MIB, 1, 100, 12), |q| u64::from(q) * 80_000);

    assert_eq!(&run.tried[..2], &[100, 1]);
    assert_eq!(run.best.quality, 65);
    assert_eq!(run.best.size_bytes, 5_200_000);
    assert_eq!(run.note, AttainmentNote::Met);
}

#[test]
fn test_ceiling_fits_in_one_attempt() {
    let run = drive(controller(5 * MIB, 1, 100, 12), |_| 3_000_000);

    assert_eq!(run.tried, vec![100]);
    assert_eq!(run.best.quality, 100);
    assert_eq!(run.note, AttainmentNote::MetAtCeiling);
    assert_eq!(run.note.to_string(), "target met at ceiling quality");
}

#[test]
fn test_floor_too_large_commits_floor() {
    let run = drive(controller(5 * MIB, 1, 100, 12), |_| 7_000_000);

    assert_eq!(run.tried, vec![100, 1]);
    assert_eq!(run.best.quality, 1);
    assert_eq!(run.note, AttainmentNote::Unattainable);
    assert!(run.note.to_string().starts_with("target unattainable"));
}

#[test]
fn test_single_quality_range_stops_after_probe_high() {
    for size in [1_000, 10 * MIB] {
        let run = drive(controller(5 * MIB, 50, 50, 12), |_| size);
        assert_eq!(run.tried, vec![50]);
        assert_eq!(run.best.quality, 50);
    }
}

#[test]
fn test_adjacent_probes_skip_refine() {
    let run = drive(controller(1_000, 1, 2, 12), |q| u64::from(q) * 600);

    assert_eq!(run.tried, vec![2, 1]);
    assert_eq!(run.best.quality, 1);
    assert_eq!(run.note, AttainmentNote::Met);
}

#[test]
fn test_attempt_cap_bounds_refine() {
    let run = drive(controller(5 * MIB, 1, 100, 3), |q| u64::from(q) * 60_000);

    assert_eq!(run.tried.len(), 2 + 3);
    assert_eq!(run.note, AttainmentNote::AttemptsExhausted);
    assert!(run.best.size_bytes <= 5 * MIB);
}

#[test]
fn test_zero_attempt_cap_keeps_floor_probe() {
    let run = drive(controller(5 * MIB, 1, 100, 0), |q| u64::from(q) * 60_000);

    assert_eq!(run.tried, vec![100, 1]);
    assert_eq!(run.best.quality, 1);
    assert_eq!(run.note, AttainmentNote::AttemptsExhausted);
}

#[test]
fn test_failure_aborts_and_finishes() {
    let mut search = controller(5 * MIB, 1, 100, 12);
    assert_eq!(search.start(), 100);
    let transition = search
        .advance(AttemptOutcome::Success { size_bytes: 8 * MIB, artifact: artifact(100) })
        .unwrap();
    assert_eq!(transition.next, Next::Launch(1));

    let transition = search
        .advance(AttemptOutcome::Failure { diagnostic: "Conversion failed!".to_string() })
        .unwrap();
    assert_eq!(transition.next, Next::Abort { reason: "Conversion failed!".to_string() });
    assert!(matches!(search.phase(), SearchPhase::Failed { .. }));

    let again = search.advance(AttemptOutcome::Success { size_bytes: 1, artifact: artifact(1) });
    assert!(matches!(again, Err(CoreError::SearchFinished)));
}

#[test]
fn test_best_and_refine_count_follow_the_phases() {
    let mut search = controller(5 * MIB, 1, 100, 12);
    assert_eq!(search.target_bytes(), 5 * MIB);
    search.start();

    // Over budget at the ceiling: nothing kept yet.
    search
        .advance(AttemptOutcome::Success { size_bytes: 8 * MIB, artifact: artifact(100) })
        .unwrap();
    assert_eq!(search.best(), None);
    assert_eq!(search.refine_attempts(), 0);

    // The floor is kept unconditionally, then Refine starts at the midpoint.
    let transition = search
        .advance(AttemptOutcome::Success { size_bytes: 80_000, artifact: artifact(1) })
        .unwrap();
    assert_eq!(transition.next, Next::Launch(50));
    assert_eq!(search.best().map(|b| b.quality), Some(1));
    assert_eq!(search.refine_attempts(), 1);
    assert_eq!(search.phase(), &SearchPhase::Refine { low: 2, high: 99 });

    // A fitting midpoint replaces the floor, which is discarded.
    let transition = search
        .advance(AttemptOutcome::Success { size_bytes: 4 * MIB, artifact: artifact(50) })
        .unwrap();
    assert_eq!(transition.discard, Some(artifact(1)));
    assert_eq!(search.best().map(|b| b.quality), Some(50));
    assert_eq!(search.refine_attempts(), 2);
}

#[test]
fn test_advance_without_start_is_rejected() {
    let mut search = controller(5 * MIB, 1, 100, 12);
    let result = search.advance(AttemptOutcome::Success { size_bytes: 1, artifact: artifact(1) });
    assert!(matches!(result, Err(CoreError::SearchFinished)));
}

#[test]
fn test_zero_target_rejected() {
    let bounds = QualityBounds::new(1, 100).unwrap();
    assert!(SearchController::new(0, bounds, 12).is_err());
}

fn ceil_log2(n: u32) -> u32 {
    u32::BITS - (n - 1).leading_zeros()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    // With size strictly increasing in quality, the search commits the largest
    // fitting quality (or the floor when nothing fits) within
    // ceil(log2(range)) + 2 attempts.
    #[test]
    fn monotone_size_converges_to_maximal_quality(
        min in 0u32..=60,
        span in 0u32..=40,
        target in 1u64..=110_000,
    ) {
        let max = (min + span).min(100);
        let size = |q: u32| u64::from(q + 1) * 1_000;

        let run = drive(controller(target, min, max, 12), size);

        let expected = (min..=max).rev().find(|&q| size(q) <= target).unwrap_or(min);
        prop_assert_eq!(run.best.quality, expected);
        prop_assert!(run.tried.len() as u32 <= ceil_log2(max - min + 1) + 2);
        if size(min) > target {
            prop_assert_eq!(run.note, AttainmentNote::Unattainable);
        } else {
            prop_assert!(run.best.size_bytes <= target);
            if expected < max {
                prop_assert!(size(expected + 1) > target);
            }
        }
    }

    #[test]
    fn total_attempts_never_exceed_cap(
        max_attempts in 0u32..=8,
        target in 1u64..=110_000,
    ) {
        let run = drive(controller(target, 1, 100, max_attempts), |q| u64::from(q) * 1_000);
        prop_assert!(run.tried.len() as u32 <= 2 + max_attempts);
    }
}
