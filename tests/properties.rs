//! Invariants that must hold for arbitrary inputs.

use artificial_retina::{
    config::TrackingConfig,
    tracking::{HistoryBuffer, Looming, MotionEstimate, TemporalTracker},
    vision::{BackgroundModel, BoundingBox, Point},
};
use image::{GrayImage, Luma};
use proptest::prelude::*;
use std::time::{Duration, Instant};

fn gray_image() -> impl Strategy<Value = GrayImage> {
    (1u32..24, 1u32..24).prop_flat_map(|(w, h)| {
        prop::collection::vec(any::<u8>(), (w * h) as usize)
            .prop_map(move |pixels| GrayImage::from_raw(w, h, pixels).unwrap())
    })
}

/// One tracker step: `None` means the cycle had no focus.
fn step() -> impl Strategy<Value = (u64, Option<(u32, u32, f64)>)> {
    (
        0u64..80,
        prop::option::weighted(0.8, (0u32..640, 0u32..480, 0.0f64..50_000.0)),
    )
}

proptest! {
    #[test]
    fn prop_history_never_exceeds_capacity(
        capacity in 1usize..10,
        values in prop::collection::vec(any::<i32>(), 0..40),
    ) {
        let mut buffer = HistoryBuffer::with_capacity(capacity);
        for &value in &values {
            buffer.push(value);
            prop_assert!(buffer.len() <= capacity);
        }

        let kept = values.len().min(capacity);
        let expected: Vec<i32> = values[values.len() - kept..].to_vec();
        prop_assert_eq!(buffer.iter().copied().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn prop_self_difference_is_empty(frame in gray_image(), iterations in 0u8..5) {
        let mut model = BackgroundModel::new(0.0, 30, iterations);
        model.seed(&frame);
        let mask = model.update_and_diff(&frame).unwrap();
        prop_assert!(mask.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn prop_mask_is_binary(
        first in gray_image(),
        alpha in 0.0f32..=1.0,
        threshold in any::<u8>(),
    ) {
        let mut model = BackgroundModel::new(alpha, threshold, 1);
        let second = GrayImage::from_fn(first.width(), first.height(), |x, y| {
            Luma([first.get_pixel(x, y).0[0].wrapping_add(97)])
        });
        model.seed(&first);
        let mask = model.update_and_diff(&second).unwrap();
        prop_assert!(mask.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
    }

    #[test]
    fn prop_tracker_invariants(steps in prop::collection::vec(step(), 1..60)) {
        let config = TrackingConfig::default();
        let start = Instant::now();
        let mut tracker = TemporalTracker::new(&config, start);
        let mut now = start;

        for (dt_ms, observation) in steps {
            now += Duration::from_millis(dt_ms);
            match observation {
                Some((x, y, area)) => {
                    let estimate = tracker.update(Point::new(x, y), area, now);
                    prop_assert!(estimate.speed() >= 0.0);
                    prop_assert!(estimate.speed().is_finite());
                    if let MotionEstimate::Measured { looming, .. } = estimate {
                        prop_assert!(matches!(
                            looming,
                            Looming::Stationary | Looming::Approaching | Looming::Receding
                        ));
                    }
                }
                None => {
                    tracker.clear();
                    prop_assert!(tracker.positions().is_empty());
                    prop_assert!(tracker.areas().is_empty());
                }
            }
            prop_assert!(tracker.positions().len() <= config.history_length);
            prop_assert_eq!(tracker.positions().len(), tracker.areas().len());
        }
    }

    #[test]
    fn prop_constant_observations_settle(
        x in 0u32..640,
        y in 0u32..480,
        area in 1.0f64..100_000.0,
        dt_ms in 1u64..200,
    ) {
        let config = TrackingConfig::default();
        let start = Instant::now();
        let mut tracker = TemporalTracker::new(&config, start);

        let mut estimate = MotionEstimate::Static;
        for i in 1..=config.history_length as u32 {
            estimate = tracker.update(Point::new(x, y), area, start + Duration::from_millis(dt_ms) * i);
        }
        prop_assert_eq!(estimate.speed(), 0.0);
        prop_assert_eq!(estimate.looming(), Some(Looming::Stationary));
    }

    #[test]
    fn prop_doubling_scale_doubles_box(
        x in 0u32..1000,
        y in 0u32..1000,
        w in 0u32..1000,
        h in 0u32..1000,
    ) {
        let scaled = BoundingBox::new(x, y, w, h).scale(2.0, 2.0);
        prop_assert_eq!(scaled, BoundingBox::new(2 * x, 2 * y, 2 * w, 2 * h));
    }
}
