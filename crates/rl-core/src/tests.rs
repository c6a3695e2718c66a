//! Unit tests for rl-core primitives.

#[cfg(test)]
mod ids {
    use crate::{EdgeId, FeatureId, NodeId};

    #[test]
    fn index_roundtrip() {
        let id = NodeId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(NodeId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn invalid_sentinels() {
        assert_eq!(NodeId::INVALID.0, u32::MAX);
        assert_eq!(EdgeId::default(), EdgeId::INVALID);
        assert!(!FeatureId::INVALID.is_valid());
        assert!(FeatureId(0).is_valid());
    }

    #[test]
    fn display() {
        assert_eq!(NodeId(7).to_string(), "NodeId(7)");
    }
}

#[cfg(test)]
mod geo {
    use crate::geo::{
        closest_point_on_segment, distance, distance_to_segment, interior_samples, interpolate,
        polyline_length,
    };
    use crate::Coord;

    fn c(x: f64, y: f64) -> Coord {
        Coord::new(x, y)
    }

    #[test]
    fn euclidean_distance() {
        assert_eq!(distance(c(0.0, 0.0), c(3.0, 4.0)), 5.0);
        assert_eq!(distance(c(1.0, 1.0), c(1.0, 1.0)), 0.0);
    }

    #[test]
    fn projection_inside_segment() {
        let p = closest_point_on_segment(c(5.0, 3.0), c(0.0, 0.0), c(10.0, 0.0));
        assert_eq!(p, c(5.0, 0.0));
    }

    #[test]
    fn projection_clamps_to_endpoints() {
        // Beyond s2 on the infinite line: must clamp, not extrapolate.
        let p = closest_point_on_segment(c(15.0, 2.0), c(0.0, 0.0), c(10.0, 0.0));
        assert_eq!(p, c(10.0, 0.0));
        let q = closest_point_on_segment(c(-4.0, -1.0), c(0.0, 0.0), c(10.0, 0.0));
        assert_eq!(q, c(0.0, 0.0));
    }

    #[test]
    fn degenerate_segment_returns_start() {
        let s = c(2.0, 2.0);
        assert_eq!(closest_point_on_segment(c(9.0, 9.0), s, s), s);
        assert_eq!(distance_to_segment(c(5.0, 6.0), s, s), 5.0);
    }

    #[test]
    fn distance_to_segment_perpendicular() {
        let d = distance_to_segment(c(50.0, 7.0), c(0.0, 0.0), c(100.0, 0.0));
        assert!((d - 7.0).abs() < 1e-12);
    }

    #[test]
    fn interpolation_endpoints() {
        let a = c(0.0, 0.0);
        let b = c(10.0, -20.0);
        assert_eq!(interpolate(a, b, 0.0), a);
        assert_eq!(interpolate(a, b, 1.0), b);
        assert_eq!(interpolate(a, b, 0.5), c(5.0, -10.0));
    }

    #[test]
    fn interior_samples_are_strictly_between() {
        let a = c(0.0, 0.0);
        let b = c(100.0, 0.0);
        let pts: Vec<_> = interior_samples(a, b, 4).collect();
        assert_eq!(pts, vec![c(25.0, 0.0), c(50.0, 0.0), c(75.0, 0.0)]);
        assert_eq!(interior_samples(a, b, 1).count(), 0);
        assert_eq!(interior_samples(a, b, 0).count(), 0);
    }

    #[test]
    fn polyline_length_sums_segments() {
        assert_eq!(polyline_length(&[c(0.0, 0.0), c(3.0, 4.0), c(3.0, 10.0)]), 11.0);
        assert_eq!(polyline_length(&[c(1.0, 1.0)]), 0.0);
    }
}

#[cfg(test)]
mod road {
    use crate::road::eligible;
    use crate::{LayerFilter, RoadClass, RoadFeature};

    #[test]
    fn route_number_classification() {
        assert_eq!(RoadClass::from_route_number(Some(1)), RoadClass::National);
        assert_eq!(RoadClass::from_route_number(Some(99)), RoadClass::National);
        assert_eq!(RoadClass::from_route_number(Some(100)), RoadClass::Departmental);
        assert_eq!(RoadClass::from_route_number(Some(0)), RoadClass::Departmental);
        assert_eq!(RoadClass::from_route_number(None), RoadClass::Departmental);
    }

    #[test]
    fn segments_of_short_feature_are_empty() {
        let f = RoadFeature::from_points(0, &[[1.0, 1.0]]);
        assert!(!f.is_line());
        assert_eq!(f.segments().count(), 0);
    }

    #[test]
    fn layer_filter_selects_by_class() {
        let roads = vec![
            RoadFeature::from_points(0, &[[0.0, 0.0], [1.0, 0.0]]).with_class(RoadClass::National),
            RoadFeature::from_points(1, &[[0.0, 1.0], [1.0, 1.0]]),
        ];
        let national_only = LayerFilter { national: true, departmental: false };
        let picked = eligible(&roads, national_only);
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].class, RoadClass::National);

        assert_eq!(eligible(&roads, LayerFilter::ALL).len(), 2);
        assert!(eligible(&roads, LayerFilter::NONE).is_empty());
        assert!(LayerFilter::NONE.is_empty());
    }
}

#[cfg(test)]
mod config {
    use crate::{ConformanceMode, ConformanceParams, EngineConfig};

    #[test]
    fn defaults_are_valid() {
        let cfg = EngineConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.quantization, 0.1);
        assert_eq!(cfg.point_tolerance, 20.0);
    }

    #[test]
    fn final_mode_is_stricter_than_construction() {
        let cfg = EngineConfig::default();
        let live = cfg.params(ConformanceMode::Construction);
        let fin = cfg.params(ConformanceMode::Final);
        assert!(fin.tolerance <= live.tolerance);
        assert!(fin.subdivisions >= live.subdivisions);
    }

    #[test]
    fn rejects_bad_values() {
        let bad_q = EngineConfig { quantization: 0.0, ..EngineConfig::default() };
        assert!(bad_q.validate().is_err());

        let bad_tol = EngineConfig {
            construction: ConformanceParams::new(-1.0, 10),
            ..EngineConfig::default()
        };
        assert!(bad_tol.validate().is_err());

        let bad_samples = EngineConfig {
            final_check: ConformanceParams::new(5.0, 0),
            ..EngineConfig::default()
        };
        assert!(bad_samples.validate().is_err());

        let bad_interval = EngineConfig { progress_interval: 0, ..EngineConfig::default() };
        assert!(bad_interval.validate().is_err());
    }
}

#[cfg(test)]
mod progress {
    use crate::{Phase, ProgressEvent, Throttle};

    #[test]
    fn throttle_emits_every_interval_and_at_end() {
        let mut t = Throttle::new(10, 4);
        let emitted: Vec<_> = (0..10).filter_map(|_| t.step()).collect();
        assert_eq!(emitted, vec![40.0, 80.0, 100.0]);
    }

    #[test]
    fn throttle_zero_interval_is_clamped() {
        let mut t = Throttle::new(3, 0);
        assert_eq!((0..3).filter_map(|_| t.step()).count(), 3);
    }

    #[test]
    fn throttle_batches_cross_interval_boundaries() {
        let mut t = Throttle::new(10, 4);
        assert_eq!(t.step_by(3), None);
        assert_eq!(t.step_by(3), Some(60.0));
        assert_eq!(t.step_by(1), None);
        assert_eq!(t.step_by(3), Some(100.0));
        assert_eq!(t.done(), 10);
    }

    #[test]
    fn empty_throttle_reports_complete() {
        assert_eq!(Throttle::new(0, 10).percent(), 100.0);
    }

    #[test]
    fn event_label_is_human_readable() {
        let e = ProgressEvent { phase: Phase::Searching, percent: 42.4 };
        assert_eq!(e.to_string(), "searching shortest path (42%)");
    }
}
