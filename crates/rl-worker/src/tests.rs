//! Unit tests for rl-worker.

#[cfg(test)]
mod helpers {
    use rl_core::RoadFeature;

    /// Two parallel streets joined at both ends: a 200 x 100 rectangle.
    pub fn block() -> Vec<RoadFeature> {
        vec![
            RoadFeature::from_points(0, &[[0.0, 0.0], [100.0, 0.0], [200.0, 0.0]]),
            RoadFeature::from_points(1, &[[0.0, 100.0], [100.0, 100.0], [200.0, 100.0]]),
            RoadFeature::from_points(2, &[[0.0, 0.0], [0.0, 100.0]]),
            RoadFeature::from_points(3, &[[200.0, 0.0], [200.0, 100.0]]),
        ]
    }
}

// ── Engine state (no thread) ──────────────────────────────────────────────────

#[cfg(test)]
mod engine {
    use std::sync::atomic::AtomicU64;

    use crossbeam_channel::unbounded;

    use rl_core::{Coord, EngineConfig, LayerFilter, Phase, RoadClass};

    use super::helpers::block;
    use crate::worker::{ChannelObserver, EngineState};
    use crate::{Job, Outcome, RequestId};

    #[test]
    fn load_then_route() {
        let (tx, rx) = unbounded();
        let latest = AtomicU64::new(0);
        let mut state = EngineState::new(EngineConfig::default());
        let mut obs = ChannelObserver { id: RequestId(1), tx: &tx, latest: &latest, supersedable: false };

        let loaded = state.execute(Job::LoadRoads { features: block(), filter: LayerFilter::ALL }, &mut obs);
        assert!(matches!(loaded, Outcome::Loaded { nodes: 6, edges: 6, segments: 6 }));
        assert!(rx.try_iter().all(|p| p.id == RequestId(1) && p.event.phase == Phase::BuildingGraph));

        latest.store(2, std::sync::atomic::Ordering::SeqCst);
        let mut obs = ChannelObserver { id: RequestId(2), tx: &tx, latest: &latest, supersedable: true };
        let job = Job::ShortestPath { start: Coord::new(0.0, 0.0), end: Coord::new(200.0, 0.0) };
        match state.execute(job, &mut obs) {
            Outcome::Path(p) => assert_eq!(p.distance, 200.0),
            other => panic!("expected a path, got {other:?}"),
        }
    }

    #[test]
    fn load_honours_layer_filter() {
        let (tx, _rx) = unbounded();
        let latest = AtomicU64::new(0);
        let mut roads = block();
        roads[0].class = RoadClass::National;
        let mut state = EngineState::new(EngineConfig::default());
        let mut obs = ChannelObserver { id: RequestId(1), tx: &tx, latest: &latest, supersedable: false };
        let filter = LayerFilter { national: true, departmental: false };
        let loaded = state.execute(Job::LoadRoads { features: roads, filter }, &mut obs);
        assert!(matches!(loaded, Outcome::Loaded { nodes: 3, edges: 2, segments: 2 }));
    }

    #[test]
    fn superseded_query_is_cancelled_silently() {
        let (tx, rx) = unbounded();
        let latest = AtomicU64::new(0);
        let mut state = EngineState::new(EngineConfig { progress_interval: 1, ..EngineConfig::default() });
        let mut load = ChannelObserver { id: RequestId(1), tx: &tx, latest: &latest, supersedable: false };
        state.execute(Job::LoadRoads { features: block(), filter: LayerFilter::ALL }, &mut load);
        let _ = rx.try_iter().count();

        // A newer query (id 3) exists, so query 2 must not run to completion.
        latest.store(3, std::sync::atomic::Ordering::SeqCst);
        let mut obs = ChannelObserver { id: RequestId(2), tx: &tx, latest: &latest, supersedable: true };
        let job = Job::ShortestPath { start: Coord::new(0.0, 0.0), end: Coord::new(200.0, 100.0) };
        assert!(state.execute(job, &mut obs).is_cancelled());

        let line = Job::Validate {
            candidate: vec![Coord::new(0.0, 0.0), Coord::new(200.0, 0.0)],
            mode:      rl_core::ConformanceMode::Final,
        };
        assert!(state.execute(line, &mut obs).is_cancelled());
        assert_eq!(rx.try_iter().count(), 0, "no progress after supersession");
    }

    #[test]
    fn validation_progress_follows_configured_interval() {
        // 3 points + 2 segments.
        for (interval, expected) in [(1, 5), (256, 1)] {
            let (tx, rx) = unbounded();
            let latest = AtomicU64::new(0);
            let mut state = EngineState::new(EngineConfig { progress_interval: interval, ..EngineConfig::default() });
            let mut load = ChannelObserver { id: RequestId(1), tx: &tx, latest: &latest, supersedable: false };
            state.execute(Job::LoadRoads { features: block(), filter: LayerFilter::ALL }, &mut load);
            let _ = rx.try_iter().count();

            latest.store(2, std::sync::atomic::Ordering::SeqCst);
            let mut obs = ChannelObserver { id: RequestId(2), tx: &tx, latest: &latest, supersedable: true };
            let line = Job::Validate {
                candidate: vec![Coord::new(0.0, 0.0), Coord::new(100.0, 0.0), Coord::new(200.0, 0.0)],
                mode:      rl_core::ConformanceMode::Final,
            };
            assert!(matches!(state.execute(line, &mut obs), Outcome::Validation(r) if r.is_valid));
            let events: Vec<_> = rx.try_iter().collect();
            assert_eq!(events.len(), expected, "interval {interval}");
            assert!(events.iter().all(|p| p.event.phase == Phase::Validating));
        }
    }

    #[test]
    fn load_is_never_superseded() {
        let (tx, _rx) = unbounded();
        let latest = AtomicU64::new(99);
        let mut state = EngineState::new(EngineConfig::default());
        let mut obs = ChannelObserver { id: RequestId(1), tx: &tx, latest: &latest, supersedable: false };
        let loaded = state.execute(Job::LoadRoads { features: block(), filter: LayerFilter::ALL }, &mut obs);
        assert!(matches!(loaded, Outcome::Loaded { .. }));
    }
}

// ── Worker thread ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod worker {
    use rl_conform::Rejection;
    use rl_core::{ConformanceMode, Coord, EngineConfig, LayerFilter, Phase};
    use rl_graph::{EmptyReason, FailureKind, RouteError};

    use super::helpers::block;
    use crate::{Job, Outcome, RequestId, RouteWorker, WorkerError};

    fn path_job() -> Job {
        Job::ShortestPath { start: Coord::new(0.0, 0.0), end: Coord::new(200.0, 100.0) }
    }

    #[test]
    fn rejects_invalid_config() {
        let cfg = EngineConfig { progress_interval: 0, ..EngineConfig::default() };
        assert!(matches!(RouteWorker::spawn(cfg), Err(WorkerError::Config(_))));
    }

    #[test]
    fn queries_before_load_see_no_roads() {
        let worker = RouteWorker::spawn(EngineConfig::default()).unwrap();
        match worker.submit(path_job()).wait().unwrap() {
            Outcome::NoPath(e) => {
                assert_eq!(e, RouteError::EmptyGraph { reason: EmptyReason::NoNodes });
                assert_eq!(e.kind(), FailureKind::EmptyGraph);
            }
            other => panic!("expected NoPath, got {other:?}"),
        }
        let line = Job::Validate {
            candidate: vec![Coord::new(0.0, 0.0), Coord::new(1.0, 0.0)],
            mode:      ConformanceMode::Construction,
        };
        match worker.submit(line).wait().unwrap() {
            Outcome::Validation(r) => assert_eq!(r.rejection, Some(Rejection::NoRoadData)),
            other => panic!("expected a validation, got {other:?}"),
        }
    }

    #[test]
    fn ids_increase_and_answers_arrive() {
        let worker = RouteWorker::spawn(EngineConfig::default()).unwrap();
        let load = worker.submit(Job::LoadRoads { features: block(), filter: LayerFilter::ALL });
        let point = worker.submit(Job::CheckPoint { point: Coord::new(50.0, 10.0) });
        assert!(load.id() < point.id());
        assert!(matches!(load.wait().unwrap(), Outcome::Loaded { .. }));
        match point.wait().unwrap() {
            Outcome::Point(check) => {
                assert!(check.on_road);
                assert_eq!(check.nearest_distance, Some(10.0));
            }
            other => panic!("expected a point check, got {other:?}"),
        }
    }

    #[test]
    fn newest_query_wins() {
        let worker = RouteWorker::spawn(EngineConfig::default()).unwrap();
        worker.submit(Job::LoadRoads { features: block(), filter: LayerFilter::ALL });
        let old = worker.submit(path_job());
        let new = worker.submit(path_job());
        let (old_id, new_id) = (old.id(), new.id());

        assert!(!worker.is_current(old_id));
        assert!(worker.is_current(new_id));

        // The stale query may or may not have started before being
        // superseded; either way its answer is discarded.
        let stale = old.wait().unwrap();
        assert!(matches!(stale, Outcome::Cancelled | Outcome::Path(_)));
        assert!(worker.accept(old_id, stale).is_none());

        let fresh = worker.accept(new_id, new.wait().unwrap());
        match fresh {
            Some(Outcome::Path(p)) => assert_eq!(p.distance, 300.0),
            other => panic!("expected the newest path, got {other:?}"),
        }
    }

    #[test]
    fn concurrent_submits_keep_the_newest_query_current() {
        let worker = RouteWorker::spawn(EngineConfig::default()).unwrap();
        let ids: Vec<RequestId> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    s.spawn(|| {
                        (0..50)
                            .map(|_| worker.submit(Job::CheckPoint { point: Coord::new(0.0, 0.0) }).id())
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles.into_iter().flat_map(|h| h.join().unwrap()).collect()
        });

        let newest = ids.iter().copied().max().unwrap();
        assert!(worker.is_current(newest));
        assert_eq!(ids.iter().filter(|&&id| worker.is_current(id)).count(), 1);

        worker.cancel();
        assert!(!worker.is_current(newest));
    }

    #[test]
    fn cancel_supersedes_without_new_query() {
        let worker = RouteWorker::spawn(EngineConfig::default()).unwrap();
        let ticket = worker.submit(path_job());
        let id = ticket.id();
        worker.cancel();
        assert!(!worker.is_current(id));
        let outcome = ticket.wait().unwrap();
        assert!(worker.accept(id, outcome).is_none());
    }

    #[test]
    fn progress_is_tagged_with_request_id() {
        let cfg = EngineConfig { progress_interval: 1, ..EngineConfig::default() };
        let worker = RouteWorker::spawn(cfg).unwrap();
        let load = worker.submit(Job::LoadRoads { features: block(), filter: LayerFilter::ALL });
        let load_id = load.id();
        load.wait().unwrap();
        let route = worker.submit(path_job());
        let route_id = route.id();
        assert!(matches!(route.wait().unwrap(), Outcome::Path(_)));

        let events: Vec<_> = worker.progress().try_iter().collect();
        assert!(events.iter().any(|p| p.id == load_id && p.event.phase == Phase::BuildingGraph));
        let search: Vec<_> = events.iter().filter(|p| p.id == route_id).collect();
        assert!(!search.is_empty());
        assert!(search.iter().all(|p| p.event.phase == Phase::Searching));
        assert_eq!(search.last().map(|p| p.event.percent), Some(100.0));
    }

    #[test]
    fn ticket_polls_until_answered() {
        let worker = RouteWorker::spawn(EngineConfig::default()).unwrap();
        let ticket = worker.submit(Job::CheckPoint { point: Coord::new(0.0, 0.0) });
        let outcome = loop {
            if let Some(o) = ticket.try_outcome().unwrap() {
                break o;
            }
            std::thread::yield_now();
        };
        assert!(matches!(outcome, Outcome::Point(_)));
    }

    #[test]
    fn display_request_id() {
        assert_eq!(RequestId(12).to_string(), "#12");
    }
}
