//! The background engine thread and its handle.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, unbounded, Receiver, Sender, TryRecvError};
use tracing::{debug, info, info_span, warn};

use rl_conform::RoadIndex;
use rl_core::road::eligible;
use rl_core::{EngineConfig, ProgressEvent, ProgressObserver, RoadFeature};
use rl_graph::{build_graph, shortest_path, RoadGraph, RouteError};

use crate::{Job, Outcome, RequestId, WorkerError, WorkerProgress, WorkerResult};

const THREAD_NAME: &str = "roadline-engine";

enum Message {
    Run {
        id:    RequestId,
        job:   Job,
        reply: Sender<Outcome>,
    },
    Shutdown,
}

// ── Ticket ────────────────────────────────────────────────────────────────────

/// Handle to the eventual [`Outcome`] of one submitted job.
#[derive(Debug)]
pub struct Ticket {
    id: RequestId,
    rx: Receiver<Outcome>,
}

impl Ticket {
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Block until the worker answers.
    pub fn wait(self) -> WorkerResult<Outcome> {
        self.rx.recv().map_err(|_| WorkerError::Disconnected)
    }

    /// `Ok(None)` while the job is still queued or running.
    pub fn try_outcome(&self) -> WorkerResult<Option<Outcome>> {
        match self.rx.try_recv() {
            Ok(outcome) => Ok(Some(outcome)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(WorkerError::Disconnected),
        }
    }
}

// ── RouteWorker ───────────────────────────────────────────────────────────────

/// Owns the engine thread.  Dropping it stops the thread after the jobs
/// already queued (stale queries among them are answered as cancelled).
pub struct RouteWorker {
    tx:          Sender<Message>,
    progress_rx: Receiver<WorkerProgress>,
    /// Id of the most recent query; 0 before the first one.
    latest:      Arc<AtomicU64>,
    next_id:     AtomicU64,
    handle:      Option<JoinHandle<()>>,
}

impl RouteWorker {
    /// Validate `config` and start the engine thread with an empty road set.
    pub fn spawn(config: EngineConfig) -> WorkerResult<Self> {
        config.validate()?;

        let (tx, rx) = unbounded();
        let (progress_tx, progress_rx) = unbounded();
        let latest = Arc::new(AtomicU64::new(0));

        let thread_latest = Arc::clone(&latest);
        let handle = thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || run(rx, progress_tx, thread_latest, config))
            .map_err(WorkerError::Spawn)?;

        info!(thread = THREAD_NAME, "route worker started");
        Ok(Self {
            tx,
            progress_rx,
            latest,
            next_id: AtomicU64::new(1),
            handle: Some(handle),
        })
    }

    /// Queue `job`.  If the worker is gone the ticket reports
    /// [`WorkerError::Disconnected`].
    pub fn submit(&self, job: Job) -> Ticket {
        let id = RequestId(self.next_id.fetch_add(1, Ordering::SeqCst));
        if job.is_query() {
            // Concurrent submitters may get here out of id order.
            self.latest.fetch_max(id.0, Ordering::SeqCst);
        }
        debug!(%id, kind = job.kind(), "job submitted");

        let (reply, rx) = bounded(1);
        if self.tx.send(Message::Run { id, job, reply }).is_err() {
            warn!(%id, "route worker is gone; job dropped");
        }
        Ticket { id, rx }
    }

    /// Supersede every pending query without submitting a new one.
    pub fn cancel(&self) {
        let fence = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.latest.fetch_max(fence, Ordering::SeqCst);
    }

    /// `true` if `id` is the most recent query.
    pub fn is_current(&self, id: RequestId) -> bool {
        self.latest.load(Ordering::SeqCst) == id.0
    }

    /// Pass `outcome` through only if `id` is still the most recent query.
    pub fn accept(&self, id: RequestId, outcome: Outcome) -> Option<Outcome> {
        if self.is_current(id) {
            Some(outcome)
        } else {
            debug!(%id, "discarding stale outcome");
            None
        }
    }

    /// Progress of every job, tagged with its id.
    pub fn progress(&self) -> &Receiver<WorkerProgress> {
        &self.progress_rx
    }
}

impl Drop for RouteWorker {
    fn drop(&mut self) {
        self.cancel();
        // A failed send means the thread already exited.
        let _ = self.tx.send(Message::Shutdown);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("route worker thread panicked");
            }
        }
    }
}

// ── Engine thread ─────────────────────────────────────────────────────────────

/// Forwards progress to the shared channel and cancels once a newer query
/// has been submitted.
pub(crate) struct ChannelObserver<'a> {
    pub(crate) id:           RequestId,
    pub(crate) tx:           &'a Sender<WorkerProgress>,
    pub(crate) latest:       &'a AtomicU64,
    pub(crate) supersedable: bool,
}

impl ProgressObserver for ChannelObserver<'_> {
    fn on_progress(&mut self, event: &ProgressEvent) {
        if self.is_cancelled() {
            return;
        }
        // Nobody listening is fine.
        let _ = self.tx.send(WorkerProgress { id: self.id, event: *event });
    }

    fn is_cancelled(&self) -> bool {
        self.supersedable && self.latest.load(Ordering::SeqCst) != self.id.0
    }
}

/// Road data owned by the engine thread.  Replaced wholesale on every load.
pub(crate) struct EngineState {
    pub(crate) config: EngineConfig,
    pub(crate) graph:  RoadGraph,
    pub(crate) index:  RoadIndex,
}

impl EngineState {
    pub(crate) fn new(config: EngineConfig) -> Self {
        Self {
            graph: RoadGraph::empty(config.quantization),
            index: RoadIndex::new(std::iter::empty::<&RoadFeature>())
                .with_progress_interval(config.progress_interval),
            config,
        }
    }

    pub(crate) fn execute(&mut self, job: Job, observer: &mut ChannelObserver<'_>) -> Outcome {
        match job {
            Job::LoadRoads { features, filter } => {
                let roads = eligible(&features, filter);
                match build_graph(roads.iter().copied(), &self.config, observer) {
                    Ok(graph) => {
                        self.index = RoadIndex::new(roads.iter().copied())
                            .with_progress_interval(self.config.progress_interval);
                        self.graph = graph;
                        info!(
                            features = roads.len(),
                            nodes = self.graph.node_count(),
                            edges = self.graph.edge_count(),
                            "road data loaded"
                        );
                        Outcome::Loaded {
                            nodes:    self.graph.node_count(),
                            edges:    self.graph.edge_count(),
                            segments: self.index.segment_count(),
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "road load failed; keeping previous roads");
                        Outcome::LoadFailed(e)
                    }
                }
            }
            Job::ShortestPath { start, end } => {
                match shortest_path(&self.graph, start, end, &self.config, observer) {
                    Ok(path) => Outcome::Path(path),
                    Err(RouteError::Cancelled) => Outcome::Cancelled,
                    Err(e) => {
                        debug!(error = %e, "no path");
                        Outcome::NoPath(e)
                    }
                }
            }
            Job::Validate { candidate, mode } => {
                let params = self.config.params(mode);
                match self.index.validate_observed(&candidate, params, observer) {
                    Ok(result) => Outcome::Validation(result),
                    Err(_) => Outcome::Cancelled,
                }
            }
            Job::CheckPoint { point } => {
                Outcome::Point(self.index.check_point(point, self.config.point_tolerance))
            }
        }
    }
}

fn run(
    rx: Receiver<Message>,
    progress_tx: Sender<WorkerProgress>,
    latest: Arc<AtomicU64>,
    config: EngineConfig,
) {
    let mut state = EngineState::new(config);

    for message in rx {
        let (id, job, reply) = match message {
            Message::Run { id, job, reply } => (id, job, reply),
            Message::Shutdown => break,
        };

        let span = info_span!("job", %id, kind = job.kind());
        let _guard = span.enter();

        let mut observer = ChannelObserver {
            id,
            tx: &progress_tx,
            latest: &latest,
            supersedable: job.is_query(),
        };

        let outcome = if observer.is_cancelled() {
            warn!("superseded before start");
            Outcome::Cancelled
        } else {
            let outcome = state.execute(job, &mut observer);
            if outcome.is_cancelled() {
                warn!("superseded while running");
            }
            outcome
        };

        // The caller may have dropped its ticket.
        let _ = reply.send(outcome);
    }

    info!("route worker stopped");
}
