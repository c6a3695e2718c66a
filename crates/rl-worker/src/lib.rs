//! `rl-worker`: runs the roadline engine on a dedicated background thread.
//!
//! The interactive front end never blocks on a graph build, a route search or
//! a full-line validation.  It submits a [`Job`] and gets back a [`Ticket`];
//! progress arrives separately on [`RouteWorker::progress`].
//!
//! ```ignore
//! let worker = RouteWorker::spawn(EngineConfig::default())?;
//! worker.submit(Job::LoadRoads { features, filter: LayerFilter::ALL }).wait()?;
//! let ticket = worker.submit(Job::ShortestPath { start, end });
//! match ticket.wait()? {
//!     Outcome::Path(p) => println!("{} m", p.distance),
//!     other => println!("{other:?}"),
//! }
//! ```
//!
//! # Supersession
//!
//! Only the most recent query matters.  Submitting a query (anything but
//! `LoadRoads`) or calling [`RouteWorker::cancel`] makes every earlier query
//! stale: a stale query that has not started is answered with
//! [`Outcome::Cancelled`], and one that is running stops at its next progress
//! check.  Results that still arrive late can be filtered with
//! [`RouteWorker::is_current`] / [`RouteWorker::accept`].

pub mod error;
pub mod job;
pub mod worker;

#[cfg(test)]
mod tests;

pub use error::{WorkerError, WorkerResult};
pub use job::{Job, Outcome, RequestId, WorkerProgress};
pub use worker::{RouteWorker, Ticket};
