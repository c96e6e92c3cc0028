//! Execution metrics and the per-expansion inspection hook.

use std::fmt;
use std::time::{Duration, Instant};

use log::{debug, trace};

use crate::cost::Cost;

/// Counters and timers collected while a search runs.
#[derive(Debug, Clone, Default)]
pub struct Metrics {
    explored: usize,
    started: Option<Instant>,
    finished: Option<Instant>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one expansion. The clock starts at the first one.
    pub fn on_node_explored(&mut self) {
        if self.started.is_none() {
            self.started = Some(Instant::now());
        }
        self.explored += 1;
    }

    pub fn on_execution_end(&mut self) {
        self.finished = Some(Instant::now());
    }

    pub fn explored(&self) -> usize {
        self.explored
    }

    /// Time between the first expansion and the end of the run,
    /// or until now if the run has not ended.
    pub fn elapsed(&self) -> Duration {
        match (self.started, self.finished) {
            (Some(start), Some(end)) => end.saturating_duration_since(start),
            (Some(start), None) => start.elapsed(),
            (None, _) => Duration::default(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} nodes explored in {:.3}ms",
            self.explored,
            self.elapsed().as_secs_f64() * 1000.0
        )
    }
}

type Inspector<'a, N> = Box<dyn FnMut(&N, &Cost) + 'a>;

/// Wraps [Metrics] with an optional inspection callback and
/// periodic progress logging.
pub struct Observer<'a, N> {
    name: &'static str,
    metrics: Metrics,
    inspector: Option<Inspector<'a, N>>,
    progress: usize,
}

impl<'a, N> Observer<'a, N>
where
    N: fmt::Debug,
{
    pub fn new(name: &'static str, progress: usize) -> Self {
        Self {
            name,
            metrics: Metrics::new(),
            inspector: None,
            progress,
        }
    }

    pub fn set_inspector<F>(&mut self, inspector: F)
    where
        F: FnMut(&N, &Cost) + 'a,
    {
        self.inspector = Some(Box::new(inspector));
    }

    pub fn set_progress(&mut self, progress: usize) {
        self.progress = progress;
    }

    /// Called once for every expansion.
    pub fn explore(&mut self, vertex: &N, cost: &Cost, frontier: usize) {
        self.metrics.on_node_explored();
        trace!("{}: expanding {:?} at {}", self.name, vertex, cost);

        if let Some(inspector) = self.inspector.as_mut() {
            inspector(vertex, cost);
        }

        let n = self.metrics.explored();
        if self.progress > 0 && n % self.progress == 0 {
            debug!(
                "{}: Q{} N{} {:?} {}",
                self.name, frontier, n, vertex, cost
            );
        }
    }

    pub fn start(&mut self) {
        self.metrics.reset();
    }

    pub fn finish(&mut self) {
        self.metrics.on_execution_end();
        debug!("{}: {}", self.name, self.metrics);
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}

impl<'a, N> fmt::Debug for Observer<'a, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observer")
            .field("name", &self.name)
            .field("metrics", &self.metrics)
            .field("inspector", &self.inspector.is_some())
            .field("progress", &self.progress)
            .finish()
    }
}
