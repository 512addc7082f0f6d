use crate::controllers::streaming::call_pool::CallPool;
use crate::controllers::streaming::data::coordinator_config::CoordinatorConfig;
use crate::controllers::streaming::data::frame_data::{
    FrameData, RenderError, RowsDelivered, SessionStarted,
};
use crate::controllers::streaming::data::render_params::RenderParams;
use crate::controllers::streaming::errors::{DeliveryError, NetworkError, ProtocolError};
use crate::controllers::streaming::events::DeliveryEvent;
use crate::controllers::streaming::ports::compute_backend::check_response_shape;
use crate::controllers::streaming::ports::{ComputeBackend, DisplaySink};
use crate::controllers::streaming::session::{RenderSession, SessionSnapshot, WriteOutcome};
use crate::controllers::streaming::throttle::{Throttle, ThrottleDecision};
use crate::core::actions::cancellation::{CancelSignal, CancelToken};
use crate::core::data::frame_buffer::FrameBuffer;
use crate::core::data::render_request::{RenderMode, RenderRequest, ValidationError};
use crate::core::data::rendered_rows::RenderedRows;
use crossbeam_channel::{after, never, select};
use log::{debug, info, trace, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Instant;

struct CoordinatorState {
    generation: u64,
    /// Newest request not yet dispatched; overwritten to coalesce bursts.
    pending: Option<(u64, RenderParams)>,
    session: Option<RenderSession>,
    last_params: Option<RenderParams>,
    throttle: Throttle,
    shutdown: bool,
}

struct SharedState {
    state: Mutex<CoordinatorState>,
    wake: Condvar,
    last_completed_generation: AtomicU64,
    calls: CallPool,
    sink: Arc<dyn DisplaySink>,
    config: CoordinatorConfig,
}

impl SharedState {
    fn lock(&self) -> MutexGuard<'_, CoordinatorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct RenderJob {
    generation: u64,
    method: String,
    request: RenderRequest,
    signal: CancelSignal,
}

enum Job {
    Render(RenderJob),
    Invalid {
        generation: u64,
        error: ValidationError,
    },
}

/// Turns a stream of parameter changes into render sessions.
///
/// Every submitted change gets a new generation and supersedes whatever is in
/// flight. Dispatches are throttled, and changes that arrive inside the
/// throttle window are coalesced so only the newest one is rendered. All
/// events reach the sink from a single worker thread, in order.
pub struct StreamingCoordinator {
    shared: Arc<SharedState>,
    worker: Option<JoinHandle<()>>,
}

impl StreamingCoordinator {
    pub fn new(
        backend: Arc<dyn ComputeBackend>,
        sink: Arc<dyn DisplaySink>,
        config: CoordinatorConfig,
    ) -> Self {
        let shared = Arc::new(SharedState {
            state: Mutex::new(CoordinatorState {
                generation: 0,
                pending: None,
                session: None,
                last_params: None,
                throttle: Throttle::new(config.throttle_interval),
                shutdown: false,
            }),
            wake: Condvar::new(),
            last_completed_generation: AtomicU64::new(0),
            calls: CallPool::new(backend, config.call_threads),
            sink,
            config,
        });

        let worker_shared = Arc::clone(&shared);

        let worker = thread::spawn(move || {
            Self::worker_loop(&worker_shared);
        });

        Self {
            shared,
            worker: Some(worker),
        }
    }

    /// Starts a new logical request and returns its generation.
    pub fn submit(&self, params: RenderParams) -> u64 {
        let generation = {
            let mut state = self.shared.lock();
            Self::supersede(&mut state, params)
        };

        self.shared.wake.notify_one();

        generation
    }

    /// Like [`submit`](Self::submit), but ignores `params` equal to the last
    /// submitted ones.
    pub fn update(&self, params: RenderParams) -> Option<u64> {
        let generation = {
            let mut state = self.shared.lock();
            if state.last_params.as_ref() == Some(&params) {
                trace!("parameters unchanged, no new session");
                return None;
            }
            Self::supersede(&mut state, params)
        };

        self.shared.wake.notify_one();

        Some(generation)
    }

    /// Abandons the current session and any pending request.
    pub fn cancel(&self) {
        let mut state = self.shared.lock();

        if let Some((generation, _)) = state.pending.take() {
            debug!("generation {generation}: dropped before dispatch");
        }
        if let Some(session) = state.session.as_mut() {
            if session.cancel() {
                debug!("generation {}: cancelled", session.generation());
            }
        }
        state.last_params = None;
    }

    #[must_use]
    pub fn current_generation(&self) -> u64 {
        self.shared.lock().generation
    }

    /// Generation of the newest session that ended in a frame or an error.
    #[must_use]
    pub fn last_completed_generation(&self) -> u64 {
        self.shared
            .last_completed_generation
            .load(Ordering::Acquire)
    }

    /// State and buffer of the most recently dispatched session.
    #[must_use]
    pub fn snapshot(&self) -> Option<SessionSnapshot> {
        self.shared.lock().session.as_ref().map(RenderSession::snapshot)
    }

    pub fn shutdown(&mut self) {
        {
            let mut state = self.shared.lock();
            state.shutdown = true;
            state.pending = None;
            if let Some(session) = state.session.as_mut() {
                session.cancel();
            }
        }

        self.shared.wake.notify_all();

        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }

    fn supersede(state: &mut CoordinatorState, params: RenderParams) -> u64 {
        state.generation += 1;
        let generation = state.generation;

        if let Some(session) = state.session.as_mut() {
            if session.cancel() {
                debug!(
                    "generation {}: superseded by {generation}",
                    session.generation()
                );
            }
        }

        if let Some((coalesced, _)) = state.pending.replace((generation, params.clone())) {
            debug!("generation {coalesced}: coalesced into {generation}");
        }
        state.last_params = Some(params);

        generation
    }

    fn worker_loop(shared: &SharedState) {
        while let Some(job) = Self::next_job(shared) {
            match job {
                Job::Render(job) => Self::run_session(shared, &job),
                Job::Invalid { generation, error } => {
                    let is_current = shared.lock().generation == generation;
                    if is_current {
                        Self::surface_error(shared, generation, error.into());
                    } else {
                        debug!("generation {generation}: dropping rejection of superseded request");
                    }
                }
            }
        }

        debug!("coordinator worker stopped");
    }

    /// Blocks until a pending request may be dispatched under the throttle,
    /// then installs its session. `None` on shutdown.
    fn next_job(shared: &SharedState) -> Option<Job> {
        let mut state = shared.lock();

        loop {
            if state.shutdown {
                return None;
            }

            if state.pending.is_none() {
                state = shared
                    .wake
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner);
                continue;
            }

            let now = Instant::now();
            if let ThrottleDecision::WaitFor(delay) = state.throttle.check(now) {
                trace!("throttled, next dispatch in {delay:?}");
                state = shared
                    .wake
                    .wait_timeout(state, delay)
                    .unwrap_or_else(PoisonError::into_inner)
                    .0;
                continue;
            }

            let Some((generation, params)) = state.pending.take() else {
                continue;
            };
            state.throttle.mark_dispatched(now);

            let opened = params.to_request().and_then(|request| {
                RenderSession::new(generation, params.clone(), request)
                    .map(|session| (session, request))
            });

            let (session, request) = match opened {
                Ok(opened) => opened,
                Err(error) => {
                    state.session = Some(RenderSession::rejected(generation, params));
                    return Some(Job::Invalid { generation, error });
                }
            };

            let method = params.method.clone();
            let signal = session.signal();
            state.session = Some(session);

            return Some(Job::Render(RenderJob {
                generation,
                method,
                request,
                signal,
            }));
        }
    }

    fn run_session(shared: &SharedState, job: &RenderJob) {
        let request = &job.request;
        info!(
            "generation {}: {} render {}x{} via `{}`",
            job.generation, request.mode, request.width, request.height, job.method
        );

        shared.sink.present(DeliveryEvent::Started(SessionStarted {
            generation: job.generation,
            width: request.width,
            height: request.height,
            mode: request.mode,
        }));

        let start = Instant::now();
        let result = match request.mode {
            RenderMode::Line => Self::stream_rows(shared, job),
            RenderMode::Image | RenderMode::Pixel => Self::fetch_frame(shared, job),
        };

        match result {
            Ok(frame) => {
                let render_duration = start.elapsed();
                info!(
                    "generation {}: frame complete in {render_duration:?}",
                    job.generation
                );

                shared
                    .last_completed_generation
                    .fetch_max(job.generation, Ordering::AcqRel);

                shared.sink.present(DeliveryEvent::Frame(FrameData {
                    generation: job.generation,
                    frame,
                    render_duration,
                }));
            }
            Err(error) => Self::fail_session(shared, job.generation, error),
        }
    }

    fn fetch_frame(shared: &SharedState, job: &RenderJob) -> Result<FrameBuffer, DeliveryError> {
        let rows = Self::call_with_retry(shared, job, &job.request)?;
        check_response_shape(&job.request, &rows)?;

        match Self::write_rows(shared, job.generation, &rows)? {
            (WriteOutcome::Written { .. }, Some(frame)) => Ok(frame),
            // superseded while the response was in flight
            _ => Err(DeliveryError::Cancelled),
        }
    }

    /// Requests rows one at a time, in increasing order, presenting each as
    /// soon as it lands in the buffer.
    fn stream_rows(shared: &SharedState, job: &RenderJob) -> Result<FrameBuffer, DeliveryError> {
        let total_rows = job.request.height;

        for y in 0..total_rows {
            if job.signal.is_cancelled() {
                return Err(DeliveryError::Cancelled);
            }

            let row_request = job.request.for_row(y);
            let rows = Self::call_with_retry(shared, job, &row_request)?;
            check_response_shape(&row_request, &rows)?;

            // the row index of the request decides where the row lands
            let rows = RenderedRows { row_start: y, ..rows };

            let (outcome, frame) = Self::write_rows(shared, job.generation, &rows)?;
            let WriteOutcome::Written { rows_received, .. } = outcome else {
                return Err(DeliveryError::Cancelled);
            };
            trace!(
                "generation {}: row {y} ({rows_received}/{total_rows})",
                job.generation
            );

            shared.sink.present(DeliveryEvent::Rows(RowsDelivered {
                generation: job.generation,
                row_start: y,
                row_count: 1,
                data: rows.data,
                rows_received,
                total_rows,
            }));

            if let Some(frame) = frame {
                return Ok(frame);
            }
        }

        // every row was written, so the last write completed the session
        Err(DeliveryError::Cancelled)
    }

    /// Writes into the session buffer only if `generation` is still current.
    /// The check and the write happen under the same lock.
    fn write_rows(
        shared: &SharedState,
        generation: u64,
        rows: &RenderedRows,
    ) -> Result<(WriteOutcome, Option<FrameBuffer>), ProtocolError> {
        let mut state = shared.lock();

        if state.generation != generation {
            return Ok((WriteOutcome::Stale, None));
        }

        let Some(session) = state
            .session
            .as_mut()
            .filter(|session| session.generation() == generation)
        else {
            return Ok((WriteOutcome::Stale, None));
        };

        let outcome = session.write_rows(generation, rows)?;
        let frame = match outcome {
            WriteOutcome::Written { complete: true, .. } => Some(session.buffer().clone()),
            _ => None,
        };

        Ok((outcome, frame))
    }

    fn call_with_retry(
        shared: &SharedState,
        job: &RenderJob,
        request: &RenderRequest,
    ) -> Result<RenderedRows, DeliveryError> {
        let mut attempt = 0;

        loop {
            if job.signal.is_cancelled() {
                return Err(DeliveryError::Cancelled);
            }

            match Self::await_call(shared, job, request) {
                Err(error) if error.is_retryable() && attempt < shared.config.max_retries => {
                    attempt += 1;
                    warn!(
                        "generation {}: attempt {attempt} failed ({error}), retrying",
                        job.generation
                    );

                    select! {
                        recv(job.signal.receiver()) -> _ => return Err(DeliveryError::Cancelled),
                        default(shared.config.retry_backoff) => {}
                    }
                }
                result => return result,
            }
        }
    }

    /// Queues one backend call on the call pool and waits for whichever comes
    /// first: the result, cancellation or the call timeout. An abandoned call
    /// keeps running until the backend notices, and its result is dropped.
    fn await_call(
        shared: &SharedState,
        job: &RenderJob,
        request: &RenderRequest,
    ) -> Result<RenderedRows, DeliveryError> {
        let receiver = shared.calls.submit(&job.method, request, &job.signal)?;

        let timeout = shared.config.call_timeout;
        let deadline = timeout.map_or_else(never, after);

        select! {
            recv(receiver) -> result => result.unwrap_or_else(|_| {
                // the pool drops calls whose signal fired before they started
                if job.signal.is_cancelled() {
                    return Err(DeliveryError::Cancelled);
                }
                Err(NetworkError::Transport("compute call ended without a result".to_owned()).into())
            }),
            recv(job.signal.receiver()) -> _ => Err(DeliveryError::Cancelled),
            recv(deadline) -> _ => Err(NetworkError::Timeout(timeout.unwrap_or_default()).into()),
        }
    }

    /// Moves the session to `Errored` and surfaces `error`, unless the session
    /// was superseded or the error is a cancellation.
    fn fail_session(shared: &SharedState, generation: u64, error: DeliveryError) {
        if error.is_cancellation() {
            debug!("generation {generation}: stopped before completion");
            return;
        }

        let surfaced = {
            let mut state = shared.lock();
            let is_current = state.generation == generation;

            let failed = match state.session.as_mut() {
                Some(session) if session.generation() == generation => session.fail(),
                _ => false,
            };

            is_current && failed
        };

        if !surfaced {
            debug!("generation {generation}: dropping error from superseded session: {error}");
            return;
        }

        Self::surface_error(shared, generation, error);
    }

    fn surface_error(shared: &SharedState, generation: u64, error: DeliveryError) {
        warn!("generation {generation}: {error}");

        shared
            .last_completed_generation
            .fetch_max(generation, Ordering::AcqRel);

        shared.sink.present(DeliveryEvent::Error(RenderError {
            generation,
            keep_previous_frame: error.keeps_previous_frame(),
            error,
        }));
    }
}

impl Drop for StreamingCoordinator {
    fn drop(&mut self) {
        self.shutdown();
    }
}
