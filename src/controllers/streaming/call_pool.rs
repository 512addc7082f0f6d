use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use log::{trace, warn};

use crate::controllers::streaming::errors::{DeliveryError, NetworkError};
use crate::controllers::streaming::ports::ComputeBackend;
use crate::core::actions::cancellation::{CancelSignal, CancelToken};
use crate::core::data::render_request::RenderRequest;
use crate::core::data::rendered_rows::RenderedRows;

pub(crate) type CallResult = Result<RenderedRows, DeliveryError>;

struct Call {
    method: String,
    request: RenderRequest,
    signal: CancelSignal,
    reply: Sender<CallResult>,
}

/// A fixed set of threads running backend calls.
///
/// The caller waits on the returned receiver and may walk away from it. The
/// call keeps its thread until the backend returns, and calls still queued
/// when their signal fires are dropped without running. Threads exit once the
/// pool is dropped and their current call returns.
pub(crate) struct CallPool {
    calls: Sender<Call>,
}

impl CallPool {
    pub(crate) fn new(backend: Arc<dyn ComputeBackend>, threads: usize) -> Self {
        let (calls, queue) = unbounded::<Call>();

        for index in 0..threads.max(1) {
            let backend = Arc::clone(&backend);
            let queue = queue.clone();

            let spawned = thread::Builder::new()
                .name(format!("fractal-compute-{index}"))
                .spawn(move || Self::serve(backend.as_ref(), &queue));

            if let Err(err) = spawned {
                warn!("cannot start compute thread {index}: {err}");
            }
        }

        Self { calls }
    }

    /// Queues one call. Fails only if no compute thread could be started.
    pub(crate) fn submit(
        &self,
        method: &str,
        request: &RenderRequest,
        signal: &CancelSignal,
    ) -> Result<Receiver<CallResult>, NetworkError> {
        let (reply, result) = bounded(1);

        self.calls
            .send(Call {
                method: method.to_owned(),
                request: *request,
                signal: signal.clone(),
                reply,
            })
            .map_err(|_| NetworkError::Transport("no compute thread is running".to_owned()))?;

        Ok(result)
    }

    fn serve(backend: &dyn ComputeBackend, queue: &Receiver<Call>) {
        for call in queue {
            if call.signal.is_cancelled() {
                trace!("dropping cancelled call before it starts");
                continue;
            }

            let _ = call
                .reply
                .send(backend.compute(&call.method, &call.request, &call.signal));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::local::local_backend::LocalBackend;
    use crate::core::actions::cancellation::CancelSource;
    use crate::core::data::viewport::Viewport;
    use std::time::Duration;

    fn request() -> RenderRequest {
        RenderRequest::image(Viewport::default(), 6, 4, 20)
    }

    #[test]
    fn test_call_returns_backend_result() {
        let pool = CallPool::new(Arc::new(LocalBackend), 2);
        let signal = CancelSource::new().signal();

        let result = pool
            .submit("local", &request(), &signal)
            .unwrap()
            .recv_timeout(Duration::from_secs(5))
            .unwrap();

        assert_eq!(result.unwrap().height, 4);
    }

    #[test]
    fn test_cancelled_call_is_dropped_unrun() {
        let pool = CallPool::new(Arc::new(LocalBackend), 1);
        let mut source = CancelSource::new();
        source.cancel();

        let result = pool.submit("local", &request(), &source.signal()).unwrap();

        // the reply sender is dropped without a value
        assert!(result.recv_timeout(Duration::from_secs(5)).is_err());
    }
}
