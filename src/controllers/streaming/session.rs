use bitvec::prelude::{BitVec, Lsb0};

use crate::controllers::streaming::data::render_params::RenderParams;
use crate::core::actions::cancellation::{CancelSignal, CancelSource};
use crate::core::data::frame_buffer::{FrameBuffer, FrameBufferError};
use crate::core::data::render_request::{MAX_FRAME_BYTES, RenderRequest, ValidationError};
use crate::core::data::rendered_rows::RenderedRows;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Streaming,
    Terminal,
    Cancelled,
    Errored,
}

impl SessionState {
    /// Once left, `Streaming` is never re-entered and the buffer is frozen.
    #[must_use]
    pub fn is_finished(self) -> bool {
        !matches!(self, Self::Streaming)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written { rows_received: u32, complete: bool },
    /// Wrong generation, or the session already finished.
    Stale,
    /// At least one of the rows had already been written.
    Duplicate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub generation: u64,
    pub state: SessionState,
    pub rows_received: u32,
    pub total_rows: u32,
    pub frame: FrameBuffer,
}

/// One logical render attempt and the frame it is filling.
#[derive(Debug)]
pub struct RenderSession {
    generation: u64,
    params: RenderParams,
    cancel: CancelSource,
    rows_received: BitVec<usize, Lsb0>,
    buffer: FrameBuffer,
    state: SessionState,
}

impl RenderSession {
    /// Opens a streaming session with a blank buffer sized for `request`,
    /// which must already be validated.
    pub fn new(
        generation: u64,
        params: RenderParams,
        request: RenderRequest,
    ) -> Result<Self, ValidationError> {
        let buffer = FrameBuffer::new(request.width, request.height).map_err(|_| {
            ValidationError::FrameTooLarge {
                width: request.width,
                height: request.height,
                max_bytes: MAX_FRAME_BYTES,
            }
        })?;

        Ok(Self {
            generation,
            params,
            cancel: CancelSource::new(),
            rows_received: BitVec::repeat(false, request.height as usize),
            buffer,
            state: SessionState::Streaming,
        })
    }

    /// A session for parameters that failed validation. It holds an empty
    /// frame and starts out `Errored`.
    #[must_use]
    pub fn rejected(generation: u64, params: RenderParams) -> Self {
        let mut cancel = CancelSource::new();
        cancel.cancel();

        Self {
            generation,
            params,
            cancel,
            rows_received: BitVec::new(),
            buffer: FrameBuffer::default(),
            state: SessionState::Errored,
        }
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn params(&self) -> &RenderParams {
        &self.params
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn buffer(&self) -> &FrameBuffer {
        &self.buffer
    }

    #[must_use]
    pub fn signal(&self) -> CancelSignal {
        self.cancel.signal()
    }

    #[must_use]
    pub fn rows_received(&self) -> u32 {
        self.rows_received.count_ones() as u32
    }

    #[must_use]
    pub fn has_row(&self, y: u32) -> bool {
        self.rows_received
            .get(y as usize)
            .is_some_and(|bit| *bit)
    }

    /// Streaming → Cancelled. Fires the cancel token either way.
    pub fn cancel(&mut self) -> bool {
        self.cancel.cancel();
        self.finish(SessionState::Cancelled)
    }

    /// Streaming → Errored, aborting whatever is still in flight.
    pub fn fail(&mut self) -> bool {
        self.cancel.cancel();
        self.finish(SessionState::Errored)
    }

    /// Writes `rows` if `generation` is this session's and it is still
    /// streaming. Each row index is written at most once.
    pub fn write_rows(
        &mut self,
        generation: u64,
        rows: &RenderedRows,
    ) -> Result<WriteOutcome, FrameBufferError> {
        if generation != self.generation || self.state.is_finished() {
            return Ok(WriteOutcome::Stale);
        }

        if (rows.row_start..rows.row_end()).any(|y| self.has_row(y)) {
            return Ok(WriteOutcome::Duplicate);
        }

        self.buffer.write_rows(rows.row_start, &rows.data)?;
        for y in rows.row_start..rows.row_end() {
            self.rows_received.set(y as usize, true);
        }

        let complete = self.rows_received.all();
        if complete {
            self.state = SessionState::Terminal;
            self.cancel.cancel();
        }

        Ok(WriteOutcome::Written {
            rows_received: self.rows_received(),
            complete,
        })
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            generation: self.generation,
            state: self.state,
            rows_received: self.rows_received(),
            total_rows: self.buffer.height(),
            frame: self.buffer.clone(),
        }
    }

    fn finish(&mut self, state: SessionState) -> bool {
        if self.state.is_finished() {
            return false;
        }

        self.state = state;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::actions::cancellation::CancelToken;
    use crate::core::data::render_request::RenderMode;

    fn session(generation: u64, height: u32) -> RenderSession {
        let params = RenderParams {
            width: 2,
            height,
            mode: RenderMode::Line,
            ..RenderParams::default()
        };
        let request = params.to_request().unwrap();

        RenderSession::new(generation, params, request).unwrap()
    }

    fn row(y: u32, fill: u8) -> RenderedRows {
        RenderedRows {
            row_start: y,
            width: 2,
            height: 1,
            data: vec![fill; 8],
        }
    }

    #[test]
    fn test_rows_accumulate_until_terminal() {
        let mut session = session(1, 3);

        assert_eq!(
            session.write_rows(1, &row(2, 7)).unwrap(),
            WriteOutcome::Written {
                rows_received: 1,
                complete: false
            }
        );
        assert_eq!(
            session.write_rows(1, &row(0, 5)).unwrap(),
            WriteOutcome::Written {
                rows_received: 2,
                complete: false
            }
        );
        assert_eq!(
            session.write_rows(1, &row(1, 6)).unwrap(),
            WriteOutcome::Written {
                rows_received: 3,
                complete: true
            }
        );

        assert_eq!(session.state(), SessionState::Terminal);
        assert_eq!(session.buffer().row(0).unwrap(), &[5; 8]);
        assert_eq!(session.buffer().row(1).unwrap(), &[6; 8]);
        assert_eq!(session.buffer().row(2).unwrap(), &[7; 8]);
    }

    #[test]
    fn test_row_is_written_at_most_once() {
        let mut session = session(1, 2);
        session.write_rows(1, &row(0, 5)).unwrap();

        assert_eq!(
            session.write_rows(1, &row(0, 9)).unwrap(),
            WriteOutcome::Duplicate
        );
        assert_eq!(session.buffer().row(0).unwrap(), &[5; 8]);
        assert_eq!(session.rows_received(), 1);
    }

    #[test]
    fn test_other_generation_is_stale() {
        let mut session = session(4, 2);

        assert_eq!(
            session.write_rows(3, &row(0, 5)).unwrap(),
            WriteOutcome::Stale
        );
        assert_eq!(session.rows_received(), 0);
    }

    #[test]
    fn test_cancelled_session_keeps_partial_rows_and_rejects_writes() {
        let mut session = session(1, 3);
        let signal = session.signal();
        session.write_rows(1, &row(0, 5)).unwrap();

        assert!(session.cancel());
        assert!(signal.is_cancelled());
        assert_eq!(
            session.write_rows(1, &row(1, 6)).unwrap(),
            WriteOutcome::Stale
        );

        let snapshot = session.snapshot();
        assert_eq!(snapshot.state, SessionState::Cancelled);
        assert_eq!(snapshot.rows_received, 1);
        assert_eq!(snapshot.frame.row(0).unwrap(), &[5; 8]);
        assert_eq!(snapshot.frame.row(1).unwrap(), &[0; 8]);
    }

    #[test]
    fn test_finished_states_are_absorbing() {
        let mut session = session(1, 1);
        session.write_rows(1, &row(0, 5)).unwrap();

        assert!(!session.cancel(), "terminal session must not become cancelled");
        assert!(!session.fail());
        assert_eq!(session.state(), SessionState::Terminal);

        let mut errored = self::session(2, 1);
        assert!(errored.fail());
        assert!(!errored.cancel());
        assert_eq!(errored.state(), SessionState::Errored);
    }

    #[test]
    fn test_mismatched_row_width_is_an_error() {
        let mut session = session(1, 2);
        let bad_row = RenderedRows {
            row_start: 0,
            width: 3,
            height: 1,
            data: vec![0; 12],
        };

        assert!(session.write_rows(1, &bad_row).is_err());
        assert_eq!(session.rows_received(), 0);
    }

    #[test]
    fn test_rejected_session_is_errored_and_empty() {
        let mut session = RenderSession::rejected(7, RenderParams::default());
        let signal = session.signal();

        assert!(signal.is_cancelled());
        assert!(!session.fail(), "already errored");
        assert_eq!(session.write_rows(7, &row(0, 5)).unwrap(), WriteOutcome::Stale);

        let snapshot = session.snapshot();
        assert_eq!(snapshot.generation, 7);
        assert_eq!(snapshot.state, SessionState::Errored);
        assert_eq!((snapshot.rows_received, snapshot.total_rows), (0, 0));
        assert!(snapshot.frame.data().is_empty());
    }

    #[test]
    fn test_unallocatable_frame_is_rejected() {
        let params = RenderParams {
            width: u32::MAX,
            height: u32::MAX,
            ..RenderParams::default()
        };
        let request = RenderRequest::image(params.viewport, u32::MAX, u32::MAX, 10);

        assert!(matches!(
            RenderSession::new(1, params, request),
            Err(ValidationError::FrameTooLarge { .. })
        ));
    }
}
