use log::trace;

use crate::controllers::streaming::errors::DeliveryError;
use crate::controllers::streaming::ports::ComputeBackend;
use crate::core::actions::cancellation::CancelSignal;
use crate::core::actions::dispatch::dispatch::dispatch;
use crate::core::data::render_request::RenderRequest;
use crate::core::data::rendered_rows::RenderedRows;

/// Renders in-process on the rayon pool. The method selector is ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalBackend;

impl ComputeBackend for LocalBackend {
    fn compute(
        &self,
        method: &str,
        request: &RenderRequest,
        cancel: &CancelSignal,
    ) -> Result<RenderedRows, DeliveryError> {
        trace!(
            "`{method}`: rendering {} rows locally",
            request.rows_per_response()
        );

        let stream = dispatch(request)?;
        Ok(stream.collect_rows(cancel)?)
    }
}
