pub mod cancellation;
pub mod dispatch;
pub mod render_rows;
