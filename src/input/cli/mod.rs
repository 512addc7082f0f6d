pub mod render_args;
pub mod worker_args;
