pub mod coordinator_config;
pub mod frame_data;
pub mod render_params;
