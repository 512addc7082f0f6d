pub mod complex;
pub mod frame_buffer;
pub mod pixel_colour;
pub mod render_request;
pub mod rendered_rows;
pub mod viewport;
