// Application layer - Use cases and the seams they depend on
pub mod command_runner;
pub mod compositor;
pub mod output_publisher;
pub mod render_cycle;
pub mod telemetry_client;
pub mod telemetry_transport;
pub mod text_rasterizer;
