// Infrastructure layer - External dependencies and adapters
pub mod bmp_codec;
pub mod config;
pub mod http_transport;
pub mod mono_fonts;
pub mod process_runner;
