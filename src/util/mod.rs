
/// Helper functions for writing JSON via serde
pub mod json_io;
/// Helper functions for generating the progress bars
pub mod progress_bar;
/// Helper functions for opening plain or gzipped text streams
pub mod text_io;
