pub mod aggregator;
pub mod progress_error;
pub mod progress_reader;
pub mod progress_writer;
pub mod snapshot;
pub mod snapshot_stream;
