//! Sink implementations
//!
//! Contains LogSink, FileSink, and TransportSink.

mod file;
mod log;
mod transport;

pub use self::file::FileSink;
pub use self::log::LogSink;
pub use self::transport::TransportSink;
