//! Core engine: the catalog → auctions → score → filter → emit pipeline.

pub mod presenter;
pub mod scanner;
pub mod sink;

pub use presenter::Presenter;
pub use scanner::{ScanPipeline, ScanState};
pub use sink::{MemorySink, Sink, StdoutSink};
