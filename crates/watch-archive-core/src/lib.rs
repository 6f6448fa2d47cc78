pub mod assembler;
pub mod front_matter;
pub mod pipeline;
pub mod progress;
pub mod resolver;
pub mod sink;
pub mod title;

pub use assembler::RecordAssembler;
pub use pipeline::{ArchivePipeline, PipelineOptions};
pub use progress::{ProgressTracker, RecordOutcome, RunSummary};
pub use resolver::RatingResolver;
pub use sink::{MarkdownSink, RecordSink, SinkError};
pub use title::{clean_title, display_title, record_key, sanitize_title};
