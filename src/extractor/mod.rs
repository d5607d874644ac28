pub mod field_extractor;
pub mod record;
pub mod report;
pub mod table_writer;

pub use field_extractor::{ExtractionOutcome, ExtractionProgress, FieldExtractor};
pub use record::{FailureStage, FileFailure, TrackRecord};
pub use report::{ConfigSnapshot, ExtractionReport, ExtractionSummary};
pub use table_writer::{read_table, TableWriter, TABLE_HEADER};
