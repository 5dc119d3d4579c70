pub mod aggregator;
pub mod calendar;
pub mod day_records;
pub mod format;
pub mod parser;
pub mod scaffold;
pub mod submission;

pub use crate::domain::model::{
    DayRecord, DigestState, Interval, MonthKey, RecordHandle, Reporter, Submission,
};
pub use crate::domain::ports::{DayRecordStore, MessageChannel, StateStore, Storage};
pub use crate::utils::error::Result;
