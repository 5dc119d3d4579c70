pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};
pub use config::DigestConfig;

pub use crate::adapters::{
    local_storage::LocalStorage,
    memory::{MemoryChannel, MemoryStateStore},
    state_file::JsonStateStore,
    webhook::WebhookChannel,
};
pub use crate::core::{
    aggregator::{AggregationReport, DailyAggregator},
    day_records::ChannelDayRecordStore,
    parser::parse,
    submission::{SubmissionReceipt, SubmissionService},
};
pub use utils::error::{DigestError, ParseError, Result};
