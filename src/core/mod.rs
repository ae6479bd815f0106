pub mod etl;
pub mod merge;
pub mod pipeline;
pub mod storage_parser;
pub mod table;
pub mod warranty;

pub use crate::domain::model::{EnrichedTable, InputTable, Record, RunStats};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage, VendorApi};
pub use crate::utils::error::Result;
