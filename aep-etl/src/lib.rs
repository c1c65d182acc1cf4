//! aep-etl library interface
//!
//! Four-stage ETL over the Africa Energy Portal: extraction (fetch +
//! parse), normalization, storage, validation, plus the artifact writers
//! and the pipeline orchestrator that sequences them.

pub mod fetch;
pub mod normalize;
pub mod parser;
pub mod pipeline;
pub mod report;
pub mod store;
pub mod validate;
