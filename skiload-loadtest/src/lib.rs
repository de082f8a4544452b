pub mod api;
pub mod config;
pub mod latch;
pub mod orchestrator;
pub mod phase;
pub mod queue;
pub mod report;
pub mod sample;
pub mod stats;
pub mod worker;
pub mod writer;
