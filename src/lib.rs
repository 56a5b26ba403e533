pub mod csv_io;
pub mod error;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod report;
pub mod scoring;
