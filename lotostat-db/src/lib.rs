pub mod dataset;
pub mod models;
