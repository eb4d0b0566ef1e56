pub mod apis;
pub mod config;
pub mod constants;
pub mod error;
pub mod gateway;
pub mod geo;
pub mod law;
pub mod logging;
pub mod normalize;
pub mod pipeline;
pub mod row;
pub mod seed;
pub mod sheet;
pub mod storage;
pub mod types;
pub mod value;
