// src/portfolio/mod.rs
mod isolate;
mod service;

pub use isolate::isolate;
pub use service::PortfolioAggregator;
