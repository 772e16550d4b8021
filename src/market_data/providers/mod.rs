pub mod panora;

pub use panora::PanoraPriceSource;
