pub mod enrich;

pub use enrich::run_enrich;
