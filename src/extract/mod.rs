pub mod linkout;

pub use linkout::extract_figshare_ref;
