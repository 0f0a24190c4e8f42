pub mod logging;
pub mod progress;
pub mod types;
pub mod utils;

pub use logging::*;
pub use progress::create_count_progress_bar;
pub use types::*;
pub use utils::*;
