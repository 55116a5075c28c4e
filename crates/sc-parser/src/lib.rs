pub mod load;

pub use load::{parse_script, LoadOutcome};
