pub mod aggregate;
pub mod exec;
pub mod output;
pub mod stats;

pub use aggregate::{parse_stamp, Heatmap};
pub use exec::{build_heatmap, exec, parse_since};
pub use output::{output_heatmap, output_json};
pub use stats::HeatmapStats;
