pub mod analyze_image;
pub mod compare;
pub mod default_config;
pub mod measure;

pub use analyze_image::analyze_single_image;
pub use compare::compare_csvs;
pub use default_config::print_default_config;
pub use measure::{build_config, run_measure, MeasureOverrides};
