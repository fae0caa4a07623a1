//! ASVA Plot
//!
//! Turns a test result into an annotated box plot:
//! - `AnnotationPlanner`: which pairwise brackets to draw, with p-values
//! - `PlotLayout`: y-limits, box statistics, quartile markers, bracket geometry
//! - `ChartRenderer` / `SvgRenderer`: layout to bytes
//! - `output`: where chart files go

pub mod planner;
pub mod layout;
pub mod render;
pub mod output;

pub use planner::{layout as bracket_layout, Annotation, AnnotationPlanner, BracketSpec, SIGNIFICANCE};
pub use layout::{figure_size, y_limits, BoxStats, BracketGeometry, PlotLayout, QuartileMarker};
pub use render::{Chart, ChartRenderer, SvgRenderer};
pub use output::{plot_dir, plot_path, write_chart, DEFAULT_PLOT_DIR};
