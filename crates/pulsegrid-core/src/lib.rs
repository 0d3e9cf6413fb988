pub mod analysis;
pub mod camera;
pub mod constants;
pub mod error;
pub mod grid;
pub mod params;
pub mod picking;
pub mod pointer;
pub mod render_loop;
pub mod rotation;
pub mod session;
pub mod synth;
pub mod tiles;
pub mod time;
pub mod trigger;
pub mod uniforms;
pub mod visualizer;

pub static VISUALIZER_WGSL: &str = include_str!("../shaders/visualizer.wgsl");
pub static GRID_WGSL: &str = include_str!("../shaders/grid.wgsl");
pub static POST_WGSL: &str = include_str!("../shaders/post.wgsl");

pub use analysis::*;
pub use camera::*;
pub use error::*;
pub use grid::*;
pub use params::*;
pub use picking::*;
pub use pointer::*;
pub use render_loop::*;
pub use rotation::*;
pub use session::*;
pub use synth::*;
pub use tiles::*;
pub use time::*;
pub use trigger::*;
pub use uniforms::*;
pub use visualizer::*;
