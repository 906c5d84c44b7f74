pub mod bubble;
pub mod constants;
pub mod easing;
pub mod fade;
pub mod glass;
pub mod layout;
pub mod particles;
pub mod render;
pub mod settings;

pub use bubble::*;
pub use constants::*;
pub use glass::{build_backdrop_filter, FilterCache, FilterKey, GlassParams};
pub use layout::{plan_layout, LayoutPlan, Rect};
pub use particles::{ParticleFrame, ParticleHandle, ParticleKind, ParticlePool};
pub use render::*;
