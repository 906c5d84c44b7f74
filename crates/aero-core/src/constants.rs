// Shared animation and refraction tuning constants used by the simulator and
// the web frontend. Times are milliseconds, distances CSS pixels.

// Frame budget
pub const FRAME_INTERVAL_MS: f64 = 16.0; // ~60 fps
pub const FRAME_INTERVAL_LOW_POWER_MS: f64 = 40.0; // ~25 fps on constrained devices
pub const FILTER_THROTTLE_MS: f64 = 48.0; // min gap between filter re-synthesis
pub const FILTER_RESIZE_EPSILON_PX: f32 = 2.0; // size change that warrants a new filter

// Fallback measurements
pub const DEFAULT_CONTAINER_WIDTH: f32 = 240.0;
pub const DEFAULT_CONTAINER_HEIGHT: f32 = 220.0;
pub const DEFAULT_ANCHOR_SIZE: f32 = 48.0;
pub const DEFAULT_BUBBLE_SIZE: f32 = 48.0;
pub const DEFAULT_VIEWPORT_WIDTH: f32 = 1000.0;

// Layout
pub const LAYOUT_JITTER_X: f32 = 12.0; // full width of the horizontal jitter band
pub const LAYOUT_JITTER_Y: f32 = 10.0; // full width of the vertical jitter band
pub const LAYOUT_SPACING_MIN: f32 = 56.0;
pub const LAYOUT_SPACING_SPAN: f32 = 8.0;
pub const LAYOUT_ANCHOR_GAP: f32 = 18.0; // gap between toggle bottom and first bubble
pub const LAYOUT_EDGE_INSET: f32 = 40.0; // anchor is kept this far inside the container
pub const ENTRY_OFFSCREEN_MARGIN: f32 = 480.0;
pub const ENTRY_OFFSCREEN_EXTRA: f32 = 240.0;
pub const ENTRY_Y_JITTER: f32 = 20.0;

// Idle drift (randomized per bubble within these ranges)
pub const DRIFT_AMPLITUDE_MIN: f32 = 4.0;
pub const DRIFT_AMPLITUDE_SPAN: f32 = 4.0;
pub const DRIFT_SPEED_MIN: f32 = 0.05; // cycles/sec
pub const DRIFT_SPEED_SPAN: f32 = 0.08;
pub const DRIFT_SECONDARY_GAIN: f32 = 0.7; // amplitude of the second wave
pub const DRIFT_SECONDARY_RATIO_X: f32 = 0.71;
pub const DRIFT_SECONDARY_RATIO_Y: f32 = 0.67;
pub const DRIFT_SECONDARY_PHASE_X: f32 = 0.37;
pub const DRIFT_SECONDARY_PHASE_Y: f32 = 0.41;
pub const WOBBLE_SPEED_MIN: f32 = 0.015; // cycles/sec
pub const WOBBLE_SPEED_SPAN: f32 = 0.035;
pub const WOBBLE_AMPLITUDE_MIN_DEG: f32 = 1.2;
pub const WOBBLE_AMPLITUDE_SPAN_DEG: f32 = 0.9;
pub const TETHER_RADIUS_MIN: f32 = 16.0;
pub const TETHER_RADIUS_SPAN: f32 = 8.0;

// Jelly morph
pub const MORPH_SPEED_MIN: f32 = 0.12; // cycles/sec
pub const MORPH_SPEED_SPAN: f32 = 0.18;
pub const MORPH_AMPLITUDE_MIN: f32 = 3.0; // corner percentage points
pub const MORPH_AMPLITUDE_SPAN: f32 = 4.0;
pub const MORPH_ANISOTROPY_MIN: f32 = 0.008; // fraction of scale
pub const MORPH_ANISOTROPY_SPAN: f32 = 0.012;
pub const JELLY_MAX: f32 = 0.08; // bound on the anisotropic scale factor
pub const WOBBLE_OVERRIDE_MAX: f32 = 4.0; // ceiling for wobble intensity and speed overrides
pub const CORNER_PERCENT_MIN: f32 = 42.0;
pub const CORNER_PERCENT_MAX: f32 = 58.0;

// Hover
pub const HOVER_SCALE: f32 = 1.08;
pub const HOVER_MAX_PULL: f32 = 4.8; // px, reached inside the capture radius
pub const HOVER_CAPTURE_RADIUS: f32 = 80.0; // px; pull decays as radius / distance beyond it
pub const SCALE_SMOOTHING: f32 = 0.15; // fraction of the remaining gap per frame

// Open/close tween
pub const OPEN_DURATION_MIN_MS: f64 = 900.0;
pub const OPEN_DURATION_SPAN_MS: f64 = 300.0;
pub const OPEN_STAGGER_MAX_MS: f64 = 120.0;
pub const OPEN_CLAMP_PROGRESS: f32 = 0.8; // clamp into container past this progress
pub const OPEN_INTERACTIVE_PROGRESS: f32 = 0.6; // pointer events enabled past this progress
pub const CLOSED_FORCE_PROGRESS: f32 = 0.01; // force off-screen x at or below this
pub const CLOSED_EPSILON: f32 = 0.001;
pub const CONTAINER_MARGIN: f32 = 6.0;

// Pop / reappear
pub const POP_DELAY_MIN_MS: f64 = 420.0;
pub const POP_DELAY_SPAN_MS: f64 = 220.0;
pub const POP_JIGGLE_MS: f64 = 90.0; // high-frequency deformation sub-phase
pub const POP_JIGGLE_HZ: f32 = 28.0;
pub const POP_JIGGLE_AMPLITUDE: f32 = 0.12;
pub const POP_SHRINK_END_MS: f64 = 240.0; // scale and opacity reach zero here
pub const REAPPEAR_GROW_MS: f64 = 300.0;
pub const REAPPEAR_SETTLE_MS: f64 = 280.0;
pub const REAPPEAR_SQUASH_MS: f64 = 420.0;
pub const REAPPEAR_TOTAL_MS: f64 = 700.0;
pub const REAPPEAR_START_SCALE: f32 = 0.15;
pub const REAPPEAR_PEAK_SCALE: f32 = 1.08;
pub const REAPPEAR_OPACITY_RATE: f32 = 1.2; // opacity leads scale by this factor

// Liquid glass defaults
pub const GLASS_STRENGTH_DEFAULT: f32 = 200.0;
pub const GLASS_STRENGTH_MAX: f32 = 1200.0;
pub const GLASS_ABERRATION_DEFAULT: f32 = 1.4;
pub const GLASS_ABERRATION_MAX: f32 = 120.0;
pub const GLASS_BLUR_DEFAULT: f32 = 1.8;
pub const GLASS_DEPTH_DEFAULT: f32 = 8.0;
pub const GLASS_RADIUS_DEFAULT: f32 = 999.0; // fully round
pub const GLASS_PRE_BLUR: f32 = 0.7;
pub const GLASS_POST_BLUR: f32 = 0.9;
pub const FILTER_GRID_PX: f32 = 8.0;
pub const FILTER_CACHE_CAPACITY: usize = 64;

// Particles
pub const PARTICLE_POOL_CAPACITY: usize = 256;
pub const BURST_BACKSTOP_MS: f64 = 1000.0;
