// Page wiring, asset locations and particle styling. Motion tuning lives in
// `aero_core::constants`.

// Container a floating bubble is laid out in; the toggle is its previous sibling
pub const NAV_CONTAINER_SELECTOR: &str = ".nav-menu";
pub const MENU_TOGGLE_SELECTOR: &str = ".menu-toggle";
pub const BUBBLE_ATTR: &str = "data-bubble";
pub const MENU_OPEN_CLASS: &str = "open";

// Probe value for backdrop-filter support
pub const BACKDROP_PROBE_VALUE: &str = "url(#displace)";

// Audio assets
pub const MUSIC_TRACK: &str = "assets/audio/Echoes of Tomorrow ext v2.2.mp3";
pub const POP_SOUNDS: [&str; 4] = [
    "assets/audio/bubbles/pop/bubble-pop-03-320977.mp3",
    "assets/audio/bubbles/pop/bubble-pop-06-351337.mp3",
    "assets/audio/bubbles/pop/bubble-pop-389501.mp3",
    "assets/audio/bubbles/pop/bubblepop-01-255624.mp3",
];
pub const EXTRA_SOUNDS: [&str; 6] = [
    "assets/audio/bubbles/extra/part-0.mp3",
    "assets/audio/bubbles/extra/part-1.mp3",
    "assets/audio/bubbles/extra/part-2.mp3",
    "assets/audio/bubbles/extra/part-3.mp3",
    "assets/audio/bubbles/extra/part-4.mp3",
    "assets/audio/bubbles/extra/part-5.mp3",
];
// Events that count as the first user gesture for autoplay
pub const GESTURE_EVENTS: [&str; 3] = ["pointerdown", "keydown", "touchstart"];
pub const MUSIC_TICK_MS: i32 = 125; // one fade step

// Burst layer sits above everything and never takes input
pub const BURST_LAYER_Z_INDEX: &str = "9999";
// One per burst, removed when the burst's backstop fires
pub const BURST_WRAPPER_STYLE: &str =
    "position: absolute; left: 0; top: 0; width: 0; height: 0; overflow: visible; pointer-events: none;";

// Droplet tints, indexed by the particle's tint
pub const DROPLET_COLORS: [&str; 4] = [
    "rgba(150, 230, 255, 0.95)",
    "rgba(120, 210, 255, 0.95)",
    "rgba(90, 200, 240, 0.95)",
    "rgba(170, 245, 255, 0.95)",
];

pub const FLASH_STYLE: &str = "border-radius: 999px; background: radial-gradient(60% 60% at 50% 50%, rgba(230, 250, 255, 0.9), rgba(230, 250, 255, 0.4) 45%, rgba(230, 250, 255, 0) 70%); filter: blur(0.5px);";
pub const RING_STYLE: &str =
    "border-radius: 999px; border: 2px solid rgba(140, 225, 255, 0.8); box-shadow: 0 0 12px rgba(140, 225, 255, 0.6);";
pub const RING_OUTER_STYLE: &str =
    "border-radius: 999px; border: 1px solid rgba(160, 235, 255, 0.6); filter: blur(0.3px);";
pub const MIST_STYLE: &str = "border-radius: 999px; background: radial-gradient(60% 60% at 50% 50%, rgba(160, 240, 255, 0.35), rgba(160, 240, 255, 0) 70%); filter: blur(6px);";
pub const DROPLET_SHADOW: &str = "0 1px 4px rgba(0, 60, 120, 0.18)";
pub const SHARD_STYLE: &str = "border-radius: 999px; transform-origin: 0 50%; background: linear-gradient(90deg, rgba(200, 245, 255, 0.0) 0%, rgba(200, 245, 255, 0.8) 40%, rgba(200, 245, 255, 0.0) 100%);";
// Shine: a round clip at the bubble rect, the band inside it sweeps
pub const SHINE_CLIP_STYLE: &str = "border-radius: 50%; overflow: hidden;";
pub const SHINE_BAND_STYLE: &str = "position: absolute; inset: 0; border-radius: inherit; will-change: transform; background: linear-gradient(120deg, rgba(255,255,255,0) 0%, rgba(255,255,255,0) 44%, rgba(255,255,255,0.75) 50%, rgba(255,255,255,0) 56%, rgba(255,255,255,0) 100%);";
pub const SHINE_SKEW_DEG: f32 = -14.0;
pub const RIM_HALO_STYLE: &str = "border-radius: 50%; background: radial-gradient(65% 65% at 50% 50%, rgba(255,255,255,0) 55%, rgba(190,240,255,0.8) 82%, rgba(190,240,255,0) 100%);";
pub const INNER_PULSE_STYLE: &str =
    "border-radius: 999px; border: 2px solid rgba(180, 235, 255, 0.8); box-shadow: 0 0 10px rgba(160, 230, 255, 0.6);";
pub const INGRESS_STYLE: &str = "border-radius: 999px; background: radial-gradient(60% 60% at 50% 50%, rgba(180, 240, 255, 0.95), rgba(255,255,255,0) 70%);";
