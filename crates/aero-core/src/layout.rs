//! Resting and entry positions for floating bubbles.
//!
//! Bubbles stack in a loose vertical line under the menu toggle. Each replan
//! draws fresh jitter so the arrangement looks hand-placed without ever
//! being identical twice.

use crate::constants::*;
use rand::Rng;

/// Axis-aligned rectangle in viewport (client) coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    #[inline]
    pub fn is_measured(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    #[inline]
    pub fn center(&self) -> glam::Vec2 {
        glam::Vec2::new(self.left + self.width * 0.5, self.top + self.height * 0.5)
    }

    /// This rect, or `fallback` sized at the same origin when unmeasured.
    pub fn or_size(&self, width: f32, height: f32) -> Rect {
        if self.is_measured() {
            *self
        } else {
            Rect::new(self.left, self.top, width, height)
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LayoutPlan {
    pub rest_x: f32,
    pub rest_y: f32,
    pub entry_x: f32,
    pub entry_y: f32,
}

/// Random draws that go into one plan, split out so tests can pin them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutJitter {
    pub jitter_x: f32,
    pub jitter_y: f32,
    pub spacing: f32,
    pub entry_extra: f32,
    pub entry_jitter_y: f32,
}

impl LayoutJitter {
    pub fn draw<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            jitter_x: (rng.gen::<f32>() - 0.5) * LAYOUT_JITTER_X,
            jitter_y: (rng.gen::<f32>() - 0.5) * LAYOUT_JITTER_Y,
            spacing: LAYOUT_SPACING_MIN + rng.gen::<f32>() * LAYOUT_SPACING_SPAN,
            entry_extra: rng.gen::<f32>() * ENTRY_OFFSCREEN_EXTRA,
            entry_jitter_y: (rng.gen::<f32>() - 0.5) * ENTRY_Y_JITTER,
        }
    }

    /// No randomness: useful for snapshots and the static inline case.
    pub fn none() -> Self {
        Self {
            jitter_x: 0.0,
            jitter_y: 0.0,
            spacing: LAYOUT_SPACING_MIN,
            entry_extra: 0.0,
            entry_jitter_y: 0.0,
        }
    }
}

/// Anchor point under the toggle, in container-relative coordinates.
pub fn anchor_point(container: &Rect, anchor: Option<&Rect>) -> (f32, f32) {
    let container =
        container.or_size(DEFAULT_CONTAINER_WIDTH, DEFAULT_CONTAINER_HEIGHT);
    let (base_left, base_top, aw, ah) = match anchor {
        Some(a) => {
            let a = a.or_size(DEFAULT_ANCHOR_SIZE, DEFAULT_ANCHOR_SIZE);
            (a.left - container.left, a.top - container.top, a.width, a.height)
        }
        None => (0.0, 0.0, DEFAULT_ANCHOR_SIZE, DEFAULT_ANCHOR_SIZE),
    };
    let anchor_x = base_left + aw * 0.5;
    let anchor_y = base_top + ah + LAYOUT_ANCHOR_GAP;
    (
        clamp_inset(anchor_x, container.width),
        clamp_inset(anchor_y, container.height),
    )
}

#[inline]
fn clamp_inset(v: f32, extent: f32) -> f32 {
    // min/max instead of clamp: tiny containers invert the band
    v.max(LAYOUT_EDGE_INSET).min(extent - LAYOUT_EDGE_INSET)
}

/// Plan with explicit jitter values.
pub fn plan_layout_with(
    index: usize,
    container: &Rect,
    anchor: Option<&Rect>,
    viewport_width: f32,
    jitter: &LayoutJitter,
) -> LayoutPlan {
    let (ax, ay) = anchor_point(container, anchor);
    let rest_x = ax + jitter.jitter_x;
    let rest_y = ay + index as f32 * jitter.spacing + jitter.jitter_y;
    let vw = if viewport_width > 0.0 {
        viewport_width
    } else {
        DEFAULT_VIEWPORT_WIDTH
    };
    LayoutPlan {
        rest_x,
        rest_y,
        entry_x: -vw - ENTRY_OFFSCREEN_MARGIN - jitter.entry_extra,
        entry_y: rest_y + jitter.entry_jitter_y,
    }
}

/// Plan a bubble's rest point below the toggle and its off-screen entry.
///
/// `count` only has to be positive; indices past it still stack downward.
pub fn plan_layout<R: Rng + ?Sized>(
    index: usize,
    count: usize,
    container: &Rect,
    anchor: Option<&Rect>,
    viewport_width: f32,
    rng: &mut R,
) -> LayoutPlan {
    debug_assert!(count > 0 || index == 0);
    let jitter = LayoutJitter::draw(rng);
    plan_layout_with(index, container, anchor, viewport_width, &jitter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmeasured_container_uses_defaults() {
        let (x, y) = anchor_point(&Rect::default(), None);
        assert_eq!(x, LAYOUT_EDGE_INSET);
        assert_eq!(y, DEFAULT_ANCHOR_SIZE + LAYOUT_ANCHOR_GAP);
    }

    #[test]
    fn anchor_is_kept_inside_container() {
        let container = Rect::new(0.0, 0.0, 240.0, 220.0);
        let far = Rect::new(400.0, 400.0, 48.0, 48.0);
        let (x, y) = anchor_point(&container, Some(&far));
        assert_eq!(x, 200.0);
        assert_eq!(y, 180.0);
    }
}
