//! Liquid glass refraction: SVG displacement filter synthesis and its cache.
//!
//! The filter is an `feDisplacementMap` driven by a size-matched map image
//! whose red/green channels ramp up near the rim and stay neutral grey in the
//! interior, so light only bends close to the edge. Three passes at slightly
//! different strengths are split across colour channels and recombined with
//! `lighten` to give the iridescent fringe.

use crate::constants::*;
use fnv::FnvHashMap;
use std::collections::VecDeque;
use std::rc::Rc;

/// Inputs to the synthesizer. Dimensions are CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlassParams {
    pub width: f32,
    pub height: f32,
    pub radius: f32,
    pub depth: f32,
    pub strength: f32,
    pub chromatic_aberration: f32,
    pub blur: f32,
}

impl Default for GlassParams {
    fn default() -> Self {
        Self {
            width: DEFAULT_BUBBLE_SIZE,
            height: DEFAULT_BUBBLE_SIZE,
            radius: GLASS_RADIUS_DEFAULT,
            depth: GLASS_DEPTH_DEFAULT,
            strength: GLASS_STRENGTH_DEFAULT,
            chromatic_aberration: GLASS_ABERRATION_DEFAULT,
            blur: GLASS_BLUR_DEFAULT,
        }
    }
}

impl GlassParams {
    pub fn sized(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Copy with every scalar forced into its safe range.
    pub fn sanitized(&self) -> Self {
        let finite = |v: f32, fallback: f32| if v.is_finite() { v } else { fallback };
        Self {
            width: finite(self.width, 1.0).max(1.0),
            height: finite(self.height, 1.0).max(1.0),
            radius: finite(self.radius, 0.0).max(0.0),
            depth: finite(self.depth, 0.0).max(0.0),
            strength: finite(self.strength, 0.0).clamp(0.0, GLASS_STRENGTH_MAX),
            chromatic_aberration: finite(self.chromatic_aberration, 0.0)
                .clamp(0.0, GLASS_ABERRATION_MAX),
            blur: finite(self.blur, 0.0).max(0.0),
        }
    }
}

fn svg_data_uri(svg: &str) -> String {
    format!("data:image/svg+xml;utf8,{}", urlencoding::encode(svg))
}

/// Displacement map image as a data URI.
pub fn displacement_map(width: f32, height: f32, radius: f32, depth: f32) -> String {
    let w = width.max(1.0);
    let h = height.max(1.0);
    let edge_ramp = (depth * 2.9).floor().max(2.0);
    let inner_w = (w - edge_ramp * 2.0).max(1.0);
    let inner_h = (h - edge_ramp * 2.0).max(1.0);
    let soften = depth.max(1.0);
    let svg = format!(
        r##"<svg height="{h}" width="{w}" viewBox="0 0 {w} {h}" xmlns="http://www.w3.org/2000/svg"><style>.mix {{ mix-blend-mode: screen; }}</style><defs><radialGradient id="edgeRampY" cx="50%" cy="50%" r="98%"><stop offset="0%" stop-color="#000" /><stop offset="38%" stop-color="#000" /><stop offset="100%" stop-color="#0F0" /></radialGradient><radialGradient id="edgeRampX" cx="50%" cy="50%" r="98%"><stop offset="0%" stop-color="#000" /><stop offset="38%" stop-color="#000" /><stop offset="100%" stop-color="#F00" /></radialGradient></defs><rect x="0" y="0" height="{h}" width="{w}" fill="#808080" /><g><rect x="0" y="0" height="{h}" width="{w}" fill="url(#edgeRampY)" class="mix" /><rect x="0" y="0" height="{h}" width="{w}" fill="url(#edgeRampX)" class="mix" /><rect x="{edge_ramp}" y="{edge_ramp}" width="{inner_w}" height="{inner_h}" rx="{radius}" ry="{radius}" fill="#808080" fill-opacity="0" /><rect x="0" y="0" height="{h}" width="{w}" fill="#808080" fill-opacity="0" filter="blur({soften}px)" /></g></svg>"##
    );
    svg_data_uri(&svg)
}

fn channel_pass(scale: f32, map_row: &str, result: &str) -> String {
    format!(
        r#"<feDisplacementMap in="SourceGraphic" in2="displacementMap" scale="{scale}" xChannelSelector="R" yChannelSelector="G" /><feColorMatrix type="matrix" values="{map_row}" result="{result}" />"#
    )
}

/// Full filter graph as a data URI ending in the `#displace` fragment.
pub fn displacement_filter(params: &GlassParams) -> String {
    let p = params.sanitized();
    let (w, h) = (p.width, p.height);
    let map = displacement_map(w, h, p.radius, p.depth);
    let ca = p.chromatic_aberration;
    let red = channel_pass(
        p.strength + ca * 2.0,
        "1 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 1 0",
        "displacedR",
    );
    let green = channel_pass(
        p.strength + ca,
        "0 0 0 0 0 0 1 0 0 0 0 0 0 0 0 0 0 0 1 0",
        "displacedG",
    );
    let blue = channel_pass(
        p.strength,
        "0 0 0 0 0 0 0 0 0 0 0 0 1 0 0 0 0 0 1 0",
        "displacedB",
    );
    let svg = format!(
        r#"<svg height="{h}" width="{w}" viewBox="0 0 {w} {h}" xmlns="http://www.w3.org/2000/svg"><defs><filter id="displace" color-interpolation-filters="sRGB"><feImage x="0" y="0" height="{h}" width="{w}" href="{map}" result="displacementMap" />{red}{green}{blue}<feBlend in="displacedR" in2="displacedG" mode="lighten" /><feBlend in2="displacedB" mode="lighten" /></filter></defs></svg>"#
    );
    format!("{}#displace", svg_data_uri(&svg))
}

/// `backdrop-filter` value: pre-blur, displacement, post-blur, tone nudge.
pub fn build_backdrop_filter(params: &GlassParams) -> String {
    let p = params.sanitized();
    let url = displacement_filter(&p);
    format!(
        "blur({:.2}px) url('{}') blur({:.2}px) contrast(1.04) brightness(1.02) saturate(1.02)",
        p.blur * GLASS_PRE_BLUR,
        url,
        p.blur * GLASS_POST_BLUR
    )
}

/// Quantized memo key. Sizes snap to an 8 px grid so sub-pixel layout churn
/// during animation maps onto the same entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FilterKey {
    pub width: u32,
    pub height: u32,
    pub radius: u32,
    pub depth: u32,
    pub strength: u32,
    pub aberration_tenths: u32,
    pub blur_tenths: u32,
}

#[inline]
fn snap_to_grid(v: f32) -> u32 {
    let cells = (v / FILTER_GRID_PX).round().max(1.0);
    (cells * FILTER_GRID_PX) as u32
}

impl FilterKey {
    pub fn from_params(params: &GlassParams) -> Self {
        let p = params.sanitized();
        Self {
            width: snap_to_grid(p.width),
            height: snap_to_grid(p.height),
            radius: p.radius.round() as u32,
            depth: p.depth.round() as u32,
            strength: p.strength.round() as u32,
            aberration_tenths: (p.chromatic_aberration * 10.0).round() as u32,
            blur_tenths: (p.blur * 10.0).round() as u32,
        }
    }

    /// Parameters the cached descriptor is actually built from.
    pub fn to_params(&self) -> GlassParams {
        GlassParams {
            width: self.width as f32,
            height: self.height as f32,
            radius: self.radius as f32,
            depth: self.depth as f32,
            strength: self.strength as f32,
            chromatic_aberration: self.aberration_tenths as f32 / 10.0,
            blur: self.blur_tenths as f32 / 10.0,
        }
    }
}

/// Bounded FIFO memo of backdrop-filter descriptors.
///
/// Shared by every bubble on the page; it is the only cross-instance state.
#[derive(Debug)]
pub struct FilterCache {
    entries: FnvHashMap<FilterKey, Rc<str>>,
    order: VecDeque<FilterKey>,
    capacity: usize,
    hits: u64,
    misses: u64,
}

impl Default for FilterCache {
    fn default() -> Self {
        Self::with_capacity(FILTER_CACHE_CAPACITY)
    }
}

impl FilterCache {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: FnvHashMap::default(),
            order: VecDeque::with_capacity(capacity),
            capacity,
            hits: 0,
            misses: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn contains(&self, key: &FilterKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Hit/miss counters, useful for logging cache effectiveness.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    /// Return the cached descriptor for these params, building it on a miss.
    pub fn get_or_build(&mut self, params: &GlassParams) -> Rc<str> {
        let key = FilterKey::from_params(params);
        if let Some(hit) = self.entries.get(&key) {
            self.hits += 1;
            return hit.clone();
        }
        self.misses += 1;
        let built: Rc<str> = Rc::from(build_backdrop_filter(&key.to_params()));
        self.insert(key, built.clone());
        built
    }

    fn insert(&mut self, key: FilterKey, value: Rc<str>) {
        while self.entries.len() >= self.capacity {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                    log::trace!("[glass] evicted {}x{} filter", oldest.width, oldest.height);
                }
                None => break,
            }
        }
        // Allocation failure only costs us the memo, never the filter.
        if self.entries.try_reserve(1).is_err() || self.order.try_reserve(1).is_err() {
            log::warn!("[glass] filter cache insert skipped");
            return;
        }
        self.entries.insert(key, value);
        self.order.push_back(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapping_absorbs_subpixel_jitter() {
        let a = FilterKey::from_params(&GlassParams::sized(95.3, 96.1));
        let b = FilterKey::from_params(&GlassParams::sized(96.4, 97.9));
        assert_eq!(a, b);
        assert_eq!(a.width, 96);
    }

    #[test]
    fn tiny_sizes_snap_to_one_cell() {
        let k = FilterKey::from_params(&GlassParams::sized(0.0, 2.0));
        assert_eq!(k.width, 8);
        assert_eq!(k.height, 8);
    }

    #[test]
    fn sanitize_clamps_strength_and_aberration() {
        let p = GlassParams {
            strength: 5000.0,
            chromatic_aberration: -3.0,
            width: f32::NAN,
            ..GlassParams::default()
        }
        .sanitized();
        assert_eq!(p.strength, GLASS_STRENGTH_MAX);
        assert_eq!(p.chromatic_aberration, 0.0);
        assert_eq!(p.width, 1.0);
    }
}
