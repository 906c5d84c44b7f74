//! Per-tick visual output and the renderer seam.
//!
//! The simulator never touches a scene graph. It produces a [`FrameStyle`]
//! and a [`RenderCache`] forwards only the properties whose serialized value
//! changed to whatever [`Renderer`] the host provides.

use std::fmt::Write as _;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub tx: f32,
    pub ty: f32,
    pub rotate_deg: f32,
    pub scale_x: f32,
    pub scale_y: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            tx: 0.0,
            ty: 0.0,
            rotate_deg: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }
}

impl Transform {
    pub fn css(&self) -> String {
        let mut s = String::with_capacity(96);
        let _ = write!(
            s,
            "translate3d({:.2}px, {:.2}px, 0) rotate({:.2}deg) scale({:.3}, {:.3})",
            self.tx, self.ty, self.rotate_deg, self.scale_x, self.scale_y
        );
        s
    }
}

/// Elliptical border-radius: four horizontal corner percentages, the
/// vertical radii mirror them around 50% so the outline stays balanced.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shape {
    pub corners: [f32; 4],
}

impl Default for Shape {
    fn default() -> Self {
        Self::round()
    }
}

impl Shape {
    pub const fn round() -> Self {
        Self {
            corners: [50.0; 4],
        }
    }

    pub fn css(&self) -> String {
        let [a, b, c, d] = self.corners;
        format!(
            "{:.1}% {:.1}% {:.1}% {:.1}% / {:.1}% {:.1}% {:.1}% {:.1}%",
            a,
            b,
            c,
            d,
            100.0 - a,
            100.0 - b,
            100.0 - c,
            100.0 - d
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerEvents {
    Auto,
    None,
}

impl PointerEvents {
    pub fn css(&self) -> &'static str {
        match self {
            PointerEvents::Auto => "auto",
            PointerEvents::None => "none",
        }
    }
}

/// Everything one tick decides about the element.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameStyle {
    pub transform: Transform,
    pub opacity: f32,
    pub shape: Shape,
    pub filter: Option<Rc<str>>,
    pub pointer_events: PointerEvents,
    /// Left edge of the element in viewport coordinates, before scaling.
    pub screen_x: f32,
}

/// Host-side sink for style writes.
pub trait Renderer {
    fn set_transform(&mut self, css: &str);
    fn set_opacity(&mut self, css: &str);
    fn set_shape(&mut self, css: &str);
    /// `None` clears the filter.
    fn set_filter(&mut self, css: Option<&str>);
    fn set_pointer_events(&mut self, css: &str);
}

/// Remembers the last committed values and skips redundant writes.
#[derive(Debug, Default)]
pub struct RenderCache {
    transform: String,
    opacity: String,
    shape: String,
    filter: Option<Rc<str>>,
    pointer_events: Option<PointerEvents>,
    primed: bool,
}

impl RenderCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write the changed parts of `style`; returns the number of writes.
    pub fn commit<R: Renderer + ?Sized>(&mut self, style: &FrameStyle, renderer: &mut R) -> usize {
        let mut writes = 0;
        let transform = style.transform.css();
        if !self.primed || transform != self.transform {
            renderer.set_transform(&transform);
            self.transform = transform;
            writes += 1;
        }
        let opacity = format!("{:.3}", style.opacity);
        if !self.primed || opacity != self.opacity {
            renderer.set_opacity(&opacity);
            self.opacity = opacity;
            writes += 1;
        }
        let shape = style.shape.css();
        if !self.primed || shape != self.shape {
            renderer.set_shape(&shape);
            self.shape = shape;
            writes += 1;
        }
        let filter_changed = match (&self.filter, &style.filter) {
            (Some(a), Some(b)) => !Rc::ptr_eq(a, b) && a != b,
            (None, None) => false,
            _ => true,
        };
        if !self.primed || filter_changed {
            renderer.set_filter(style.filter.as_deref());
            self.filter = style.filter.clone();
            writes += 1;
        }
        if self.pointer_events != Some(style.pointer_events) {
            renderer.set_pointer_events(style.pointer_events.css());
            self.pointer_events = Some(style.pointer_events);
            writes += 1;
        }
        self.primed = true;
        writes
    }
}

/// Renderer that records writes; used by host tests and headless runs.
#[derive(Debug, Default, Clone)]
pub struct RecordingRenderer {
    pub transform: Option<String>,
    pub opacity: Option<String>,
    pub shape: Option<String>,
    pub filter: Option<Option<String>>,
    pub pointer_events: Option<String>,
    pub writes: usize,
}

impl Renderer for RecordingRenderer {
    fn set_transform(&mut self, css: &str) {
        self.transform = Some(css.to_owned());
        self.writes += 1;
    }
    fn set_opacity(&mut self, css: &str) {
        self.opacity = Some(css.to_owned());
        self.writes += 1;
    }
    fn set_shape(&mut self, css: &str) {
        self.shape = Some(css.to_owned());
        self.writes += 1;
    }
    fn set_filter(&mut self, css: Option<&str>) {
        self.filter = Some(css.map(str::to_owned));
        self.writes += 1;
    }
    fn set_pointer_events(&mut self, css: &str) {
        self.pointer_events = Some(css.to_owned());
        self.writes += 1;
    }
}
