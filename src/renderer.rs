use aero_core::Renderer;
use web_sys as web;

/// Writes bubble styles straight onto the element's inline style.
pub struct DomRenderer {
    el: web::HtmlElement,
}

impl DomRenderer {
    pub fn new(el: web::HtmlElement) -> Self {
        let style = el.style();
        _ = style.set_property("will-change", "transform");
        _ = style.set_property("transform", "translate3d(0,0,0)");
        _ = style.set_property("pointer-events", "none");
        Self { el }
    }

    fn set(&self, property: &str, value: &str) {
        if let Err(e) = self.el.style().set_property(property, value) {
            log::warn!("[render] {} rejected: {:?}", property, e);
        }
    }

    /// Strip everything the animation wrote.
    pub fn clear(&self) {
        let style = self.el.style();
        for p in [
            "transform",
            "opacity",
            "border-radius",
            "backdrop-filter",
            "-webkit-backdrop-filter",
            "pointer-events",
            "will-change",
        ] {
            _ = style.remove_property(p);
        }
    }
}

impl Renderer for DomRenderer {
    fn set_transform(&mut self, css: &str) {
        self.set("transform", css);
    }

    fn set_opacity(&mut self, css: &str) {
        self.set("opacity", css);
    }

    fn set_shape(&mut self, css: &str) {
        self.set("border-radius", css);
    }

    fn set_filter(&mut self, css: Option<&str>) {
        let style = self.el.style();
        match css {
            Some(v) => {
                self.set("backdrop-filter", v);
                self.set("-webkit-backdrop-filter", v);
            }
            None => {
                _ = style.remove_property("backdrop-filter");
                _ = style.remove_property("-webkit-backdrop-filter");
            }
        }
    }

    fn set_pointer_events(&mut self, css: &str) {
        self.set("pointer-events", css);
    }
}
