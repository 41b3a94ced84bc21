//! View transform for the graph renderer.
//!
//! Pure calculation logic, kept free of any drawing backend so it can be
//! unit tested headless. Layout coordinates are viewport coordinates: at the
//! default pan/zoom the transform is the identity, so cluster layouts and
//! simulation snapshots draw 1:1 until the user pans or zooms.

/// Zoom clamp range
const ZOOM_MIN: f32 = 0.1;
const ZOOM_MAX: f32 = 10.0;

/// Per-frame interpolation factor for animated view changes
const LERP_FACTOR: f32 = 0.12;

/// Pan/zoom state mapping layout space to canvas pixels
#[derive(Debug, Clone)]
pub struct Camera {
    /// Canvas width in pixels
    pub width: f32,
    /// Canvas height in pixels
    pub height: f32,
    /// Pan offset in layout coordinates
    pub offset_x: f32,
    pub offset_y: f32,
    /// Zoom level (1.0 = 1:1)
    pub zoom: f32,
    /// Animation targets for fit-to-bounds
    target_offset_x: f32,
    target_offset_y: f32,
    target_zoom: f32,
    animating: bool,
}

impl Camera {
    /// Identity camera for the given canvas size
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            offset_x: 0.0,
            offset_y: 0.0,
            zoom: 1.0,
            target_offset_x: 0.0,
            target_offset_y: 0.0,
            target_zoom: 1.0,
            animating: false,
        }
    }

    /// Map a layout-space point to canvas pixels.
    ///
    /// Zoom is anchored on the canvas center so zooming doesn't slide the
    /// graph toward the origin.
    pub fn to_canvas(&self, x: f32, y: f32) -> (f32, f32) {
        let cx = self.width / 2.0;
        let cy = self.height / 2.0;
        (
            (x + self.offset_x - cx) * self.zoom + cx,
            (y + self.offset_y - cy) * self.zoom + cy,
        )
    }

    /// Inverse of [`Camera::to_canvas`]
    pub fn to_layout(&self, canvas_x: f32, canvas_y: f32) -> (f32, f32) {
        let cx = self.width / 2.0;
        let cy = self.height / 2.0;
        (
            (canvas_x - cx) / self.zoom + cx - self.offset_x,
            (canvas_y - cy) / self.zoom + cy - self.offset_y,
        )
    }

    /// Pan by a pixel delta
    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.offset_x += dx / self.zoom;
        self.offset_y += dy / self.zoom;
        // Keep targets in sync so a pending animation doesn't fight the user
        self.target_offset_x = self.offset_x;
        self.target_offset_y = self.offset_y;
    }

    /// Multiply the zoom level, clamped
    pub fn zoom_by(&mut self, factor: f32) {
        self.zoom = (self.zoom * factor).clamp(ZOOM_MIN, ZOOM_MAX);
        self.target_zoom = self.zoom;
    }

    /// Back to the identity view
    pub fn reset(&mut self) {
        *self = Self::new(self.width, self.height);
    }

    /// Update canvas dimensions
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    /// Animate toward a view that fits `bounds` with `padding` pixels spare
    pub fn fit_to_bounds(&mut self, bounds: &Bounds, padding: f32) {
        if bounds.is_empty() {
            return;
        }
        let avail_w = (self.width - 2.0 * padding).max(1.0);
        let avail_h = (self.height - 2.0 * padding).max(1.0);
        self.target_zoom = (avail_w / bounds.width())
            .min(avail_h / bounds.height())
            .clamp(ZOOM_MIN, ZOOM_MAX);
        self.target_offset_x = self.width / 2.0 - bounds.center_x();
        self.target_offset_y = self.height / 2.0 - bounds.center_y();
        self.animating = true;
    }

    /// Advance the fit animation one frame; returns true while animating
    pub fn step_animation(&mut self) -> bool {
        if !self.animating {
            return false;
        }
        self.zoom += (self.target_zoom - self.zoom) * LERP_FACTOR;
        self.offset_x += (self.target_offset_x - self.offset_x) * LERP_FACTOR;
        self.offset_y += (self.target_offset_y - self.offset_y) * LERP_FACTOR;

        if (self.target_zoom - self.zoom).abs() < 0.001
            && (self.target_offset_x - self.offset_x).abs() < 0.1
            && (self.target_offset_y - self.offset_y).abs() < 0.1
        {
            self.zoom = self.target_zoom;
            self.offset_x = self.target_offset_x;
            self.offset_y = self.target_offset_y;
            self.animating = false;
        }
        self.animating
    }
}

/// Axis-aligned bounds of a node set
#[derive(Debug, Clone, Copy)]
pub struct Bounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl Bounds {
    pub fn empty() -> Self {
        Self {
            min_x: f32::INFINITY,
            max_x: f32::NEG_INFINITY,
            min_y: f32::INFINITY,
            max_y: f32::NEG_INFINITY,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    /// Grow to include a circle
    pub fn include_circle(&mut self, x: f32, y: f32, radius: f32) {
        self.min_x = self.min_x.min(x - radius);
        self.max_x = self.max_x.max(x + radius);
        self.min_y = self.min_y.min(y - radius);
        self.max_y = self.max_y.max(y + radius);
    }

    pub fn width(&self) -> f32 {
        (self.max_x - self.min_x).max(1.0)
    }

    pub fn height(&self) -> f32 {
        (self.max_y - self.min_y).max(1.0)
    }

    pub fn center_x(&self) -> f32 {
        (self.min_x + self.max_x) / 2.0
    }

    pub fn center_y(&self) -> f32 {
        (self.min_y + self.max_y) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_maps_layout_to_canvas_unchanged() {
        let cam = Camera::new(400.0, 300.0);
        assert_eq!(cam.to_canvas(200.0, 150.0), (200.0, 150.0));
        assert_eq!(cam.to_canvas(0.0, 0.0), (0.0, 0.0));
    }

    #[test]
    fn zoom_is_anchored_on_canvas_center() {
        let mut cam = Camera::new(400.0, 300.0);
        cam.zoom_by(2.0);
        // The center stays put; other points spread away from it
        assert_eq!(cam.to_canvas(200.0, 150.0), (200.0, 150.0));
        assert_eq!(cam.to_canvas(250.0, 150.0), (300.0, 150.0));
    }

    #[test]
    fn roundtrip_through_layout_space() {
        let mut cam = Camera::new(800.0, 600.0);
        cam.pan(37.0, -12.0);
        cam.zoom_by(1.7);

        let (cx, cy) = cam.to_canvas(123.0, 456.0);
        let (x, y) = cam.to_layout(cx, cy);
        assert!((x - 123.0).abs() < 0.001);
        assert!((y - 456.0).abs() < 0.001);
    }

    #[test]
    fn pan_respects_zoom() {
        let mut cam = Camera::new(400.0, 300.0);
        cam.zoom_by(2.0);
        cam.pan(100.0, 50.0);
        assert_eq!(cam.offset_x, 50.0);
        assert_eq!(cam.offset_y, 25.0);
    }

    #[test]
    fn zoom_clamps() {
        let mut cam = Camera::new(400.0, 300.0);
        cam.zoom_by(0.001);
        assert_eq!(cam.zoom, 0.1);
        cam.zoom_by(1e6);
        assert_eq!(cam.zoom, 10.0);
    }

    #[test]
    fn reset_restores_identity() {
        let mut cam = Camera::new(400.0, 300.0);
        cam.pan(10.0, 10.0);
        cam.zoom_by(3.0);
        cam.reset();
        assert_eq!(cam.zoom, 1.0);
        assert_eq!(cam.to_canvas(17.0, 23.0), (17.0, 23.0));
    }

    #[test]
    fn fit_animation_converges_to_target() {
        let mut cam = Camera::new(800.0, 600.0);
        let mut bounds = Bounds::empty();
        bounds.include_circle(100.0, 100.0, 10.0);
        bounds.include_circle(300.0, 200.0, 10.0);
        cam.fit_to_bounds(&bounds, 20.0);

        for _ in 0..500 {
            if !cam.step_animation() {
                break;
            }
        }
        assert!(!cam.step_animation());
        // Bounds center (200, 150) now maps to the canvas center
        let (cx, cy) = cam.to_canvas(200.0, 150.0);
        assert!((cx - 400.0).abs() < 0.5);
        assert!((cy - 300.0).abs() < 0.5);
    }

    #[test]
    fn fit_with_empty_bounds_is_a_no_op() {
        let mut cam = Camera::new(800.0, 600.0);
        cam.fit_to_bounds(&Bounds::empty(), 20.0);
        assert!(!cam.step_animation());
        assert_eq!(cam.zoom, 1.0);
    }

    #[test]
    fn bounds_grow_to_cover_circles() {
        let mut bounds = Bounds::empty();
        assert!(bounds.is_empty());
        bounds.include_circle(10.0, 20.0, 5.0);
        bounds.include_circle(-10.0, 0.0, 5.0);
        assert_eq!(bounds.min_x, -15.0);
        assert_eq!(bounds.max_x, 15.0);
        assert_eq!(bounds.width(), 30.0);
        assert_eq!(bounds.center_y(), 7.5);
    }
}
