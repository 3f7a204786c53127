// Skeleton overlay rendering - draws confident keypoints and bones onto an RGBA canvas

use crate::core::keypoint_query::has_confidence;
use crate::models::pose::{Frame, Keypoint, DEFAULT_MIN_SCORE, SKELETON_CONNECTIONS};
use image::{imageops, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Overlay appearance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub color: [u8; 4],    // RGBA, default aqua
    pub line_width: u32,   // Bone thickness in pixels (default: 2)
    pub point_radius: u32, // Keypoint dot radius in pixels (default: 4)
    pub min_score: f32,    // Keypoints at or below this score are not drawn
    pub mirror: bool,      // Flip horizontally to match the mirrored camera preview
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            color: [0, 255, 255, 255],
            line_width: 2,
            point_radius: 4,
            min_score: DEFAULT_MIN_SCORE,
            mirror: true,
        }
    }
}

impl RenderConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.line_width == 0 || self.line_width > 64 {
            return Err(format!(
                "Invalid line width: {}. Must be between 1 and 64",
                self.line_width
            ));
        }
        if self.point_radius == 0 || self.point_radius > 64 {
            return Err(format!(
                "Invalid point radius: {}. Must be between 1 and 64",
                self.point_radius
            ));
        }
        if !(0.0..=1.0).contains(&self.min_score) {
            return Err(format!(
                "Invalid render min score: {}. Must be between 0.0 and 1.0",
                self.min_score
            ));
        }
        Ok(())
    }
}

/// Draws the pose skeleton for a single frame
#[derive(Debug, Clone, Default)]
pub struct SkeletonRenderer {
    config: RenderConfig,
}

impl SkeletonRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Render keypoints and bones on a transparent canvas of the given size
    pub fn render_overlay(&self, frame: &Frame, width: u32, height: u32) -> RgbaImage {
        let mut canvas = RgbaImage::new(width, height);
        let points = self.draw_keypoints(&mut canvas, frame);
        let bones = self.draw_skeleton(&mut canvas, frame);

        if self.config.mirror {
            imageops::flip_horizontal_in_place(&mut canvas);
        }

        debug!(points, bones, width, height, "Rendered skeleton overlay");
        canvas
    }

    /// Draw a dot for every keypoint above the score gate; returns how many were drawn
    pub fn draw_keypoints(&self, canvas: &mut RgbaImage, frame: &Frame) -> usize {
        let color = Rgba(self.config.color);
        let radius = self.config.point_radius as f32;

        let mut drawn = 0;
        for keypoint in frame.keypoints() {
            if has_confidence(Some(keypoint), self.config.min_score) {
                fill_circle(canvas, keypoint.x, keypoint.y, radius, color);
                drawn += 1;
            }
        }
        drawn
    }

    /// Draw every bone whose endpoints both pass the score gate; returns how many were drawn
    pub fn draw_skeleton(&self, canvas: &mut RgbaImage, frame: &Frame) -> usize {
        let color = Rgba(self.config.color);

        let mut drawn = 0;
        for (from, to) in SKELETON_CONNECTIONS {
            let (Some(a), Some(b)) = (
                self.visible(frame.keypoint(from)),
                self.visible(frame.keypoint(to)),
            ) else {
                continue;
            };
            draw_line(canvas, (a.x, a.y), (b.x, b.y), self.config.line_width, color);
            drawn += 1;
        }
        drawn
    }

    fn visible<'a>(&self, keypoint: Option<&'a Keypoint>) -> Option<&'a Keypoint> {
        keypoint.filter(|kp| has_confidence(Some(*kp), self.config.min_score))
    }
}

// ==============================================================================
// Raster helpers
// ==============================================================================

/// Fill a disc, clipped to the canvas
fn fill_circle(canvas: &mut RgbaImage, cx: f32, cy: f32, radius: f32, color: Rgba<u8>) {
    let (width, height) = canvas.dimensions();
    if width == 0 || height == 0 || !cx.is_finite() || !cy.is_finite() {
        return;
    }

    let min_x = (cx - radius).floor().max(0.0);
    let max_x = (cx + radius).ceil().min(width as f32 - 1.0);
    let min_y = (cy - radius).floor().max(0.0);
    let max_y = (cy + radius).ceil().min(height as f32 - 1.0);
    if min_x > max_x || min_y > max_y {
        return;
    }

    let radius_sq = radius * radius;
    for y in (min_y as u32)..=(max_y as u32) {
        for x in (min_x as u32)..=(max_x as u32) {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            if dx * dx + dy * dy <= radius_sq {
                canvas.put_pixel(x, y, color);
            }
        }
    }
}

/// Clip a segment to an axis-aligned box (Liang-Barsky); `None` when it lies fully outside
fn clip_segment(
    from: (f32, f32),
    to: (f32, f32),
    min: (f32, f32),
    max: (f32, f32),
) -> Option<((f32, f32), (f32, f32))> {
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let mut t0 = 0.0f32;
    let mut t1 = 1.0f32;

    for (p, q) in [
        (-dx, from.0 - min.0),
        (dx, max.0 - from.0),
        (-dy, from.1 - min.1),
        (dy, max.1 - from.1),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }

    Some((
        (from.0 + dx * t0, from.1 + dy * t0),
        (from.0 + dx * t1, from.1 + dy * t1),
    ))
}

/// Draw a thick segment by stamping discs along its on-canvas part
fn draw_line(canvas: &mut RgbaImage, from: (f32, f32), to: (f32, f32), width: u32, color: Rgba<u8>) {
    let (canvas_w, canvas_h) = canvas.dimensions();
    if canvas_w == 0 || canvas_h == 0 {
        return;
    }
    if ![from.0, from.1, to.0, to.1].iter().all(|v| v.is_finite()) {
        return;
    }

    // Discs centred just outside the canvas still reach its edge
    let radius = (width as f32 / 2.0).max(0.5);
    let Some((from, to)) = clip_segment(
        from,
        to,
        (-radius, -radius),
        (canvas_w as f32 - 1.0 + radius, canvas_h as f32 - 1.0 + radius),
    ) else {
        return;
    };

    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let length = (dx * dx + dy * dy).sqrt();
    // Half-pixel spacing; the clipped length is bounded by the canvas diagonal
    let steps = ((length * 2.0).ceil() as u32).max(1);

    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        fill_circle(canvas, from.0 + dx * t, from.1 + dy * t, radius, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::pose::BodyKeypoint;

    const AQUA: Rgba<u8> = Rgba([0, 255, 255, 255]);
    const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

    fn unmirrored() -> SkeletonRenderer {
        SkeletonRenderer::new(RenderConfig {
            mirror: false,
            ..RenderConfig::default()
        })
    }

    #[test]
    fn test_draws_confident_keypoints_only() {
        let frame = Frame::new(vec![
            Keypoint::scored(BodyKeypoint::Nose, 10.0, 10.0, 0.9),
            Keypoint::scored(BodyKeypoint::LeftEye, 50.0, 10.0, 0.3),
            Keypoint::new("right_eye", 80.0, 10.0, None),
        ]);

        let canvas = unmirrored().render_overlay(&frame, 100, 100);
        assert_eq!(*canvas.get_pixel(10, 10), AQUA);
        assert_eq!(*canvas.get_pixel(50, 10), CLEAR);
        assert_eq!(*canvas.get_pixel(80, 10), CLEAR);
    }

    #[test]
    fn test_mirrored_overlay() {
        let frame = Frame::new(vec![Keypoint::scored(BodyKeypoint::Nose, 10.0, 10.0, 0.9)]);

        let canvas = SkeletonRenderer::default().render_overlay(&frame, 100, 100);
        assert_eq!(*canvas.get_pixel(89, 10), AQUA);
        assert_eq!(*canvas.get_pixel(10, 10), CLEAR);
    }

    #[test]
    fn test_bone_requires_both_endpoints() {
        let renderer = unmirrored();

        let both = Frame::new(vec![
            Keypoint::scored(BodyKeypoint::LeftShoulder, 10.0, 50.0, 0.9),
            Keypoint::scored(BodyKeypoint::LeftElbow, 60.0, 50.0, 0.9),
        ]);
        let mut canvas = RgbaImage::new(100, 100);
        assert_eq!(renderer.draw_skeleton(&mut canvas, &both), 1);
        assert_eq!(*canvas.get_pixel(35, 50), AQUA);

        let one = Frame::new(vec![
            Keypoint::scored(BodyKeypoint::LeftShoulder, 10.0, 50.0, 0.9),
            Keypoint::scored(BodyKeypoint::LeftElbow, 60.0, 50.0, 0.2),
        ]);
        let canvas = renderer.render_overlay(&one, 100, 100);
        assert_eq!(*canvas.get_pixel(35, 50), CLEAR);
        assert_eq!(*canvas.get_pixel(10, 50), AQUA);
    }

    #[test]
    fn test_full_skeleton_draws_every_bone() {
        let keypoints = BodyKeypoint::ALL
            .iter()
            .enumerate()
            .map(|(i, kind)| Keypoint::scored(*kind, 10.0 + i as f32 * 5.0, 20.0 + i as f32 * 3.0, 0.8))
            .collect();
        let frame = Frame::new(keypoints);

        let renderer = unmirrored();
        let mut canvas = RgbaImage::new(200, 200);
        assert_eq!(renderer.draw_keypoints(&mut canvas, &frame), 17);
        assert_eq!(renderer.draw_skeleton(&mut canvas, &frame), SKELETON_CONNECTIONS.len());
    }

    #[test]
    fn test_long_bone_is_continuous_on_canvas() {
        let frame = Frame::new(vec![
            Keypoint::scored(BodyKeypoint::LeftShoulder, -100000.0, 50.0, 0.9),
            Keypoint::scored(BodyKeypoint::LeftElbow, 99.0, 50.0, 0.9),
        ]);

        let mut canvas = RgbaImage::new(100, 100);
        assert_eq!(unmirrored().draw_skeleton(&mut canvas, &frame), 1);
        for x in 0..100 {
            assert_eq!(*canvas.get_pixel(x, 50), AQUA, "gap at x = {}", x);
        }
        assert_eq!(*canvas.get_pixel(50, 60), CLEAR);
    }

    #[test]
    fn test_bone_crossing_canvas_diagonally() {
        let mut canvas = RgbaImage::new(100, 100);
        draw_line(&mut canvas, (-1e6, -1e6), (1e6, 1e6), 2, AQUA);
        for i in 0..100 {
            assert_eq!(*canvas.get_pixel(i, i), AQUA, "gap at ({}, {})", i, i);
        }

        // Entirely outside: nothing drawn
        let mut canvas = RgbaImage::new(100, 100);
        draw_line(&mut canvas, (-500.0, -10.0), (500.0, -10.0), 2, AQUA);
        assert!(canvas.pixels().all(|p| *p == CLEAR));
    }

    #[test]
    fn test_default_gate_matches_lookup_score() {
        assert_eq!(RenderConfig::default().min_score, DEFAULT_MIN_SCORE);
    }

    #[test]
    fn test_out_of_bounds_points_are_clipped() {
        let frame = Frame::new(vec![
            Keypoint::scored(BodyKeypoint::LeftHip, -500.0, 2000.0, 0.9),
            Keypoint::scored(BodyKeypoint::RightHip, f32::NAN, 10.0, 0.9),
            Keypoint::scored(BodyKeypoint::LeftKnee, 1e9, -1e9, 0.9),
        ]);
        let canvas = SkeletonRenderer::default().render_overlay(&frame, 64, 48);
        assert_eq!(canvas.dimensions(), (64, 48));

        let empty = SkeletonRenderer::default().render_overlay(&frame, 0, 0);
        assert_eq!(empty.dimensions(), (0, 0));
    }

    #[test]
    fn test_render_config_validation() {
        assert!(RenderConfig::default().validate().is_ok());

        let config = RenderConfig {
            point_radius: 0,
            ..RenderConfig::default()
        };
        assert!(config.validate().is_err());

        let config = RenderConfig {
            min_score: 2.0,
            ..RenderConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
