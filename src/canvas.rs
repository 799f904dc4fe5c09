use eframe::egui;
use egui::{Color32, ColorImage, Pos2, Rect, Stroke, TextureHandle, TextureOptions, Vec2};

use crate::controller::InputEvent;
use crate::geometry::{PatchRect, Point};
use crate::session::Session;

/// Accepted patches.
const PATCH_STROKE: Color32 = Color32::from_rgb(230, 40, 40);
/// Outline following the pointer.
const PREVIEW_STROKE: Color32 = Color32::from_rgb(40, 220, 60);
const STROKE_WIDTH: f32 = 2.0;

/// Displays the current image scaled to fit the available space and turns
/// pointer input over it into image-space [`InputEvent`]s.
pub struct PatchCanvas {
    texture: Option<TextureHandle>,
    /// Session generation the texture was built from.
    texture_generation: Option<u64>,
    pointer_inside: bool,
    pub last_image_rect: Option<Rect>,
}

impl Default for PatchCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl PatchCanvas {
    pub fn new() -> Self {
        Self {
            texture: None,
            texture_generation: None,
            pointer_inside: false,
            last_image_rect: None,
        }
    }

    /// Draw the canvas and return this frame's pointer events, in order.
    pub fn show(&mut self, ui: &mut egui::Ui, session: &Session) -> Vec<InputEvent> {
        self.sync_texture(ui.ctx(), session);

        let sense = egui::Sense::click().union(egui::Sense::hover());
        let (response, painter) = ui.allocate_painter(ui.available_size(), sense);
        let canvas_rect = response.rect;

        let bounds = session.controller().bounds();
        let image_rect = fit_rect(canvas_rect, bounds.width, bounds.height);
        self.last_image_rect = Some(image_rect);
        let zoom = zoom_for(image_rect, bounds.width);

        match &self.texture {
            Some(tex) => {
                let uv = Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));
                painter.image(tex.id(), image_rect, uv, Color32::WHITE);
            }
            None => {
                painter.rect_filled(image_rect, 0.0, Color32::from_gray(40));
                painter.text(
                    image_rect.center(),
                    egui::Align2::CENTER_CENTER,
                    "image could not be loaded",
                    egui::FontId::proportional(16.0),
                    Color32::LIGHT_GRAY,
                );
            }
        }

        for rect in session.selection().iter() {
            painter.rect_stroke(
                patch_to_screen(rect, image_rect, zoom),
                0.0,
                Stroke::new(STROKE_WIDTH, PATCH_STROKE),
            );
        }
        if let Some(preview) = session.controller().preview() {
            painter.rect_stroke(
                patch_to_screen(&preview, image_rect, zoom),
                0.0,
                Stroke::new(STROKE_WIDTH, PREVIEW_STROKE),
            );
        }

        // ---- Input ----
        let mut events = Vec::new();
        let hovered = response
            .hover_pos()
            .and_then(|pos| screen_to_image(pos, image_rect, zoom, bounds.width, bounds.height));

        match hovered {
            Some(p) => {
                events.push(InputEvent::PointerMoved(p));
                self.pointer_inside = true;
            }
            None if self.pointer_inside => {
                events.push(InputEvent::PointerLeft);
                self.pointer_inside = false;
            }
            None => {}
        }

        if let Some(p) = hovered {
            if response.clicked() {
                events.push(InputEvent::LeftClick);
            }
            if response.clicked_by(egui::PointerButton::Middle) {
                events.push(InputEvent::MiddleClick(p));
            }
        }

        events
    }

    /// Re-upload the texture whenever the session switched images.
    fn sync_texture(&mut self, ctx: &egui::Context, session: &Session) {
        if self.texture_generation == Some(session.generation()) {
            return;
        }
        self.texture_generation = Some(session.generation());
        self.texture = session.pixels().map(|pixels| {
            let rgba = pixels.to_rgba8();
            let size = [rgba.width() as usize, rgba.height() as usize];
            let color_image = ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
            ctx.load_texture("patch_source", color_image, TextureOptions::LINEAR)
        });
    }
}

/// Largest rect with the image's aspect ratio that fits in `canvas_rect`,
/// centred and rounded to whole screen pixels.
pub fn fit_rect(canvas_rect: Rect, width: u32, height: u32) -> Rect {
    if width == 0 || height == 0 {
        return Rect::from_center_size(canvas_rect.center(), Vec2::ZERO);
    }
    let zoom = (canvas_rect.width() / width as f32).min(canvas_rect.height() / height as f32);
    let size = Vec2::new(width as f32 * zoom, height as f32 * zoom);
    let temp = Rect::from_center_size(canvas_rect.center(), size);

    // Round to pixel boundaries to prevent sub-pixel rendering gaps
    Rect::from_min_size(
        Pos2::new(temp.min.x.round(), temp.min.y.round()),
        size,
    )
}

/// Screen pixels per image pixel for a fitted rect.
pub fn zoom_for(image_rect: Rect, width: u32) -> f32 {
    if width == 0 {
        return 1.0;
    }
    image_rect.width() / width as f32
}

/// Converts a screen position to image pixel coordinates; `None` outside the image.
pub fn screen_to_image(screen_pos: Pos2, image_rect: Rect, zoom: f32, width: u32, height: u32) -> Option<Point> {
    if zoom <= 0.0 || !image_rect.contains(screen_pos) {
        return None;
    }

    let rel_x = (screen_pos.x - image_rect.min.x) / zoom;
    let rel_y = (screen_pos.y - image_rect.min.y) / zoom;
    if rel_x < 0.0 || rel_y < 0.0 {
        return None;
    }

    let pixel_x = rel_x as u32;
    let pixel_y = rel_y as u32;
    (pixel_x < width && pixel_y < height).then(|| Point::new(pixel_x, pixel_y))
}

/// Screen rectangle covering a patch.
pub fn patch_to_screen(rect: &PatchRect, image_rect: Rect, zoom: f32) -> Rect {
    let min = image_rect.min + Vec2::new(rect.x as f32, rect.y as f32) * zoom;
    Rect::from_min_size(min, Vec2::splat(rect.size as f32 * zoom))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas() -> Rect {
        Rect::from_min_size(Pos2::ZERO, Vec2::new(900.0, 900.0))
    }

    #[test]
    fn test_fit_wide_image() {
        let r = fit_rect(canvas(), 1800, 900);
        assert_eq!(r.size(), Vec2::new(900.0, 450.0));
        assert_eq!(r.min, Pos2::new(0.0, 225.0));
        assert_eq!(zoom_for(r, 1800), 0.5);
    }

    #[test]
    fn test_fit_small_image_scales_up() {
        let r = fit_rect(canvas(), 300, 300);
        assert_eq!(r.size(), Vec2::new(900.0, 900.0));
        assert_eq!(zoom_for(r, 300), 3.0);
    }

    #[test]
    fn test_screen_to_image_round_trip() {
        let r = fit_rect(canvas(), 1800, 900);
        let zoom = zoom_for(r, 1800);
        assert_eq!(screen_to_image(Pos2::new(0.0, 225.0), r, zoom, 1800, 900), Some(Point::new(0, 0)));
        assert_eq!(screen_to_image(Pos2::new(450.0, 450.0), r, zoom, 1800, 900), Some(Point::new(900, 450)));
        assert_eq!(screen_to_image(Pos2::new(899.9, 674.9), r, zoom, 1800, 900), Some(Point::new(1799, 899)));
    }

    #[test]
    fn test_screen_to_image_outside() {
        let r = fit_rect(canvas(), 1800, 900);
        let zoom = zoom_for(r, 1800);
        assert_eq!(screen_to_image(Pos2::new(450.0, 100.0), r, zoom, 1800, 900), None);
        assert_eq!(screen_to_image(Pos2::new(450.0, 800.0), r, zoom, 1800, 900), None);
    }

    #[test]
    fn test_patch_to_screen() {
        let r = fit_rect(canvas(), 1800, 900);
        let screen = patch_to_screen(&PatchRect::new(200, 100, 512), r, 0.5);
        assert_eq!(screen.min, Pos2::new(100.0, 275.0));
        assert_eq!(screen.size(), Vec2::new(256.0, 256.0));
    }
}
