// SPDX-FileCopyrightText: 2025 Jens Pitkänen <jens.pitkanen@helsinki.fi>
//
// SPDX-License-Identifier: GPL-3.0-or-later

use arrayvec::ArrayVec;

use platform::{DrawSettings2D, Platform, Vertex2D};

/// A floating-point axis-aligned 2D rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// The horizontal coordinate of the top-left corner of the rectangle.
    pub x: f32,
    /// The vertical coordinate of the top-left corner of the rectangle.
    pub y: f32,
    /// The width of the rectangle.
    pub w: f32,
    /// The height of the rectangle.
    pub h: f32,
}

impl Rect {
    /// Creates a new [`Rect`] from a given top-left corner and dimensions.
    pub const fn xywh(x: f32, y: f32, w: f32, h: f32) -> Rect {
        Rect { x, y, w, h }
    }

    /// Returns true if the point is inside the rectangle. The left and top
    /// edges are inclusive, the right and bottom edges are not.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.x + self.w && y >= self.y && y < self.y + self.h
    }

    /// Returns the center point of the rectangle.
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }
}

const DISK_SEGMENTS: usize = 32;

/// Draws a filled disk as a 32-segment triangle fan, which is plenty for
/// translucent thumb-sized circles.
pub fn fill_disk(platform: &dyn Platform, cx: f32, cy: f32, r: f32, color: [u8; 4]) {
    let mut vertices = ArrayVec::<Vertex2D, { DISK_SEGMENTS + 1 }>::new();
    let mut indices = ArrayVec::<u32, { DISK_SEGMENTS * 3 }>::new();

    vertices.push(Vertex2D::colored(cx, cy, color));
    for i in 0..DISK_SEGMENTS {
        let angle = (i as f32 / DISK_SEGMENTS as f32) * core::f32::consts::TAU;
        vertices.push(Vertex2D::colored(
            cx + angle.cos() * r,
            cy + angle.sin() * r,
            color,
        ));
    }
    for i in 0..DISK_SEGMENTS as u32 {
        indices.push(0);
        indices.push(1 + i);
        indices.push(1 + (i + 1) % DISK_SEGMENTS as u32);
    }

    platform.draw_2d(&vertices, &indices, DrawSettings2D::default());
}

/// Draws a filled axis-aligned rectangle.
pub fn fill_rect(platform: &dyn Platform, rect: &Rect, color: [u8; 4]) {
    let vertices = [
        Vertex2D::colored(rect.x, rect.y, color),
        Vertex2D::colored(rect.x + rect.w, rect.y, color),
        Vertex2D::colored(rect.x + rect.w, rect.y + rect.h, color),
        Vertex2D::colored(rect.x, rect.y + rect.h, color),
    ];
    let indices = [0, 1, 2, 2, 3, 0];
    platform.draw_2d(&vertices, &indices, DrawSettings2D::default());
}
