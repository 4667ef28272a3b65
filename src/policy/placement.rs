//! Reference placement and resize algorithms.
//!
//! These are the shared primitives concrete policies compose: anchor-relative
//! placement for menus and tooltips, the equal-width tiling partition,
//! resize clamping that keeps the anchored edge still, and bounds-constrained
//! dragging. They are pure geometry, with no registry access and no side
//! effects, so policies can apply them to whatever windows they decide to.

use crate::geometry::{Displacement, Point, Rectangle, Size};
use crate::window::{EdgeAttachment, SizeConstraints};

/// Place a child of `child_size` relative to an anchor rectangle
/// (`aux_rect`, in parent-local coordinates) inside `parent`, preferring the
/// requested edge attachment.
///
/// Candidates are taken at the anchor's corners for the requested axis
/// first, then the flipped axis; the first candidate fully inside `display`
/// wins. When nothing fits, the child is centered on the parent.
pub fn place_relative(
    parent: Rectangle,
    aux_rect: Rectangle,
    child_size: Size,
    attachment: EdgeAttachment,
    display: Rectangle,
) -> Point {
    // The anchor rectangle is parent-local; lift it into global coordinates.
    let anchor = Rectangle::new(
        Point::new(
            parent.top_left.x + aux_rect.top_left.x,
            parent.top_left.y + aux_rect.top_left.y,
        ),
        aux_rect.size,
    );

    let vertical = [
        // Below the anchor, left-aligned
        Point::new(anchor.top_left.x, anchor.bottom_right().y),
        // Above the anchor, left-aligned
        Point::new(anchor.top_left.x, anchor.top_left.y - child_size.height as i32),
        // Below, right-aligned
        Point::new(
            anchor.bottom_right().x - child_size.width as i32,
            anchor.bottom_right().y,
        ),
        // Above, right-aligned
        Point::new(
            anchor.bottom_right().x - child_size.width as i32,
            anchor.top_left.y - child_size.height as i32,
        ),
    ];
    let horizontal = [
        // Right of the anchor, top-aligned
        Point::new(anchor.bottom_right().x, anchor.top_left.y),
        // Left of the anchor, top-aligned
        Point::new(anchor.top_left.x - child_size.width as i32, anchor.top_left.y),
        // Right, bottom-aligned
        Point::new(
            anchor.bottom_right().x,
            anchor.bottom_right().y - child_size.height as i32,
        ),
        // Left, bottom-aligned
        Point::new(
            anchor.top_left.x - child_size.width as i32,
            anchor.bottom_right().y - child_size.height as i32,
        ),
    ];

    let ordered: Vec<Point> = match attachment {
        EdgeAttachment::Vertical => vertical.iter().chain(horizontal.iter()).copied().collect(),
        EdgeAttachment::Horizontal => horizontal.iter().chain(vertical.iter()).copied().collect(),
        EdgeAttachment::Any => vertical.iter().chain(horizontal.iter()).copied().collect(),
    };

    for candidate in ordered {
        let placed = Rectangle::new(candidate, child_size);
        if display.contains_rect(&placed) {
            return candidate;
        }
    }

    // Nothing fits: center on the parent.
    Point::new(
        parent.top_left.x + (parent.size.width as i32 - child_size.width as i32) / 2,
        parent.top_left.y + (parent.size.height as i32 - child_size.height as i32) / 2,
    )
}

/// Partition `bounds` into `count` equal-width vertical tiles. Integer
/// division remainders are distributed by the index arithmetic, so tiles
/// cover `bounds` exactly.
pub fn tile_partition(bounds: Rectangle, count: usize) -> Vec<Rectangle> {
    if count == 0 {
        return Vec::new();
    }

    let total_width = bounds.size.width as i64;
    (0..count)
        .map(|i| {
            let x = (total_width * i as i64 / count as i64) as i32;
            let next = (total_width * (i + 1) as i64 / count as i64) as i32;
            Rectangle::from_loc_and_size(
                (bounds.top_left.x + x, bounds.top_left.y),
                ((next - x) as u32, bounds.size.height),
            )
        })
        .collect()
}

/// Position for the `ordinal`-th top-level window within a tile: the first
/// fills the tile origin, later ones cascade by a fixed offset.
pub fn cascade_position(tile: Rectangle, ordinal: usize, offset: i32) -> Point {
    tile.top_left
        + Displacement::new(ordinal as i32 * offset, ordinal as i32 * offset)
}

/// Clip a window at `top_left` so it never exceeds its tile.
pub fn clip_to_tile(top_left: Point, size: Size, tile: Rectangle) -> Size {
    let offset = top_left - tile.top_left;
    let max_width = (tile.size.width as i32 - offset.dx).max(1) as u32;
    let max_height = (tile.size.height as i32 - offset.dy).max(1) as u32;
    Size::new(size.width.min(max_width), size.height.min(max_height))
}

/// Clamp a proposed resize to the window's size limits, zeroing the
/// position delta on any clamped axis so the anchored edge stays put
/// instead of the window jumping mid-drag.
///
/// `delta` is the proposed top-left displacement (non-zero when dragging
/// the left or top edge), `new_size` the proposed size; both are adjusted
/// in place. `floor` is the configured minimum below which no window may
/// shrink regardless of its own constraints.
pub fn keep_size_within_limits(
    constraints: &SizeConstraints,
    delta: &mut Displacement,
    new_size: &mut Size,
    floor: u32,
) {
    let min_width = constraints.min_width.max(floor);
    let min_height = constraints.min_height.max(floor);

    if new_size.width < min_width {
        new_size.width = min_width;
        if delta.dx > 0 {
            delta.dx = 0;
        }
    }
    if new_size.height < min_height {
        new_size.height = min_height;
        if delta.dy > 0 {
            delta.dy = 0;
        }
    }

    if new_size.width > constraints.max_width {
        new_size.width = constraints.max_width;
        if delta.dx < 0 {
            delta.dx = 0;
        }
    }
    if new_size.height > constraints.max_height {
        new_size.height = constraints.max_height;
        if delta.dy < 0 {
            delta.dy = 0;
        }
    }
}

/// Clamp a drag `movement` so `window` never leaves `bounds`; each axis is
/// clamped independently against the near and far edges.
pub fn constrained_move(window: Rectangle, movement: &mut Displacement, bounds: Rectangle) {
    let top_left = window.top_left;
    let bottom_right = window.bottom_right();

    if movement.dx < 0 {
        movement.dx = movement.dx.max(bounds.top_left.x - top_left.x);
    }
    if movement.dy < 0 {
        movement.dy = movement.dy.max(bounds.top_left.y - top_left.y);
    }
    if movement.dx > 0 {
        movement.dx = movement.dx.min(bounds.bottom_right().x - bottom_right.x);
    }
    if movement.dy > 0 {
        movement.dy = movement.dy.min(bounds.bottom_right().y - bottom_right.y);
    }
}
