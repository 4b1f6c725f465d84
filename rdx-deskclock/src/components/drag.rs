//! Pointer dragging of the window and the resize-grip hit test.

use crate::common::{Point, Rect, Size};
use crate::components::layout::Placement;

/// What a window-local point lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    /// The square resize grip in the bottom-right corner.
    Grip,
    Title,
    Time,
    Background,
}

/// How a pointer press was interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressOutcome {
    Drag,
    ResizeGrip,
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DragAnchor {
    pointer: Point,
    window: Point,
}

#[derive(Debug, Clone)]
pub struct DragController {
    grip_size: i32,
    anchor: Option<DragAnchor>,
    /// Set while the pointer that pressed the grip is still down.
    grip_held: bool,
}

impl DragController {
    pub fn new(grip_size: i32) -> Self {
        Self {
            grip_size,
            anchor: None,
            grip_held: false,
        }
    }

    /// Classifies a window-local point. The grip wins over the labels.
    pub fn hit_test(&self, local: Point, placement: &Placement, client: Size) -> HitTarget {
        let grip = Rect::new(
            Point::new(client.width - self.grip_size, client.height - self.grip_size),
            Size::new(self.grip_size, self.grip_size),
        );
        if grip.contains(local) {
            HitTarget::Grip
        } else if placement.title.contains(local) {
            HitTarget::Title
        } else if placement.time.contains(local) {
            HitTarget::Time
        } else {
            HitTarget::Background
        }
    }

    /// Starts a drag when a label is pressed and dragging is enabled.
    ///
    /// `pointer` is in screen coordinates, `window` is the window's current
    /// screen position.
    pub fn press(&mut self, target: HitTarget, pointer: Point, window: Point, dragging_enabled: bool) -> PressOutcome {
        self.anchor = None;
        self.grip_held = false;
        match target {
            HitTarget::Grip => {
                self.grip_held = true;
                PressOutcome::ResizeGrip
            }
            HitTarget::Title | HitTarget::Time if dragging_enabled => {
                self.anchor = Some(DragAnchor { pointer, window });
                PressOutcome::Drag
            }
            _ => PressOutcome::Ignored,
        }
    }

    /// The window position that keeps the anchor under the pointer, or
    /// `None` if no drag is active.
    pub fn drag_to(&self, pointer: Point, dragging_enabled: bool) -> Option<Point> {
        if !dragging_enabled {
            return None;
        }
        let anchor = self.anchor?;
        Some(anchor.window + (pointer - anchor.pointer))
    }

    /// Ends any drag or grip gesture. Returns `true` if the released press
    /// was on the resize grip.
    pub fn release(&mut self) -> bool {
        self.anchor = None;
        std::mem::take(&mut self.grip_held)
    }

    pub fn is_dragging(&self) -> bool {
        self.anchor.is_some()
    }

    pub fn is_holding_grip(&self) -> bool {
        self.grip_held
    }
}
