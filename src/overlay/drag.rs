//! Drag controller: turns raw touch input into overlay position updates.
//!
//! The controller is an explicit three-phase state machine:
//!
//! ```text
//! Idle --down--> Tracking --|dx| > T or |dy| > T--> Dragging
//!   ^                |                                  |
//!   +---up/cancel----+------------up/cancel-------------+
//! ```
//!
//! Crossing the threshold is one-way for the rest of the gesture. Release
//! from `Tracking` is a tap; release from `Dragging` only ends the drag.

use serde::{Deserialize, Serialize};

use super::placement::PositionOffset;

/// Touch action, mirroring `MotionEvent` action codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TouchAction {
    Down,
    Move,
    Up,
    Cancel,
}

impl TouchAction {
    /// Map an Android `MotionEvent.getActionMasked()` value.
    pub fn from_motion_event(action: i32) -> Option<Self> {
        match action {
            0 => Some(TouchAction::Down),
            1 => Some(TouchAction::Up),
            2 => Some(TouchAction::Move),
            3 => Some(TouchAction::Cancel),
            _ => None,
        }
    }
}

/// A single touch sample in raw screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchEvent {
    pub action: TouchAction,
    pub raw_x: f32,
    pub raw_y: f32,
}

impl TouchEvent {
    pub fn down(raw_x: f32, raw_y: f32) -> Self {
        Self {
            action: TouchAction::Down,
            raw_x,
            raw_y,
        }
    }

    pub fn moved(raw_x: f32, raw_y: f32) -> Self {
        Self {
            action: TouchAction::Move,
            raw_x,
            raw_y,
        }
    }

    pub fn up(raw_x: f32, raw_y: f32) -> Self {
        Self {
            action: TouchAction::Up,
            raw_x,
            raw_y,
        }
    }

    pub fn cancel() -> Self {
        Self {
            action: TouchAction::Cancel,
            raw_x: 0.0,
            raw_y: 0.0,
        }
    }
}

/// State captured at touch-down for the lifetime of one gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub origin: PositionOffset,
    pub start_touch_x: f32,
    pub start_touch_y: f32,
}

impl DragSession {
    fn displacement(&self, event: &TouchEvent) -> (f32, f32) {
        (
            event.raw_x - self.start_touch_x,
            event.raw_y - self.start_touch_y,
        )
    }

    /// Origin plus displacement, truncated toward zero like `Float.toInt()`.
    fn position_for(&self, dx: f32, dy: f32) -> PositionOffset {
        self.origin.offset_by(dx as i32, dy as i32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragPhase {
    #[default]
    Idle,
    Tracking(DragSession),
    Dragging(DragSession),
}

/// Result of feeding one touch event to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DragOutcome {
    /// Event arrived with no gesture in progress
    Ignored,
    /// Gesture started
    Pressed,
    /// Movement still within the threshold
    Tracking,
    /// Overlay should move to this position
    Moved { position: PositionOffset },
    /// Gesture released without ever dragging
    Tap,
    /// Drag released
    DragEnded,
}

impl DragOutcome {
    /// Stable integer code handed back across JNI.
    pub fn code(&self) -> i32 {
        match self {
            DragOutcome::Ignored => 0,
            DragOutcome::Pressed => 1,
            DragOutcome::Tracking => 2,
            DragOutcome::Moved { .. } => 3,
            DragOutcome::Tap => 4,
            DragOutcome::DragEnded => 5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DragController {
    phase: DragPhase,
    threshold: f32,
}

impl DragController {
    pub fn new(threshold: f32) -> Self {
        Self {
            phase: DragPhase::Idle,
            threshold,
        }
    }

    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, DragPhase::Dragging(_))
    }

    pub fn reset(&mut self) {
        self.phase = DragPhase::Idle;
    }

    /// Advance the state machine.
    ///
    /// `current` is the overlay position at the moment of the event; it is
    /// only read on touch-down, where it becomes the gesture origin.
    pub fn handle(&mut self, event: TouchEvent, current: PositionOffset) -> DragOutcome {
        match event.action {
            TouchAction::Down => {
                // A down without a preceding up restarts the gesture.
                self.phase = DragPhase::Tracking(DragSession {
                    origin: current,
                    start_touch_x: event.raw_x,
                    start_touch_y: event.raw_y,
                });
                DragOutcome::Pressed
            }
            TouchAction::Move => match self.phase {
                DragPhase::Idle => DragOutcome::Ignored,
                DragPhase::Tracking(session) => {
                    let (dx, dy) = session.displacement(&event);
                    if dx.abs() > self.threshold || dy.abs() > self.threshold {
                        self.phase = DragPhase::Dragging(session);
                        DragOutcome::Moved {
                            position: session.position_for(dx, dy),
                        }
                    } else {
                        DragOutcome::Tracking
                    }
                }
                DragPhase::Dragging(session) => {
                    let (dx, dy) = session.displacement(&event);
                    DragOutcome::Moved {
                        position: session.position_for(dx, dy),
                    }
                }
            },
            TouchAction::Up | TouchAction::Cancel => {
                let outcome = match self.phase {
                    DragPhase::Idle => DragOutcome::Ignored,
                    DragPhase::Tracking(_) => DragOutcome::Tap,
                    DragPhase::Dragging(_) => DragOutcome::DragEnded,
                };
                self.phase = DragPhase::Idle;
                outcome
            }
        }
    }
}
