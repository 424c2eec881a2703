/// Animation scheduler: plays world transitions back as eased frames.
///
/// ## Frame driving
///
/// The queue never reads a clock. It asks its `FrameDriver` for a frame
/// whenever it has work, and the owner calls `on_frame(timestamp_ms)` when
/// that frame comes due. The terminal build drives frames from the main
/// loop (`TerminalFrames`); tests use a recording driver and hand-picked
/// timestamps.
///
/// ## Ordering
///
/// Transitions play strictly in enqueue order, one at a time. The start
/// time of a transition is latched on the first frame it sees. `clear()`
/// cancels the outstanding frame request and drops everything, with no
/// final frame for the interrupted transition.

use std::collections::VecDeque;
use std::f64::consts::{PI, TAU};

use crate::domain::entity::Character;

pub type FrameId = u64;

pub trait FrameDriver {
    /// Schedule one frame. The owner delivers it via `on_frame`.
    fn request_frame(&mut self) -> FrameId;
    fn cancel_frame(&mut self, id: FrameId);
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AnimKind {
    Move,
    Turn,
}

/// One pose change: a step (`Move`) or a rotation in place (`Turn`).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Transition {
    pub kind: AnimKind,
    pub from: Character,
    pub to: Character,
}

impl Transition {
    /// Transition between two poses, or `None` if nothing visible changed.
    pub fn between(from: Character, to: Character) -> Option<Self> {
        let kind = if from.pos != to.pos {
            AnimKind::Move
        } else if from.direction != to.direction {
            AnimKind::Turn
        } else {
            return None;
        };
        Some(Transition { kind, from, to })
    }
}

/// One interpolated frame. `progress` is already eased.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct AnimFrame {
    pub transition: Transition,
    pub progress: f64,
}

impl AnimFrame {
    /// Interpolated grid position. Turns stay on their cell.
    pub fn position(&self) -> (f64, f64) {
        let Transition { kind, from, to } = self.transition;
        match kind {
            AnimKind::Move => (
                lerp(from.pos.x as f64, to.pos.x as f64, self.progress),
                lerp(from.pos.y as f64, to.pos.y as f64, self.progress),
            ),
            AnimKind::Turn => (from.pos.x as f64, from.pos.y as f64),
        }
    }

    /// Interpolated facing in radians, taking the shorter way round.
    pub fn angle(&self) -> f64 {
        let from = self.transition.from.direction.angle();
        let to = self.transition.to.direction.angle();
        let mut delta = to - from;
        if delta > PI {
            delta -= TAU;
        } else if delta < -PI {
            delta += TAU;
        }
        from + delta * self.progress
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

pub fn ease_out(t: f64) -> f64 {
    1.0 - (1.0 - t) * (1.0 - t)
}

pub struct AnimationQueue<D: FrameDriver> {
    driver: D,
    queue: VecDeque<Transition>,
    current: Option<Transition>,
    started_at: Option<f64>,
    pending: Option<FrameId>,
    move_ms: f64,
    turn_ms: f64,
}

impl<D: FrameDriver> AnimationQueue<D> {
    pub fn new(driver: D, move_ms: u64, turn_ms: u64) -> Self {
        AnimationQueue {
            driver,
            queue: VecDeque::new(),
            current: None,
            started_at: None,
            pending: None,
            move_ms: move_ms as f64,
            turn_ms: turn_ms as f64,
        }
    }

    pub fn enqueue(&mut self, transition: Transition) {
        self.queue.push_back(transition);
        if self.current.is_none() {
            self.advance();
        }
    }

    fn advance(&mut self) {
        self.started_at = None;
        self.current = self.queue.pop_front();
        self.pending = match self.current {
            Some(_) => Some(self.driver.request_frame()),
            None => None,
        };
    }

    /// Deliver a due frame. Returns `None` when idle, otherwise the eased
    /// frame for the active transition. The frame that reaches full progress
    /// also starts the next queued transition.
    pub fn on_frame(&mut self, timestamp_ms: f64) -> Option<AnimFrame> {
        let transition = self.current?;
        self.pending = None;
        let start = *self.started_at.get_or_insert(timestamp_ms);

        let duration = match transition.kind {
            AnimKind::Move => self.move_ms,
            AnimKind::Turn => self.turn_ms,
        };
        let raw = if duration <= 0.0 {
            1.0
        } else {
            ((timestamp_ms - start) / duration).clamp(0.0, 1.0)
        };
        let frame = AnimFrame { transition, progress: ease_out(raw) };

        if raw < 1.0 {
            self.pending = Some(self.driver.request_frame());
        } else {
            self.advance();
        }
        Some(frame)
    }

    pub fn clear(&mut self) {
        if let Some(id) = self.pending.take() {
            self.driver.cancel_frame(id);
        }
        self.queue.clear();
        self.current = None;
        self.started_at = None;
    }

    pub fn is_animating(&self) -> bool {
        self.current.is_some() || !self.queue.is_empty()
    }

    pub fn current(&self) -> Option<&Transition> {
        self.current.as_ref()
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }
}

// ── Terminal frame driver ──

/// Frames are delivered on the main loop's next tick.
#[derive(Debug, Default)]
pub struct TerminalFrames {
    next_id: FrameId,
    pending: Option<FrameId>,
}

impl TerminalFrames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the outstanding request, if any. The caller then runs
    /// `on_frame` with the current time.
    pub fn take_due(&mut self) -> Option<FrameId> {
        self.pending.take()
    }
}

impl FrameDriver for TerminalFrames {
    fn request_frame(&mut self) -> FrameId {
        self.next_id += 1;
        self.pending = Some(self.next_id);
        self.next_id
    }

    fn cancel_frame(&mut self, id: FrameId) {
        if self.pending == Some(id) {
            self.pending = None;
        }
    }
}
