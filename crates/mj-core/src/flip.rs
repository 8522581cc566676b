//! # Flip transition
//!
//! State machine behind the two-panel page turn of the viewer. The controller
//! owns the page index and decides when a turn may start; drawing and timing
//! belong to an [`AnimationEngine`], which receives a [`FlipPlan`] describing
//! three tweens (front panel, back panel, shadow) that all start at time zero.
//!
//! The page index only changes in [`FlipController::complete`], so the content
//! never changes mid-turn, and every completion resets the panels to rest.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Prev,
}

impl Direction {
    /// Sign of the front panel's target rotation.
    fn sign(&self) -> f32 {
        match self {
            Direction::Next => -1.0,
            Direction::Prev => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipState {
    Idle,
    Flipping(Direction),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Easing {
    Linear,
    /// Symmetric ease-in/ease-out of the given power (1 = quadratic, 2 = cubic).
    PowerInOut(u8),
}

impl Easing {
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match *self {
            Easing::Linear => t,
            Easing::PowerInOut(power) => {
                let exp = i32::from(power) + 1;
                if t < 0.5 {
                    0.5 * (2.0 * t).powi(exp)
                } else {
                    1.0 - 0.5 * (2.0 * (1.0 - t)).powi(exp)
                }
            }
        }
    }
}

/// One animated property going from `from` to `to`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    pub from: f32,
    pub to: f32,
    pub duration: Duration,
    pub easing: Easing,
    /// Plays forward then back once, doubling the run time.
    pub yoyo: bool,
}

impl Tween {
    pub fn total(&self) -> Duration {
        if self.yoyo {
            self.duration * 2
        } else {
            self.duration
        }
    }

    pub fn value_at(&self, elapsed: Duration) -> f32 {
        let leg = self.duration.as_secs_f32();
        if leg <= 0.0 {
            return if self.yoyo { self.from } else { self.to };
        }
        let mut t = elapsed.as_secs_f32() / leg;
        if self.yoyo {
            t = if t <= 1.0 { t } else { (2.0 - t).max(0.0) };
        }
        self.from + (self.to - self.from) * self.easing.apply(t)
    }
}

/// Timing parameters of a page turn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlipTiming {
    pub turn: Duration,
    pub turn_easing: Easing,
    /// Duration of one leg of the shadow fade.
    pub shadow: Duration,
    pub shadow_easing: Easing,
    pub shadow_peak: f32,
}

impl Default for FlipTiming {
    fn default() -> Self {
        Self {
            turn: Duration::from_millis(800),
            turn_easing: Easing::PowerInOut(2),
            shadow: Duration::from_millis(400),
            shadow_easing: Easing::PowerInOut(1),
            shadow_peak: 0.3,
        }
    }
}

/// Rotation (degrees) and opacity of the panels at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelFrame {
    pub front_rotation: f32,
    pub back_rotation: f32,
    pub shadow_opacity: f32,
    pub double_sided: bool,
}

impl PanelFrame {
    /// Baseline with every transform cleared.
    pub const REST: PanelFrame =
        PanelFrame { front_rotation: 0.0, back_rotation: 0.0, shadow_opacity: 0.0, double_sided: false };
}

/// Everything an engine needs to run one turn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlipPlan {
    pub direction: Direction,
    pub front: Tween,
    pub back: Tween,
    pub shadow: Tween,
}

impl FlipPlan {
    fn new(direction: Direction, timing: &FlipTiming) -> Self {
        let target = 180.0 * direction.sign();
        Self {
            direction,
            front: Tween { from: 0.0, to: target, duration: timing.turn, easing: timing.turn_easing, yoyo: false },
            back: Tween { from: -target, to: 0.0, duration: timing.turn, easing: timing.turn_easing, yoyo: false },
            shadow: Tween {
                from: 0.0,
                to: timing.shadow_peak,
                duration: timing.shadow,
                easing: timing.shadow_easing,
                yoyo: true,
            },
        }
    }

    /// Time until the last tween finishes.
    pub fn total(&self) -> Duration {
        self.front.total().max(self.back.total()).max(self.shadow.total())
    }

    /// Panel state `elapsed` into the turn; all tweens share time zero.
    pub fn frame_at(&self, elapsed: Duration) -> PanelFrame {
        PanelFrame {
            front_rotation: self.front.value_at(elapsed),
            back_rotation: self.back.value_at(elapsed),
            shadow_opacity: self.shadow.value_at(elapsed),
            double_sided: true,
        }
    }
}

/// Pluggable animation backend.
pub trait AnimationEngine {
    /// Starts running `plan`. Reports back through [`FlipController::complete`].
    fn play(&mut self, plan: &FlipPlan);
    /// Clears every transform so the next turn starts from [`PanelFrame::REST`].
    fn reset(&mut self);
}

#[derive(Debug, Clone)]
pub struct FlipController {
    page: usize,
    page_count: usize,
    state: FlipState,
    timing: FlipTiming,
}

impl FlipController {
    /// A controller resting on the first of `page_count` pages.
    pub fn new(page_count: usize) -> Self {
        Self { page: 0, page_count: page_count.max(1), state: FlipState::Idle, timing: FlipTiming::default() }
    }

    /// Starts on `page`, clamped into range.
    pub fn at(page_count: usize, page: usize) -> Self {
        let mut ctl = Self::new(page_count);
        ctl.page = page.min(ctl.page_count - 1);
        ctl
    }

    pub fn with_timing(mut self, timing: FlipTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn state(&self) -> FlipState {
        self.state
    }

    pub fn timing(&self) -> &FlipTiming {
        &self.timing
    }

    /// Whether a request in `direction` would start a turn right now.
    pub fn can_flip(&self, direction: Direction) -> bool {
        if self.state != FlipState::Idle {
            return false;
        }
        match direction {
            Direction::Next => self.page + 1 < self.page_count,
            Direction::Prev => self.page > 0,
        }
    }

    /// Starts a turn if allowed. Ignored requests return `None` and leave both
    /// the controller and the engine untouched.
    pub fn request(&mut self, direction: Direction, engine: &mut dyn AnimationEngine) -> Option<FlipPlan> {
        if !self.can_flip(direction) {
            log::trace!("flip {direction:?} ignored on page {} ({:?})", self.page, self.state);
            return None;
        }
        let plan = FlipPlan::new(direction, &self.timing);
        self.state = FlipState::Flipping(direction);
        engine.play(&plan);
        Some(plan)
    }

    pub fn request_next(&mut self, engine: &mut dyn AnimationEngine) -> Option<FlipPlan> {
        self.request(Direction::Next, engine)
    }

    pub fn request_prev(&mut self, engine: &mut dyn AnimationEngine) -> Option<FlipPlan> {
        self.request(Direction::Prev, engine)
    }

    /// Animation finished: move the index and return to rest. Returns the new
    /// page, or `None` if no turn was running.
    pub fn complete(&mut self, engine: &mut dyn AnimationEngine) -> Option<usize> {
        let FlipState::Flipping(direction) = self.state else {
            return None;
        };
        self.page = match direction {
            Direction::Next => self.page + 1,
            Direction::Prev => self.page - 1,
        };
        engine.reset();
        self.state = FlipState::Idle;
        Some(self.page)
    }
}

/// Status of a [`Timeline`] after advancing it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tick {
    Idle,
    Running(PanelFrame),
    Finished,
}

/// Clock-driven engine: the host advances it by frame deltas and calls
/// [`FlipController::complete`] once it reports [`Tick::Finished`].
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    plan: Option<FlipPlan>,
    elapsed: Duration,
}

impl Timeline {
    pub fn is_running(&self) -> bool {
        self.plan.is_some()
    }

    /// Current panel state; [`PanelFrame::REST`] when nothing runs.
    pub fn frame(&self) -> PanelFrame {
        match &self.plan {
            Some(plan) => plan.frame_at(self.elapsed),
            None => PanelFrame::REST,
        }
    }

    pub fn advance(&mut self, dt: Duration) -> Tick {
        let Some(plan) = &self.plan else {
            return Tick::Idle;
        };
        self.elapsed += dt;
        if self.elapsed >= plan.total() {
            Tick::Finished
        } else {
            Tick::Running(plan.frame_at(self.elapsed))
        }
    }
}

impl AnimationEngine for Timeline {
    fn play(&mut self, plan: &FlipPlan) {
        self.plan = Some(*plan);
        self.elapsed = Duration::ZERO;
    }

    fn reset(&mut self) {
        self.plan = None;
        self.elapsed = Duration::ZERO;
    }
}
