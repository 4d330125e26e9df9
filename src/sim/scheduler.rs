//! Frame-driven tick scheduling
//!
//! The host calls [`FrameScheduler::frame`] once per display frame with the
//! elapsed wall time. The scheduler converts that into a whole number of fixed
//! ticks and stops for good once its [`Subscription`] is cancelled.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::session::{MatchSession, TickInput};
use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};

/// Whether the host should request another frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameControl {
    Continue,
    Stop,
}

/// Cancellation handle returned by [`FrameScheduler::subscribe`]
#[derive(Debug, Clone)]
pub struct Subscription {
    cancelled: Rc<Cell<bool>>,
}

impl Subscription {
    /// No tick starts after this returns
    pub fn cancel(&self) {
        if !self.cancelled.replace(true) {
            log::info!("Frame subscription cancelled");
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

/// Fixed-timestep accumulator driving a shared session
pub struct FrameScheduler {
    session: Rc<RefCell<MatchSession>>,
    /// Live input, written by the host between frames
    input: Rc<RefCell<TickInput>>,
    accumulator: f32,
    cancelled: Rc<Cell<bool>>,
}

impl FrameScheduler {
    pub fn subscribe(
        session: Rc<RefCell<MatchSession>>,
        input: Rc<RefCell<TickInput>>,
    ) -> (Self, Subscription) {
        let cancelled = Rc::new(Cell::new(false));
        let scheduler = Self {
            session,
            input,
            accumulator: 0.0,
            cancelled: cancelled.clone(),
        };
        (scheduler, Subscription { cancelled })
    }

    pub fn session(&self) -> &Rc<RefCell<MatchSession>> {
        &self.session
    }

    /// Run as many ticks as `dt` seconds allow
    pub fn frame(&mut self, dt: f32) -> FrameControl {
        if self.cancelled.get() {
            return FrameControl::Stop;
        }

        // A NaN would poison the accumulator forever
        let dt = if dt.is_finite() { dt } else { 0.0 };
        self.accumulator += dt.clamp(0.0, MAX_FRAME_DT);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            if self.cancelled.get() {
                return FrameControl::Stop;
            }

            let input = self.input.borrow().clone();
            self.session.borrow_mut().tick(&input);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            self.input.borrow_mut().pause = false;
        }

        // Too far behind: drop the backlog instead of spiralling
        if substeps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(SIM_DT);
        }

        FrameControl::Continue
    }
}
