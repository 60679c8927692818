use gloo_timers::callback::Interval;

/// Something that can run a callback at a fixed period until cancelled.
pub trait PollScheduler {
    type Handle;

    /// Start calling `tick` every `period_ms`. `None` if the timer could not be created.
    fn schedule(&self, period_ms: u32, tick: Box<dyn Fn()>) -> Option<Self::Handle>;
    fn cancel(&self, handle: Self::Handle);
}

#[derive(Debug, PartialEq, Eq)]
pub enum TickOutcome<H> {
    /// Ticks remain; the loop stays armed.
    Continue,
    /// That was the last tick of the budget. Carries the released timer
    /// handle, which the caller must cancel.
    Exhausted(Option<H>),
}

/// Tick budget plus the single live timer handle.
#[derive(Debug)]
pub struct PollLoop<H> {
    remaining: u32,
    handle: Option<H>,
}

impl<H> Default for PollLoop<H> {
    fn default() -> Self {
        Self {
            remaining: 0,
            handle: None,
        }
    }
}

impl<H> PollLoop<H> {
    pub fn is_armed(&self) -> bool {
        self.handle.is_some()
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn set_budget(&mut self, ticks: u32) {
        self.remaining = ticks;
    }

    /// Install a timer if none is held. `start` is only called when unarmed.
    /// Returns whether a new timer was installed.
    pub fn arm(&mut self, start: impl FnOnce() -> Option<H>) -> bool {
        if self.handle.is_some() {
            return false;
        }
        self.handle = start();
        self.handle.is_some()
    }

    /// Spend one tick, disarming at zero.
    pub fn tick(&mut self) -> TickOutcome<H> {
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            TickOutcome::Exhausted(self.handle.take())
        } else {
            TickOutcome::Continue
        }
    }

    /// Release the handle. A no-op on an unarmed loop.
    pub fn disarm(&mut self) -> Option<H> {
        self.handle.take()
    }
}

/// Browser scheduler backed by `setInterval`. Dropping the `Interval` clears it.
pub struct IntervalScheduler;

impl PollScheduler for IntervalScheduler {
    type Handle = Interval;

    fn schedule(&self, period_ms: u32, tick: Box<dyn Fn()>) -> Option<Self::Handle> {
        Some(Interval::new(period_ms, move || tick()))
    }

    fn cancel(&self, handle: Self::Handle) {
        drop(handle.cancel());
    }
}
