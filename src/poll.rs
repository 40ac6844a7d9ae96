//! Polling deadline helper
//!
//! The chip signals readiness through status bits (CTS, STC) that the driver
//! polls for. [`Deadline`] tracks a time budget across those polls so that a
//! wedged chip turns into a timeout error instead of an endless loop.

/// A countdown over a millisecond budget, spent in small delay steps.
pub(crate) struct Deadline {
    remaining_us: u32,
}

impl Deadline {
    pub(crate) fn new(budget_ms: u32) -> Self {
        Self {
            remaining_us: budget_ms.saturating_mul(1_000),
        }
    }

    /// Sleeps for up to `step_us` and charges it against the budget.
    ///
    /// Returns `false` once the budget is exhausted.
    pub(crate) fn tick<D: embedded_hal::delay::DelayNs>(
        &mut self,
        delay: &mut D,
        step_us: u32,
    ) -> bool {
        if self.remaining_us == 0 {
            return false;
        }
        let step = step_us.min(self.remaining_us);
        delay.delay_us(step);
        self.remaining_us -= step;
        true
    }

    /// Async twin of [`tick`](Deadline::tick).
    pub(crate) async fn tick_async<D: embedded_hal_async::delay::DelayNs>(
        &mut self,
        delay: &mut D,
        step_us: u32,
    ) -> bool {
        if self.remaining_us == 0 {
            return false;
        }
        let step = step_us.min(self.remaining_us);
        delay.delay_us(step).await;
        self.remaining_us -= step;
        true
    }
}
