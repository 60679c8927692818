use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use tracing::{debug, error, info, warn};
use vrp_live_shared::SolutionSnapshot;

use crate::config::ClientConfig;
use crate::notifications::NotificationCenter;
use crate::polling::{PollLoop, PollScheduler, TickOutcome};
use crate::renderer::SnapshotRenderer;
use crate::surface::RenderSurface;
use crate::transport::{ClientError, SolverTransport};
use crate::view_model::{Dashboard, RunState};

/// Runs a future to completion on the UI thread.
pub type Spawner = Rc<dyn Fn(LocalBoxFuture<'static, ()>)>;

/// Collaborators handed to [`Controller::new`].
pub struct ControllerParts<T, R, D, S> {
    pub config: ClientConfig,
    pub transport: T,
    pub surface: R,
    pub dashboard: D,
    pub scheduler: S,
    pub spawner: Spawner,
}

struct Inner<T, R: RenderSurface, D, S: PollScheduler> {
    config: ClientConfig,
    transport: T,
    surface: RefCell<R>,
    dashboard: D,
    scheduler: S,
    spawner: Spawner,
    run_state: Cell<RunState>,
    poll: RefCell<PollLoop<S::Handle>>,
    renderer: RefCell<SnapshotRenderer<R::Marker>>,
    notifications: RefCell<NotificationCenter>,
    /// Sequence number of the last status request sent.
    issued_seq: Cell<u64>,
    /// Sequence number of the newest response rendered.
    applied_seq: Cell<u64>,
    /// Last request issued before the most recent start or stop. Responses
    /// at or below it describe the previous run and are never rendered.
    barrier_seq: Cell<u64>,
}

/// Owns the solver run state and the polling loop, and feeds status snapshots
/// to the renderer. Cheap to clone; clones share one session.
///
/// No `RefCell` borrow is held across an `.await`, so overlapping requests
/// never observe a borrowed cell.
pub struct Controller<T, R: RenderSurface, D, S: PollScheduler> {
    inner: Rc<Inner<T, R, D, S>>,
}

impl<T, R: RenderSurface, D, S: PollScheduler> Clone for Controller<T, R, D, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T, R, D, S> Controller<T, R, D, S>
where
    T: SolverTransport + 'static,
    R: RenderSurface + 'static,
    D: Dashboard + 'static,
    S: PollScheduler + 'static,
{
    pub fn new(parts: ControllerParts<T, R, D, S>) -> Self {
        let ControllerParts {
            config,
            transport,
            surface,
            dashboard,
            scheduler,
            spawner,
        } = parts;
        Self {
            inner: Rc::new(Inner {
                config,
                transport,
                surface: RefCell::new(surface),
                dashboard,
                scheduler,
                spawner,
                run_state: Cell::new(RunState::Idle),
                poll: RefCell::new(PollLoop::default()),
                renderer: RefCell::new(SnapshotRenderer::default()),
                notifications: RefCell::new(NotificationCenter::default()),
                issued_seq: Cell::new(0),
                applied_seq: Cell::new(0),
                barrier_seq: Cell::new(0),
            }),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn run_state(&self) -> RunState {
        self.inner.run_state.get()
    }

    pub fn is_polling(&self) -> bool {
        self.inner.poll.borrow().is_armed()
    }

    pub fn remaining_ticks(&self) -> u32 {
        self.inner.poll.borrow().remaining()
    }

    #[cfg(test)]
    pub fn notifications(&self) -> Vec<crate::notifications::Notification> {
        self.inner.notifications.borrow().open().to_vec()
    }

    /// Initial page load: show idle controls and render whatever the service
    /// currently holds. A solve already in progress arms the loop through
    /// the render path.
    pub async fn load(&self) {
        self.inner.dashboard.show_run_state(self.run_state());
        self.refresh().await;
    }

    pub async fn request_start(&self) {
        match self.inner.transport.start_solving().await {
            Ok(()) => {
                info!("solver started");
                self.raise_barrier();
                self.set_run_state(true);
                self.inner
                    .poll
                    .borrow_mut()
                    .set_budget(self.inner.config.start_tick_budget);
                self.arm();
            }
            Err(err) => self.report(err),
        }
    }

    pub async fn request_stop(&self) {
        match self.inner.transport.stop_solving().await {
            Ok(()) => {
                info!("solver stopped");
                self.raise_barrier();
                self.stop_polling();
                self.set_run_state(false);
                self.refresh().await;
            }
            Err(err) => self.report(err),
        }
    }

    /// Update the controls for `solving`. Entering Solving resets the budget
    /// to the catch-up value. Returns whether this call entered Solving.
    pub fn set_run_state(&self, solving: bool) -> bool {
        let next = RunState::from_solving(solving);
        let previous = self.inner.run_state.replace(next);
        self.inner.dashboard.show_run_state(next);

        let entered = previous == RunState::Idle && next == RunState::Solving;
        if entered {
            self.inner
                .poll
                .borrow_mut()
                .set_budget(self.inner.config.catch_up_tick_budget);
        }
        entered
    }

    /// Status requests already in flight belong to the previous run.
    fn raise_barrier(&self) {
        self.inner.barrier_seq.set(self.inner.issued_seq.get());
    }

    /// Fetch one status snapshot and render it unless a newer one already was,
    /// or it was requested before the last start or stop.
    pub async fn refresh(&self) {
        let seq = self.inner.issued_seq.get() + 1;
        self.inner.issued_seq.set(seq);

        match self.inner.transport.fetch_status().await {
            Ok(snapshot) => {
                let applied = self.inner.applied_seq.get();
                let barrier = self.inner.barrier_seq.get();
                if seq <= applied.max(barrier) {
                    debug!(seq, applied, barrier, "dropping stale status response");
                    return;
                }
                self.inner.applied_seq.set(seq);
                self.render(&snapshot);
            }
            Err(err) => self.report(err),
        }
    }

    fn render(&self, snapshot: &SolutionSnapshot) {
        let output = {
            let mut surface = self.inner.surface.borrow_mut();
            self.inner
                .renderer
                .borrow_mut()
                .render(snapshot, &mut *surface)
        };
        debug!(
            best = snapshot.id_best_solution,
            vehicles = output.vehicles.len(),
            solving = snapshot.solving,
            "rendered snapshot"
        );

        let dashboard = &self.inner.dashboard;
        dashboard.show_vehicles(output.vehicles);
        dashboard.show_depots(output.depots);
        dashboard.show_summary(output.summary);

        if self.set_run_state(snapshot.solving) && !self.is_polling() {
            info!("solver already running, catching up");
            self.arm();
        }
    }

    async fn tick(&self) {
        // A tick queued just before a disarm.
        if !self.is_polling() {
            return;
        }
        let outcome = self.inner.poll.borrow_mut().tick();
        if let TickOutcome::Exhausted(handle) = outcome {
            if let Some(handle) = handle {
                self.inner.scheduler.cancel(handle);
            }
            info!("poll budget spent");
            self.set_run_state(false);
        }
        self.refresh().await;
    }

    fn arm(&self) {
        let period = self.inner.config.poll_interval_ms;
        let weak = Rc::downgrade(&self.inner);
        let scheduler = &self.inner.scheduler;

        let armed = self
            .inner
            .poll
            .borrow_mut()
            .arm(|| scheduler.schedule(period, Box::new(move || spawn_tick(&weak))));

        if armed {
            debug!(period, remaining = self.remaining_ticks(), "polling armed");
        } else if !self.is_polling() {
            warn!(period, "could not schedule status polling");
        }
    }

    /// Cancel the polling timer. Safe to call when nothing is armed.
    pub fn stop_polling(&self) {
        let handle = self.inner.poll.borrow_mut().disarm();
        if let Some(handle) = handle {
            self.inner.scheduler.cancel(handle);
            debug!("polling disarmed");
        }
    }

    fn report(&self, err: ClientError) {
        error!(diagnostic = err.diagnostic(), "{err}");
        let open = {
            let mut center = self.inner.notifications.borrow_mut();
            center.push(&err);
            center.open().to_vec()
        };
        self.inner.dashboard.show_notifications(open);
    }

    pub fn dismiss_notification(&self, id: u64) -> bool {
        let (dismissed, open) = {
            let mut center = self.inner.notifications.borrow_mut();
            let dismissed = center.dismiss(id);
            (dismissed, center.open().to_vec())
        };
        if dismissed {
            self.inner.dashboard.show_notifications(open);
        }
        dismissed
    }
}

/// Timer callback. Only spawns, so the timer is never cancelled from inside
/// its own callback.
fn spawn_tick<T, R, D, S>(weak: &Weak<Inner<T, R, D, S>>)
where
    T: SolverTransport + 'static,
    R: RenderSurface + 'static,
    D: Dashboard + 'static,
    S: PollScheduler + 'static,
{
    let Some(inner) = weak.upgrade() else {
        return;
    };
    let spawn = Rc::clone(&inner.spawner);
    let controller = Controller { inner };
    spawn(async move { controller.tick().await }.boxed_local());
}
