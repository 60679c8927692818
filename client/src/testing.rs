//! In-memory stand-ins for the browser collaborators.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use futures::channel::oneshot;
use vrp_live_shared::{
    Bounds, Coordinate, Customer, Depot, DepotRef, EntityId, Solution, SolutionSnapshot, Vehicle,
};

use crate::notifications::Notification;
use crate::polling::PollScheduler;
use crate::surface::{MarkerIcon, MarkerKind, Popup, RenderSurface};
use crate::transport::{ClientError, SolverTransport};
use crate::view_model::{Dashboard, DepotRow, RunState, SummaryFields, VehicleRow};

pub const DEPOT_LOCATION: Coordinate = Coordinate::new(49.4607, 11.0833);

pub fn default_bounds() -> Bounds {
    Bounds {
        south_west: Coordinate::new(49.43, 11.03),
        north_east: Coordinate::new(49.49, 11.13),
    }
}

fn customer(id: EntityId, demand: i64, location: Coordinate) -> Customer {
    Customer {
        id,
        location,
        demand,
        begin_service_window: 28_800,
        end_service_window: 36_000,
        service_time: 600,
    }
}

fn vehicle(id: EntityId, customers: &[EntityId], route: Vec<Coordinate>) -> Vehicle {
    Vehicle {
        id,
        depot: DepotRef { id: 1 },
        capacity: 20,
        fix_cost: 10_000,
        total_demand: if customers.is_empty() { 0 } else { 10 },
        total_distance_meters: if customers.is_empty() { 0 } else { 2_345 },
        total_time: if customers.is_empty() { 0 } else { 777 },
        no_customers: None,
        customer_ids: customers.to_vec(),
        route,
    }
}

/// One depot, two customers, a fleet of two with one vehicle in use.
pub fn snapshot_with_bounds(best: i64, bounds: Option<Bounds>) -> SolutionSnapshot {
    let first = Coordinate::new(49.45, 11.05);
    let second = Coordinate::new(49.47, 11.10);
    let used = vehicle(20, &[101, 100], vec![DEPOT_LOCATION, second, first, DEPOT_LOCATION]);
    SolutionSnapshot {
        solving: false,
        id_best_solution: best,
        solution_iteration: best * 10,
        current_iteration: best * 10 + 3,
        score: None,
        score_explanation: String::new(),
        solution: Solution {
            bounds,
            distance_meters: 2_345,
            total_time: 777,
            fix_cost: 10_000,
            score: Some("0hard/-2345soft".to_string()),
            depot_list: vec![Depot {
                id: 1,
                location: DEPOT_LOCATION,
            }],
            customer_list: vec![customer(100, 4, first), customer(101, 6, second)],
            vehicle_list: vec![used.clone(), vehicle(21, &[], Vec::new())],
            used_vehicle_list: vec![used],
        },
    }
}

pub fn snapshot(best: i64) -> SolutionSnapshot {
    snapshot_with_bounds(best, Some(default_bounds()))
}

pub fn solving_snapshot(best: i64) -> SolutionSnapshot {
    SolutionSnapshot {
        solving: true,
        ..snapshot(best)
    }
}

#[derive(Debug, Default)]
pub struct SurfaceLog {
    next_marker: u32,
    failing_markers: usize,
    pub created: Vec<(MarkerKind, Coordinate)>,
    pub icons: Vec<(u32, MarkerIcon)>,
    pub popups: Vec<(u32, Popup)>,
    /// Paths currently on the map.
    pub paths: Vec<(Vec<Coordinate>, String)>,
    pub clears: usize,
    pub fits: Vec<Bounds>,
}

/// Records surface calls. Clones share one log.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    log: Rc<RefCell<SurfaceLog>>,
}

impl RecordingSurface {
    pub fn log(&self) -> Ref<'_, SurfaceLog> {
        self.log.borrow()
    }

    /// Make the next `count` marker creations fail.
    pub fn fail_next_markers(&self, count: usize) {
        self.log.borrow_mut().failing_markers = count;
    }
}

impl RenderSurface for RecordingSurface {
    type Marker = u32;

    fn create_marker(&mut self, kind: MarkerKind, location: Coordinate) -> Result<u32, String> {
        let mut log = self.log.borrow_mut();
        if log.failing_markers > 0 {
            log.failing_markers -= 1;
            return Err("marker layer unavailable".to_string());
        }
        log.next_marker += 1;
        log.created.push((kind, location));
        Ok(log.next_marker)
    }

    fn set_icon(&mut self, marker: &u32, icon: MarkerIcon) {
        self.log.borrow_mut().icons.push((*marker, icon));
    }

    fn set_popup_content(&mut self, marker: &u32, popup: &Popup) {
        self.log.borrow_mut().popups.push((*marker, popup.clone()));
    }

    fn draw_path(&mut self, points: &[Coordinate], color: &str) {
        self.log
            .borrow_mut()
            .paths
            .push((points.to_vec(), color.to_string()));
    }

    fn clear_paths(&mut self) {
        let mut log = self.log.borrow_mut();
        log.paths.clear();
        log.clears += 1;
    }

    fn fit_view(&mut self, bounds: Bounds) {
        self.log.borrow_mut().fits.push(bounds);
    }
}

#[derive(Debug, Default)]
pub struct DashboardLog {
    pub vehicles: Vec<VehicleRow>,
    pub depots: Vec<DepotRow>,
    pub summary: Option<SummaryFields>,
    pub run_states: Vec<RunState>,
    pub notifications: Vec<Notification>,
}

#[derive(Debug, Clone, Default)]
pub struct RecordingDashboard {
    log: Rc<RefCell<DashboardLog>>,
}

impl RecordingDashboard {
    pub fn log(&self) -> Ref<'_, DashboardLog> {
        self.log.borrow()
    }
}

impl Dashboard for RecordingDashboard {
    fn show_vehicles(&self, rows: Vec<VehicleRow>) {
        self.log.borrow_mut().vehicles = rows;
    }

    fn show_depots(&self, rows: Vec<DepotRow>) {
        self.log.borrow_mut().depots = rows;
    }

    fn show_summary(&self, summary: SummaryFields) {
        self.log.borrow_mut().summary = Some(summary);
    }

    fn show_run_state(&self, state: RunState) {
        self.log.borrow_mut().run_states.push(state);
    }

    fn show_notifications(&self, notifications: Vec<Notification>) {
        self.log.borrow_mut().notifications = notifications;
    }
}

struct TransportState {
    status: Result<SolutionSnapshot, ClientError>,
    start: Result<(), ClientError>,
    stop: Result<(), ClientError>,
    status_calls: usize,
    start_calls: usize,
    stop_calls: usize,
    gated: bool,
    pending: Vec<Option<oneshot::Sender<()>>>,
}

impl Default for TransportState {
    fn default() -> Self {
        Self {
            status: Ok(snapshot(1)),
            start: Ok(()),
            stop: Ok(()),
            status_calls: 0,
            start_calls: 0,
            stop_calls: 0,
            gated: false,
            pending: Vec::new(),
        }
    }
}

/// Scripted solver. Status answers are captured when the request is issued;
/// in gated mode they are held until [`FakeTransport::release`].
#[derive(Clone, Default)]
pub struct FakeTransport {
    state: Rc<RefCell<TransportState>>,
}

impl FakeTransport {
    pub fn set_status(&self, status: Result<SolutionSnapshot, ClientError>) {
        self.state.borrow_mut().status = status;
    }

    pub fn set_start(&self, result: Result<(), ClientError>) {
        self.state.borrow_mut().start = result;
    }

    pub fn set_stop(&self, result: Result<(), ClientError>) {
        self.state.borrow_mut().stop = result;
    }

    pub fn gate(&self) {
        self.state.borrow_mut().gated = true;
    }

    /// Let the `index`th gated status request (0-based, issue order) complete.
    pub fn release(&self, index: usize) {
        let sender = self.state.borrow_mut().pending[index].take();
        if let Some(sender) = sender {
            let _ = sender.send(());
        }
    }

    pub fn status_calls(&self) -> usize {
        self.state.borrow().status_calls
    }

    pub fn start_calls(&self) -> usize {
        self.state.borrow().start_calls
    }

    pub fn stop_calls(&self) -> usize {
        self.state.borrow().stop_calls
    }
}

impl SolverTransport for FakeTransport {
    async fn fetch_status(&self) -> Result<SolutionSnapshot, ClientError> {
        let (response, gate) = {
            let mut state = self.state.borrow_mut();
            state.status_calls += 1;
            let gate = state.gated.then(|| {
                let (tx, rx) = oneshot::channel();
                state.pending.push(Some(tx));
                rx
            });
            (state.status.clone(), gate)
        };
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        response
    }

    async fn start_solving(&self) -> Result<(), ClientError> {
        let mut state = self.state.borrow_mut();
        state.start_calls += 1;
        state.start.clone()
    }

    async fn stop_solving(&self) -> Result<(), ClientError> {
        let mut state = self.state.borrow_mut();
        state.stop_calls += 1;
        state.stop.clone()
    }
}

#[derive(Default)]
struct SchedulerState {
    next_handle: u32,
    active: Vec<(u32, Rc<dyn Fn()>)>,
    scheduled: usize,
    cancelled: usize,
    refuse: bool,
}

/// Timer that only fires when the test says so.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    state: Rc<RefCell<SchedulerState>>,
}

impl ManualScheduler {
    /// Run every active callback once.
    pub fn fire(&self) {
        let callbacks: Vec<Rc<dyn Fn()>> = self
            .state
            .borrow()
            .active
            .iter()
            .map(|(_, tick)| Rc::clone(tick))
            .collect();
        for tick in callbacks {
            tick();
        }
    }

    /// Make subsequent `schedule` calls fail.
    pub fn refuse(&self) {
        self.state.borrow_mut().refuse = true;
    }

    pub fn active(&self) -> usize {
        self.state.borrow().active.len()
    }

    pub fn scheduled(&self) -> usize {
        self.state.borrow().scheduled
    }

    pub fn cancelled(&self) -> usize {
        self.state.borrow().cancelled
    }
}

impl PollScheduler for ManualScheduler {
    type Handle = u32;

    fn schedule(&self, _period_ms: u32, tick: Box<dyn Fn()>) -> Option<u32> {
        let mut state = self.state.borrow_mut();
        if state.refuse {
            return None;
        }
        state.next_handle += 1;
        state.scheduled += 1;
        let handle = state.next_handle;
        state.active.push((handle, Rc::from(tick)));
        Some(handle)
    }

    fn cancel(&self, handle: u32) {
        let mut state = self.state.borrow_mut();
        state.active.retain(|(h, _)| *h != handle);
        state.cancelled += 1;
    }
}
