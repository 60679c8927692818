use std::cell::RefCell;
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::config::ClientConfig;
use crate::controller::{Controller, ControllerParts};
use crate::leaflet::LeafletSurface;
use crate::notifications::Notification;
use crate::polling::IntervalScheduler;
use crate::transport::HttpTransport;
use crate::view_model::{Dashboard, DepotRow, RunState, SummaryFields, VehicleRow};

pub(crate) const MAP_CONTAINER_ID: &str = "map";

type BrowserController = Controller<HttpTransport, LeafletSurface, SignalDashboard, IntervalScheduler>;

thread_local! {
    static SESSION: RefCell<Option<BrowserController>> = const { RefCell::new(None) };
}

fn with_session(f: impl FnOnce(&BrowserController)) {
    let controller = SESSION.with(|slot| slot.borrow().clone());
    match controller {
        Some(controller) => f(&controller),
        None => tracing::warn!("no solver session; map failed to mount"),
    }
}

fn end_session() {
    let old = SESSION.with(|slot| slot.borrow_mut().take());
    if let Some(old) = old {
        old.stop_polling();
    }
}

/// Dashboard backed by the signals the view below reads.
#[derive(Clone, Copy)]
pub(crate) struct SignalDashboard {
    vehicles: RwSignal<Vec<VehicleRow>>,
    depots: RwSignal<Vec<DepotRow>>,
    summary: RwSignal<SummaryFields>,
    run_state: RwSignal<RunState>,
    notifications: RwSignal<Vec<Notification>>,
}

impl Dashboard for SignalDashboard {
    fn show_vehicles(&self, rows: Vec<VehicleRow>) {
        self.vehicles.set(rows);
    }

    fn show_depots(&self, rows: Vec<DepotRow>) {
        self.depots.set(rows);
    }

    fn show_summary(&self, summary: SummaryFields) {
        self.summary.set(summary);
    }

    fn show_run_state(&self, state: RunState) {
        self.run_state.set(state);
    }

    fn show_notifications(&self, notifications: Vec<Notification>) {
        self.notifications.set(notifications);
    }
}

#[component]
pub fn App(config: ClientConfig) -> impl IntoView {
    let dashboard = SignalDashboard {
        vehicles: RwSignal::new(Vec::new()),
        depots: RwSignal::new(Vec::new()),
        summary: RwSignal::new(SummaryFields::default()),
        run_state: RwSignal::new(RunState::Idle),
        notifications: RwSignal::new(Vec::new()),
    };
    provide_context(dashboard);

    // The map container only exists once the view is mounted.
    Effect::new(move || {
        let surface = match LeafletSurface::mount(MAP_CONTAINER_ID) {
            Ok(surface) => surface,
            Err(err) => {
                tracing::error!(%err, "could not create the map");
                return;
            }
        };
        let controller = Controller::new(ControllerParts {
            config: config.clone(),
            transport: HttpTransport::new(config.clone()),
            surface,
            dashboard,
            scheduler: IntervalScheduler,
            spawner: Rc::new(|fut: LocalBoxFuture<'static, ()>| spawn_local(fut)),
        });
        end_session();
        SESSION.with(|slot| *slot.borrow_mut() = Some(controller.clone()));
        tracing::info!(api = %controller.config().api_base, "solver session started");
        spawn_local(async move { controller.load().await });

        on_cleanup(end_session);
    });

    let solving = move || dashboard.run_state.get().is_solving();

    view! {
        <div class="container-fluid" style="display: flex; height: 100vh; gap: 12px; padding: 12px;">
            <div style="flex: 2; display: flex; flex-direction: column; gap: 8px;">
                <div style="display: flex; gap: 8px; align-items: center;">
                    <button
                        class="btn btn-success"
                        style:display=move || if solving() { "none" } else { "inline-block" }
                        on:click=move |_| with_session(|c| {
                            let c = c.clone();
                            spawn_local(async move { c.request_start().await });
                        })
                    >
                        "Solve"
                    </button>
                    <button
                        class="btn btn-danger"
                        style:display=move || if solving() { "inline-block" } else { "none" }
                        on:click=move |_| with_session(|c| {
                            let c = c.clone();
                            spawn_local(async move { c.request_stop().await });
                        })
                    >
                        "Stop solving"
                    </button>
                    <span>"Score: " <b>{move || dashboard.summary.get().score}</b></span>
                </div>
                <div id=MAP_CONTAINER_ID style="flex: 1; min-height: 400px;"></div>
            </div>
            <div style="flex: 1; overflow-y: auto;">
                <SummaryPanel />
                <DepotTable />
                <VehicleTable />
            </div>
        </div>
        <NotificationPanel />
    }
}

#[component]
fn SummaryPanel() -> impl IntoView {
    let dashboard: SignalDashboard = expect_context();
    let summary = dashboard.summary;

    view! {
        <table class="table table-sm">
            <tbody>
                <tr><td>"Best solution"</td><td>{move || summary.get().best_solution_id}</td></tr>
                <tr><td>"Solution iteration"</td><td>{move || summary.get().solution_iteration}</td></tr>
                <tr><td>"Current iteration"</td><td>{move || summary.get().current_iteration}</td></tr>
                <tr><td>"Distance"</td><td>{move || summary.get().distance}</td></tr>
                <tr><td>"Time"</td><td>{move || summary.get().total_time}</td></tr>
                <tr><td>"Fix cost"</td><td>{move || summary.get().fix_cost}</td></tr>
            </tbody>
        </table>
        <pre style="font-size: 0.75rem; white-space: pre-wrap;">{move || summary.get().score_explanation}</pre>
    }
}

fn swatch(color: &'static str) -> String {
    format!("background-color: {color}; display: inline-block; width: 1rem; height: 1rem;")
}

#[component]
fn DepotTable() -> impl IntoView {
    let dashboard: SignalDashboard = expect_context();

    view! {
        <table class="table table-sm">
            <tbody>
                <For
                    each=move || dashboard.depots.get()
                    key=|row| (row.id, row.used_vehicles, row.total_vehicles)
                    children=move |row| {
                        view! {
                            <tr>
                                <td><i style=swatch(row.color)></i></td>
                                <td>{row.label()}</td>
                            </tr>
                        }
                    }
                />
            </tbody>
        </table>
    }
}

#[component]
fn VehicleTable() -> impl IntoView {
    let dashboard: SignalDashboard = expect_context();

    view! {
        <table class="table table-sm">
            <thead>
                <tr>
                    <th></th>
                    <th>"Vehicle"</th>
                    <th>"Load"</th>
                    <th>"Customers"</th>
                    <th>"Distance"</th>
                    <th>"Time"</th>
                </tr>
            </thead>
            <tbody>
                {move || {
                    dashboard
                        .vehicles
                        .get()
                        .into_iter()
                        .map(|row| {
                            let bar_class = if row.capacity_invalid {
                                "progress-bar bg-danger"
                            } else {
                                "progress-bar"
                            };
                            view! {
                                <tr>
                                    <td><i style=swatch(row.color)></i></td>
                                    <td>{format!("Vehicle {}", row.id)}</td>
                                    <td>
                                        <div class="progress" title=row.load_tooltip()>
                                            <div
                                                class=bar_class
                                                role="progressbar"
                                                style=format!("width: {}%", row.load_percent)
                                            >
                                                {row.load_label()}
                                            </div>
                                        </div>
                                    </td>
                                    <td>{row.customers_label()}</td>
                                    <td>{row.distance.clone()}</td>
                                    <td>{row.total_time}</td>
                                </tr>
                            }
                        })
                        .collect_view()
                }}
            </tbody>
        </table>
    }
}

#[component]
fn NotificationPanel() -> impl IntoView {
    let dashboard: SignalDashboard = expect_context();

    view! {
        <div style="position: fixed; top: 12px; right: 12px; z-index: 1000; min-width: 30rem;">
            <For
                each=move || dashboard.notifications.get()
                key=|n| n.id
                children=move |n| {
                    let id = n.id;
                    view! {
                        <div class="toast show shadow rounded-lg" role="alert">
                            <div class="toast-header bg-danger">
                                <strong class="mr-auto text-dark">"Error"</strong>
                                <small>{n.raised_at.format("%H:%M:%S").to_string()}</small>
                                <button
                                    type="button"
                                    class="ml-2 mb-1 close"
                                    on:click=move |_| with_session(|c| {
                                        c.dismiss_notification(id);
                                    })
                                >
                                    <span>"\u{00D7}"</span>
                                </button>
                            </div>
                            <div class="toast-body">
                                <p>{n.message}</p>
                                <pre><code>{n.diagnostic}</code></pre>
                            </div>
                        </div>
                    }
                }
            />
        </div>
    }
}
