use std::collections::HashSet;

use vrp_live_shared::{EntityId, Solution, SolutionSnapshot, Vehicle};

use crate::colors::color_by_id;
use crate::format::{format_distance, load_percent};
use crate::marker_cache::MarkerCache;
use crate::surface::{CustomerPopup, DepotPopup, MarkerIcon, MarkerKind, Popup, RenderSurface};
use crate::view_model::{DepotRow, SummaryFields, VehicleRow};

/// Table and summary content produced by one render.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOutput {
    pub vehicles: Vec<VehicleRow>,
    pub depots: Vec<DepotRow>,
    pub summary: SummaryFields,
}

/// Applies snapshots to the map. Owns the marker cache and the one-shot
/// camera fit flag; everything else is recomputed per snapshot.
pub struct SnapshotRenderer<H> {
    markers: MarkerCache<H>,
    view_fitted: bool,
}

impl<H> Default for SnapshotRenderer<H> {
    fn default() -> Self {
        Self {
            markers: MarkerCache::default(),
            view_fitted: false,
        }
    }
}

impl<H: Clone> SnapshotRenderer<H> {
    #[cfg(test)]
    pub fn markers(&self) -> &MarkerCache<H> {
        &self.markers
    }

    pub fn render<S>(&mut self, snapshot: &SolutionSnapshot, surface: &mut S) -> RenderOutput
    where
        S: RenderSurface<Marker = H>,
    {
        let solution = &snapshot.solution;

        // Camera fit happens once per session; later snapshots leave the user's view alone.
        if !self.view_fitted
            && let Some(bounds) = solution.bounds
        {
            surface.fit_view(bounds);
            self.view_fitted = true;
        }

        let stray = solution.used_vehicles_not_in_fleet();
        if !stray.is_empty() {
            tracing::warn!(?stray, "used vehicles missing from the fleet list");
        }

        let known_customers = solution.customer_ids();
        let vehicles = solution
            .used_vehicle_list
            .iter()
            .map(|v| vehicle_row(v, &known_customers))
            .collect();

        let depots = solution
            .depot_list
            .iter()
            .map(|depot| {
                let color = color_by_id(depot.id);
                match self
                    .markers
                    .get_or_create(surface, MarkerKind::Depot, depot.id, depot.location)
                {
                    Ok(marker) => {
                        surface.set_icon(&marker, MarkerIcon::Default);
                        surface.set_popup_content(
                            &marker,
                            &Popup::Depot(DepotPopup {
                                id: depot.id,
                                color,
                            }),
                        );
                    }
                    Err(err) => {
                        tracing::warn!(depot = depot.id, %err, "depot marker unavailable");
                    }
                }
                DepotRow {
                    id: depot.id,
                    color,
                    used_vehicles: solution.used_vehicles_at(depot.id),
                    total_vehicles: solution.vehicles_at(depot.id),
                }
            })
            .collect();

        for customer in &solution.customer_list {
            let marker = match self.markers.get_or_create(
                surface,
                MarkerKind::Customer,
                customer.id,
                customer.location,
            ) {
                Ok(marker) => marker,
                Err(err) => {
                    tracing::warn!(customer = customer.id, %err, "customer marker unavailable");
                    continue;
                }
            };
            surface.set_popup_content(
                &marker,
                &Popup::Customer(CustomerPopup {
                    id: customer.id,
                    demand: customer.demand,
                    begin_service_window: customer.begin_service_window,
                    end_service_window: customer.end_service_window,
                    service_time: customer.service_time,
                }),
            );
        }

        self.warn_vanished(solution);

        surface.clear_paths();
        for vehicle in &solution.used_vehicle_list {
            surface.draw_path(&vehicle.route, color_by_id(vehicle.id));
        }

        RenderOutput {
            vehicles,
            depots,
            summary: SummaryFields {
                best_solution_id: snapshot.id_best_solution,
                solution_iteration: snapshot.solution_iteration,
                current_iteration: snapshot.current_iteration,
                score: snapshot.score().to_string(),
                score_explanation: snapshot.score_explanation.clone(),
                distance: format_distance(solution.distance_meters),
                total_time: solution.total_time,
                fix_cost: solution.fix_cost,
            },
        }
    }

    /// Markers are never evicted, so an entity dropped by the service stays on
    /// the map.
    fn warn_vanished(&self, solution: &Solution) {
        let depots = self
            .markers
            .missing_from(MarkerKind::Depot, solution.depot_list.iter().map(|d| d.id));
        let customers = self
            .markers
            .missing_from(MarkerKind::Customer, solution.customer_list.iter().map(|c| c.id));
        if !depots.is_empty() || !customers.is_empty() {
            tracing::warn!(
                ?depots,
                ?customers,
                cached = self.markers.len(),
                "entities disappeared from the snapshot; their markers remain on the map"
            );
        }
    }
}

fn vehicle_row(vehicle: &Vehicle, known_customers: &HashSet<EntityId>) -> VehicleRow {
    let load = load_percent(vehicle.total_demand, vehicle.capacity);
    if load.is_none() {
        tracing::warn!(
            vehicle = vehicle.id,
            capacity = vehicle.capacity,
            "vehicle has no usable capacity; showing 0% load"
        );
    }

    let customer_ids = vehicle
        .customer_ids
        .iter()
        .copied()
        .filter(|id| {
            let known = known_customers.contains(id);
            if !known {
                tracing::warn!(
                    vehicle = vehicle.id,
                    customer = *id,
                    "route references unknown customer; skipping"
                );
            }
            known
        })
        .collect();

    VehicleRow {
        id: vehicle.id,
        color: color_by_id(vehicle.id),
        capacity: vehicle.capacity,
        total_demand: vehicle.total_demand,
        load_percent: load.unwrap_or(0.0),
        capacity_invalid: load.is_none(),
        customer_count: vehicle.customer_count(),
        customer_ids,
        distance: format_distance(vehicle.total_distance_meters),
        total_time: vehicle.total_time,
    }
}
