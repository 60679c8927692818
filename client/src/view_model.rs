use vrp_live_shared::EntityId;

use crate::notifications::Notification;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Solving,
}

impl RunState {
    pub fn from_solving(solving: bool) -> Self {
        if solving { Self::Solving } else { Self::Idle }
    }

    pub fn is_solving(self) -> bool {
        self == Self::Solving
    }
}

/// One row of the vehicle table (used vehicles only).
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleRow {
    pub id: EntityId,
    pub color: &'static str,
    pub capacity: i64,
    pub total_demand: i64,
    /// Share of capacity in use, 0 when `capacity_invalid`.
    pub load_percent: f64,
    /// Set when the service reported a non-positive capacity.
    pub capacity_invalid: bool,
    pub customer_count: usize,
    pub customer_ids: Vec<EntityId>,
    pub distance: String,
    pub total_time: i64,
}

impl VehicleRow {
    pub fn load_label(&self) -> String {
        format!("{}/{}", self.total_demand, self.capacity)
    }

    pub fn load_tooltip(&self) -> String {
        format!("Cargo: {}\nCapacity: {}", self.total_demand, self.capacity)
    }

    pub fn customers_label(&self) -> String {
        let ids: Vec<String> = self.customer_ids.iter().map(|id| id.to_string()).collect();
        format!("{}: {}", self.customer_count, ids.join(","))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DepotRow {
    pub id: EntityId,
    pub color: &'static str,
    pub used_vehicles: usize,
    pub total_vehicles: usize,
}

impl DepotRow {
    pub fn label(&self) -> String {
        format!(
            "Depot {}: {}/{} vehicles in use",
            self.id, self.used_vehicles, self.total_vehicles
        )
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SummaryFields {
    pub best_solution_id: i64,
    pub solution_iteration: i64,
    pub current_iteration: i64,
    pub score: String,
    pub score_explanation: String,
    pub distance: String,
    pub total_time: i64,
    pub fix_cost: i64,
}

/// Everything outside the map: tables, summary, controls and advisories.
pub trait Dashboard {
    fn show_vehicles(&self, rows: Vec<VehicleRow>);
    fn show_depots(&self, rows: Vec<DepotRow>);
    fn show_summary(&self, summary: SummaryFields);
    /// Toggle the start/stop affordances.
    fn show_run_state(&self, state: RunState);
    fn show_notifications(&self, notifications: Vec<Notification>);
}
