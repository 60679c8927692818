use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::geo::{Bounds, Coordinate};

pub type EntityId = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Depot {
    pub id: EntityId,
    pub location: Coordinate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: EntityId,
    pub location: Coordinate,
    #[serde(default)]
    pub demand: i64,
    #[serde(default)]
    pub begin_service_window: i64,
    #[serde(default)]
    pub end_service_window: i64,
    #[serde(default)]
    pub service_time: i64,
}

/// Vehicles embed their whole depot on the wire; only the id is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepotRef {
    pub id: EntityId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: EntityId,
    pub depot: DepotRef,
    pub capacity: i64,
    #[serde(default)]
    pub fix_cost: i64,
    #[serde(default)]
    pub total_demand: i64,
    #[serde(default)]
    pub total_distance_meters: i64,
    #[serde(default)]
    pub total_time: i64,
    #[serde(default)]
    pub no_customers: Option<usize>,
    #[serde(default)]
    pub customer_ids: Vec<EntityId>,
    #[serde(default)]
    pub route: Vec<Coordinate>,
}

impl Vehicle {
    /// Number of assigned customers, falling back to the id list when the
    /// service omits the explicit count.
    pub fn customer_count(&self) -> usize {
        self.no_customers.unwrap_or(self.customer_ids.len())
    }

    pub fn is_used(&self) -> bool {
        !self.customer_ids.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Solution {
    #[serde(default)]
    pub bounds: Option<Bounds>,
    #[serde(default)]
    pub distance_meters: i64,
    #[serde(default)]
    pub total_time: i64,
    #[serde(default)]
    pub fix_cost: i64,
    #[serde(default)]
    pub score: Option<String>,
    #[serde(default)]
    pub depot_list: Vec<Depot>,
    #[serde(default)]
    pub customer_list: Vec<Customer>,
    #[serde(default)]
    pub vehicle_list: Vec<Vehicle>,
    #[serde(default)]
    pub used_vehicle_list: Vec<Vehicle>,
}

impl Solution {
    pub fn customer_ids(&self) -> HashSet<EntityId> {
        self.customer_list.iter().map(|c| c.id).collect()
    }

    /// Vehicles of the whole fleet stationed at `depot_id`.
    pub fn vehicles_at(&self, depot_id: EntityId) -> usize {
        self.vehicle_list
            .iter()
            .filter(|v| v.depot.id == depot_id)
            .count()
    }

    /// Vehicles with at least one customer stationed at `depot_id`.
    pub fn used_vehicles_at(&self, depot_id: EntityId) -> usize {
        self.used_vehicle_list
            .iter()
            .filter(|v| v.depot.id == depot_id)
            .count()
    }

    /// Ids listed as used that are missing from the fleet.
    pub fn used_vehicles_not_in_fleet(&self) -> Vec<EntityId> {
        let fleet: HashSet<EntityId> = self.vehicle_list.iter().map(|v| v.id).collect();
        self.used_vehicle_list
            .iter()
            .map(|v| v.id)
            .filter(|id| !fleet.contains(id))
            .collect()
    }

    /// `(vehicle, customer)` pairs where a route names a customer the
    /// solution does not contain.
    pub fn unknown_customer_refs(&self) -> Vec<(EntityId, EntityId)> {
        let known = self.customer_ids();
        self.vehicle_list
            .iter()
            .flat_map(|v| {
                v.customer_ids
                    .iter()
                    .filter(|id| !known.contains(id))
                    .map(move |id| (v.id, *id))
            })
            .collect()
    }
}
