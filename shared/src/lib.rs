pub mod geo;
pub mod solution;
pub mod status;

pub use geo::{Bounds, Coordinate};
pub use solution::{Customer, Depot, DepotRef, EntityId, Solution, Vehicle};
pub use status::{ErrorBody, SolutionSnapshot};
