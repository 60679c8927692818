use serde::{Deserialize, Serialize};

use crate::solution::Solution;

/// One `GET /status` payload: the solver's progress plus its best solution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolutionSnapshot {
    #[serde(rename = "isSolving", alias = "solving", default)]
    pub solving: bool,
    #[serde(default)]
    pub id_best_solution: i64,
    #[serde(default)]
    pub solution_iteration: i64,
    #[serde(default)]
    pub current_iteration: i64,
    /// Score reported next to the progress counters. Some service builds only
    /// put it on the solution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<String>,
    #[serde(default)]
    pub score_explanation: String,
    pub solution: Solution,
}

impl SolutionSnapshot {
    /// Display score of the best solution; empty before the first evaluation.
    pub fn score(&self) -> &str {
        self.score
            .as_deref()
            .or(self.solution.score.as_deref())
            .unwrap_or_default()
    }
}

/// Diagnostic body the service attaches to non-2xx responses.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub stack: Option<String>,
}

impl ErrorBody {
    /// Parse a raw error body. Some service builds emit literal tab characters
    /// inside JSON strings, which strict parsers reject; they are widened to
    /// two spaces first.
    pub fn parse(raw: &str) -> Option<Self> {
        serde_json::from_str(&raw.replace('\t', "  ")).ok()
    }

    /// `details` and `stack` joined by a newline.
    pub fn diagnostic(&self) -> String {
        format!(
            "{}\n{}",
            self.details.as_deref().unwrap_or_default(),
            self.stack.as_deref().unwrap_or_default()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinate;

    const STATUS_JSON: &str = r#"{
        "solution": {
            "name": "demo_1",
            "bounds": [[49.43069, 11.03332], [49.49069, 11.13332]],
            "distanceMeters": 12500,
            "totalTime": 4321,
            "fixCost": 20000,
            "score": "0hard/-32500soft",
            "depotList": [{"id": 1, "location": [49.46069, 11.08332]}],
            "customerList": [
                {"id": 5, "location": [49.45, 11.05], "demand": 3, "serviceTime": 60,
                 "beginServiceWindow": 5000, "endServiceWindow": 9000}
            ],
            "vehicleList": [
                {"id": 2, "capacity": 25, "depot": {"id": 1, "location": [49.46069, 11.08332]},
                 "fixCost": 10000, "noCustomers": 1, "customerIds": [5], "totalDemand": 3,
                 "totalDistanceMeters": 12500, "totalTime": 4321,
                 "route": [[49.46069, 11.08332], [49.45, 11.05], [49.46069, 11.08332]]},
                {"id": 3, "capacity": 25, "depot": {"id": 1, "location": [49.46069, 11.08332]},
                 "fixCost": 10000, "noCustomers": 0, "customerIds": [], "totalDemand": 0,
                 "totalDistanceMeters": 0, "totalTime": 0, "route": []}
            ],
            "usedVehicleList": [
                {"id": 2, "capacity": 25, "depot": {"id": 1, "location": [49.46069, 11.08332]},
                 "fixCost": 10000, "noCustomers": 1, "customerIds": [5], "totalDemand": 3,
                 "totalDistanceMeters": 12500, "totalTime": 4321,
                 "route": [[49.46069, 11.08332], [49.45, 11.05], [49.46069, 11.08332]]}
            ]
        },
        "scoreExplanation": "Explanation of score (0hard/-32500soft)",
        "isSolving": true,
        "idBestSolution": 7,
        "solutionIteration": 2,
        "currentIteration": 4
    }"#;

    #[test]
    fn decodes_service_status_payload() {
        let snapshot: SolutionSnapshot = serde_json::from_str(STATUS_JSON).unwrap();
        assert!(snapshot.solving);
        assert_eq!(snapshot.id_best_solution, 7);
        assert_eq!(snapshot.solution_iteration, 2);
        assert_eq!(snapshot.current_iteration, 4);
        assert_eq!(snapshot.score(), "0hard/-32500soft");

        let solution = &snapshot.solution;
        assert_eq!(solution.distance_meters, 12500);
        assert_eq!(solution.depot_list[0].location, Coordinate::new(49.46069, 11.08332));
        assert_eq!(solution.customer_list[0].begin_service_window, 5000);
        assert_eq!(solution.vehicle_list.len(), 2);
        assert_eq!(solution.used_vehicle_list[0].depot.id, 1);
        assert_eq!(solution.used_vehicle_list[0].route.len(), 3);
        assert!(solution.used_vehicles_not_in_fleet().is_empty());
    }

    #[test]
    fn accepts_plain_solving_key() {
        let snapshot: SolutionSnapshot =
            serde_json::from_str(r#"{"solving": true, "solution": {}}"#).unwrap();
        assert!(snapshot.solving);
        assert_eq!(snapshot.score(), "");
        assert!(snapshot.solution.bounds.is_none());
    }

    #[test]
    fn top_level_score_wins_over_solution_score() {
        let snapshot: SolutionSnapshot = serde_json::from_str(
            r#"{"solving": true, "score": "0hard/-5soft", "solution": {"score": "0hard/-9soft"}}"#,
        )
        .unwrap();
        assert_eq!(snapshot.score(), "0hard/-5soft");

        let flat: SolutionSnapshot =
            serde_json::from_str(r#"{"solving": true, "score": "0hard/-5soft", "solution": {}}"#)
                .unwrap();
        assert_eq!(flat.score(), "0hard/-5soft");
    }

    #[test]
    fn error_body_joins_details_and_stack() {
        let body = ErrorBody::parse(r#"{"details":"x","stack":"y"}"#).unwrap();
        assert_eq!(body.diagnostic(), "x\ny");
    }

    #[test]
    fn error_body_tolerates_raw_tabs() {
        let body = ErrorBody::parse("{\"details\":\"boom\",\"stack\":\"at\tFoo.bar\"}").unwrap();
        assert_eq!(body.stack.as_deref(), Some("at  Foo.bar"));
    }

    #[test]
    fn malformed_error_body_is_rejected() {
        assert!(ErrorBody::parse("<html>502 Bad Gateway</html>").is_none());
    }
}
