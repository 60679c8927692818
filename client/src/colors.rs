use vrp_live_shared::EntityId;

/// Fixed display palette for depots, vehicles and their routes.
pub const PALETTE: [&str; 16] = [
    "aqua",
    "aquamarine",
    "blue",
    "blueviolet",
    "chocolate",
    "cornflowerblue",
    "crimson",
    "forestgreen",
    "gold",
    "lawngreen",
    "limegreen",
    "maroon",
    "mediumvioletred",
    "orange",
    "slateblue",
    "tomato",
];

/// Deterministic entity color: `PALETTE[id mod len]`, euclidean so negative ids stay in range.
pub fn color_by_id(id: EntityId) -> &'static str {
    let index = id.rem_euclid(PALETTE.len() as EntityId) as usize;
    PALETTE[index]
}
