use std::fmt::Write;

/// Format meters as whole kilometers plus the remaining meters, e.g. `1km 500m`.
pub fn format_distance(meters: i64) -> String {
    let mut out = String::with_capacity(12);
    write_distance(&mut out, meters);
    out
}

pub fn write_distance(buf: &mut String, meters: i64) {
    buf.clear();
    let km = meters.div_euclid(1000);
    let rest = meters.rem_euclid(1000);
    let _ = write!(buf, "{km}km {rest}m");
}

/// Load of a vehicle in percent. `None` when capacity is not positive.
pub fn load_percent(total_demand: i64, capacity: i64) -> Option<f64> {
    (capacity > 0).then(|| total_demand as f64 / capacity as f64 * 100.0)
}
