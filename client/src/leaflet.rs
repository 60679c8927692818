use js_sys::{Array, Function, Reflect};
use serde::Serialize;
use vrp_live_shared::{Bounds, Coordinate};
use wasm_bindgen::{JsCast, JsValue};

use crate::surface::{CustomerPopup, DepotPopup, MarkerIcon, MarkerKind, Popup, RenderSurface};

const TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
const TILE_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/\">OpenStreetMap</a> contributors";
/// Placeholder view until the first snapshot's bounds arrive.
const INITIAL_CENTER: Coordinate = Coordinate::new(51.505, -0.09);
const INITIAL_ZOOM: u32 = 13;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MapOptions {
    double_click_zoom: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TileOptions<'a> {
    max_zoom: u32,
    attribution: &'a str,
}

#[derive(Serialize)]
struct PathOptions<'a> {
    color: &'a str,
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, String> {
    serde_wasm_bindgen::to_value(value).map_err(|e| format!("serialize: {e}"))
}

fn get(target: &JsValue, key: &str) -> Result<JsValue, String> {
    let value = Reflect::get(target, &JsValue::from_str(key)).map_err(|e| format!("{key}: {e:?}"))?;
    if value.is_undefined() {
        return Err(format!("{key} is undefined"));
    }
    Ok(value)
}

/// `target.name(...args)`.
fn invoke(target: &JsValue, name: &str, args: &[&JsValue]) -> Result<JsValue, String> {
    let method = get(target, name)?
        .dyn_into::<Function>()
        .map_err(|_| format!("{name} is not a function"))?;
    let args: Array = args.iter().collect();
    method
        .apply(target, &args)
        .map_err(|e| format!("{name} failed: {e:?}"))
}

fn depot_popup_html(popup: &DepotPopup) -> String {
    format!(
        "<h5>Depot {id}</h5>\
         <ul class=\"list-unstyled\"><li>\
         <span style=\"background-color: {color}; display: inline-block; width: 12px; height: 12px\"></span> \
         {color}</li></ul>",
        id = popup.id,
        color = popup.color,
    )
}

fn customer_popup_html(popup: &CustomerPopup) -> String {
    format!(
        "<h5>Customer {}</h5>Demand: {}<br>TimeWindow: {} - {}<br>ServiceTime: {}",
        popup.id,
        popup.demand,
        popup.begin_service_window,
        popup.end_service_window,
        popup.service_time,
    )
}

fn popup_html(popup: &Popup) -> String {
    match popup {
        Popup::Depot(depot) => depot_popup_html(depot),
        Popup::Customer(customer) => customer_popup_html(customer),
    }
}

/// [`RenderSurface`] over the page's global Leaflet (`L`).
///
/// Interop failures are logged and otherwise ignored; a broken map call never
/// takes down the dashboard. Marker creation is the exception: its error goes
/// back to the caller so a missing marker is not cached.
pub struct LeafletSurface {
    leaflet: JsValue,
    map: JsValue,
    depots: JsValue,
    customers: JsValue,
    routes: JsValue,
    default_icon: JsValue,
}

impl LeafletSurface {
    /// Create the map inside the element with id `container`, with an
    /// OpenStreetMap tile layer and one layer group per marker kind plus routes.
    pub fn mount(container: &str) -> Result<Self, String> {
        let leaflet = get(&js_sys::global(), "L")?;

        let options = to_js(&MapOptions {
            double_click_zoom: false,
        })?;
        let map = invoke(&leaflet, "map", &[&JsValue::from_str(container), &options])?;
        invoke(
            &map,
            "setView",
            &[&to_js(&INITIAL_CENTER)?, &JsValue::from(INITIAL_ZOOM)],
        )?;

        let tiles = invoke(
            &leaflet,
            "tileLayer",
            &[
                &JsValue::from_str(TILE_URL),
                &to_js(&TileOptions {
                    max_zoom: 19,
                    attribution: TILE_ATTRIBUTION,
                })?,
            ],
        )?;
        invoke(&tiles, "addTo", &[&map])?;

        let layer = || -> Result<JsValue, String> {
            let group = invoke(&leaflet, "layerGroup", &[])?;
            invoke(&group, "addTo", &[&map])?;
            Ok(group)
        };
        let customers = layer()?;
        let depots = layer()?;
        let routes = layer()?;

        let icon_ctor = get(&get(&leaflet, "Icon")?, "Default")?
            .dyn_into::<Function>()
            .map_err(|_| "L.Icon.Default is not a constructor".to_string())?;
        let default_icon = Reflect::construct(&icon_ctor, &Array::new())
            .map_err(|e| format!("L.Icon.Default: {e:?}"))?;

        Ok(Self {
            leaflet,
            map,
            depots,
            customers,
            routes,
            default_icon,
        })
    }

    fn try_create_marker(&self, kind: MarkerKind, location: Coordinate) -> Result<JsValue, String> {
        let (factory, layer) = match kind {
            MarkerKind::Depot => ("marker", &self.depots),
            MarkerKind::Customer => ("circleMarker", &self.customers),
        };
        let marker = invoke(&self.leaflet, factory, &[&to_js(&location)?])?;
        invoke(&marker, "addTo", &[layer])?;
        invoke(&marker, "bindPopup", &[])?;
        Ok(marker)
    }

    fn try_draw_path(&self, points: &[Coordinate], color: &str) -> Result<(), String> {
        let line = invoke(
            &self.leaflet,
            "polyline",
            &[&to_js(points)?, &to_js(&PathOptions { color })?],
        )?;
        invoke(&line, "addTo", &[&self.routes])?;
        Ok(())
    }
}

impl RenderSurface for LeafletSurface {
    type Marker = JsValue;

    fn create_marker(&mut self, kind: MarkerKind, location: Coordinate) -> Result<JsValue, String> {
        self.try_create_marker(kind, location)
    }

    fn set_icon(&mut self, marker: &JsValue, icon: MarkerIcon) {
        let icon = match icon {
            MarkerIcon::Default => &self.default_icon,
        };
        if let Err(err) = invoke(marker, "setIcon", &[icon]) {
            tracing::warn!(%err, "setIcon failed");
        }
    }

    fn set_popup_content(&mut self, marker: &JsValue, popup: &Popup) {
        let html = JsValue::from_str(&popup_html(popup));
        if let Err(err) = invoke(marker, "setPopupContent", &[&html]) {
            tracing::warn!(%err, "setPopupContent failed");
        }
    }

    fn draw_path(&mut self, points: &[Coordinate], color: &str) {
        if let Err(err) = self.try_draw_path(points, color) {
            tracing::warn!(%err, color, "route polyline failed");
        }
    }

    fn clear_paths(&mut self) {
        if let Err(err) = invoke(&self.routes, "clearLayers", &[]) {
            tracing::warn!(%err, "clearing routes failed");
        }
    }

    fn fit_view(&mut self, bounds: Bounds) {
        let result = to_js(&bounds).and_then(|b| invoke(&self.map, "fitBounds", &[&b]));
        if let Err(err) = result {
            tracing::warn!(%err, "fitBounds failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depot_popup_shows_id_and_color() {
        let html = depot_popup_html(&DepotPopup {
            id: 3,
            color: "crimson",
        });
        assert!(html.starts_with("<h5>Depot 3</h5>"));
        assert!(html.contains("background-color: crimson"));
        assert!(html.ends_with("crimson</li></ul>"));
    }

    #[test]
    fn customer_popup_lists_service_details() {
        let html = popup_html(&Popup::Customer(CustomerPopup {
            id: 12,
            demand: 4,
            begin_service_window: 28_800,
            end_service_window: 36_000,
            service_time: 600,
        }));
        assert_eq!(
            html,
            "<h5>Customer 12</h5>Demand: 4<br>TimeWindow: 28800 - 36000<br>ServiceTime: 600"
        );
    }
}
