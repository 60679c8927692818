use vrp_live_shared::{Bounds, Coordinate, EntityId};

/// Layer a marker lives on. Depots and customers keep separate id spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    Depot,
    Customer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerIcon {
    Default,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DepotPopup {
    pub id: EntityId,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomerPopup {
    pub id: EntityId,
    pub demand: i64,
    pub begin_service_window: i64,
    pub end_service_window: i64,
    pub service_time: i64,
}

/// Popup content as data; the surface decides how to present it.
#[derive(Debug, Clone, PartialEq)]
pub enum Popup {
    Depot(DepotPopup),
    Customer(CustomerPopup),
}

/// The map the engine draws on.
pub trait RenderSurface {
    type Marker: Clone;

    /// Create a marker on `kind`'s layer with a popup bound to it.
    fn create_marker(&mut self, kind: MarkerKind, location: Coordinate)
    -> Result<Self::Marker, String>;
    fn set_icon(&mut self, marker: &Self::Marker, icon: MarkerIcon);
    fn set_popup_content(&mut self, marker: &Self::Marker, popup: &Popup);
    fn draw_path(&mut self, points: &[Coordinate], color: &str);
    fn clear_paths(&mut self);
    fn fit_view(&mut self, bounds: Bounds);
}
