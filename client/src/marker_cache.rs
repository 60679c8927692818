use std::collections::HashMap;

use vrp_live_shared::{Coordinate, EntityId};

use crate::surface::{MarkerKind, RenderSurface};

/// One visual marker per `(kind, id)` for the whole session.
///
/// Entries are never evicted: depots and customers form a fixed input set, so
/// a snapshot only ever updates content on markers created by an earlier one.
#[derive(Debug)]
pub struct MarkerCache<H> {
    markers: HashMap<(MarkerKind, EntityId), H>,
}

impl<H> Default for MarkerCache<H> {
    fn default() -> Self {
        Self {
            markers: HashMap::new(),
        }
    }
}

impl<H: Clone> MarkerCache<H> {
    /// Return the cached handle, or create one at `location`. The location of
    /// an existing marker is not re-applied. A failed creation is not cached,
    /// so the next snapshot retries.
    pub fn get_or_create<S>(
        &mut self,
        surface: &mut S,
        kind: MarkerKind,
        id: EntityId,
        location: Coordinate,
    ) -> Result<H, String>
    where
        S: RenderSurface<Marker = H>,
    {
        if let Some(marker) = self.markers.get(&(kind, id)) {
            return Ok(marker.clone());
        }
        let marker = surface.create_marker(kind, location)?;
        self.markers.insert((kind, id), marker.clone());
        Ok(marker)
    }

    #[cfg(test)]
    pub fn get(&self, kind: MarkerKind, id: EntityId) -> Option<&H> {
        self.markers.get(&(kind, id))
    }

    #[cfg(test)]
    pub fn contains(&self, kind: MarkerKind, id: EntityId) -> bool {
        self.markers.contains_key(&(kind, id))
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    /// Cached ids of `kind` that `present` no longer lists, sorted.
    pub fn missing_from(
        &self,
        kind: MarkerKind,
        present: impl IntoIterator<Item = EntityId>,
    ) -> Vec<EntityId> {
        let present: std::collections::HashSet<EntityId> = present.into_iter().collect();
        let mut missing: Vec<EntityId> = self
            .markers
            .keys()
            .filter(|(k, id)| *k == kind && !present.contains(id))
            .map(|(_, id)| *id)
            .collect();
        missing.sort_unstable();
        missing
    }
}
