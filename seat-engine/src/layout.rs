//! Map screen view-model
//!
//! Holds the normalized areas, the active area, the guest's selection and
//! the latest availability/occupancy, and answers per-table status queries.

use std::collections::HashSet;

use shared::models::{Area, AvailabilitySnapshot, Floorplan, Rect, Table};

use crate::error::{EngineError, EngineResult};
use crate::geometry::{NormalizedArea, normalize};
use crate::status::{TableStatus, resolve};

/// A table with its resolved status, ready to render
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableView<'a> {
    pub table: &'a Table,
    pub status: TableStatus,
}

#[derive(Debug, Clone, Default)]
pub struct VenueLayout {
    areas: Vec<NormalizedArea>,
    active_area: Option<String>,
    selected: Option<String>,
    available: Option<HashSet<String>>,
    occupied: Option<HashSet<String>>,
}

impl VenueLayout {
    /// Normalize `areas` once; the first area starts active
    pub fn new(areas: &[Area]) -> Self {
        let areas: Vec<NormalizedArea> = areas.iter().map(normalize).collect();
        let active_area = areas.first().map(|a| a.id.clone());
        Self {
            areas,
            active_area,
            ..Default::default()
        }
    }

    pub fn from_floorplan(floorplan: &Floorplan) -> Self {
        Self::new(&floorplan.areas)
    }

    /// Replace all areas. Active area and selection survive when their ids
    /// still exist.
    pub fn reload(&mut self, areas: &[Area]) {
        self.areas = areas.iter().map(normalize).collect();

        let active_kept = self
            .active_area
            .as_deref()
            .is_some_and(|id| self.area(id).is_some());
        if !active_kept {
            self.active_area = self.areas.first().map(|a| a.id.clone());
        }
        if self.selected.as_deref().is_some_and(|id| self.find_table(id).is_none()) {
            tracing::debug!(table_id = ?self.selected, "Selected table gone after reload");
            self.selected = None;
        }
    }

    pub fn areas(&self) -> &[NormalizedArea] {
        &self.areas
    }

    pub fn area(&self, id: &str) -> Option<&NormalizedArea> {
        self.areas.iter().find(|a| a.id == id)
    }

    pub fn active_area(&self) -> Option<&NormalizedArea> {
        self.active_area.as_deref().and_then(|id| self.area(id))
    }

    pub fn set_active_area(&mut self, id: &str) -> EngineResult<()> {
        if self.area(id).is_none() {
            return Err(EngineError::AreaNotFound(id.to_string()));
        }
        self.active_area = Some(id.to_string());
        Ok(())
    }

    /// Select a table, switching to its area. Reserved tables may be
    /// selected too; landmarks never.
    pub fn select_table(&mut self, id: &str) -> EngineResult<&Table> {
        let Some(area_id) = self.find_table(id).map(|(area, _)| area.id.clone()) else {
            let is_landmark = self
                .areas
                .iter()
                .any(|a| a.landmarks().iter().any(|l| l.id == id));
            return Err(if is_landmark {
                EngineError::NotSelectable(id.to_string())
            } else {
                EngineError::TableNotFound(id.to_string())
            });
        };

        if self.active_area.as_deref() != Some(area_id.as_str()) {
            tracing::debug!(table_id = id, area_id = %area_id, "Selection switches active area");
        }
        self.active_area = Some(area_id);
        self.selected = Some(id.to_string());
        self.selected_table()
            .ok_or_else(|| EngineError::TableNotFound(id.to_string()))
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected_table(&self) -> Option<&Table> {
        self.selected
            .as_deref()
            .and_then(|id| self.find_table(id))
            .map(|(_, table)| table)
    }

    pub fn find_table(&self, id: &str) -> Option<(&NormalizedArea, &Table)> {
        self.areas
            .iter()
            .find_map(|area| area.table(id).map(|table| (area, table)))
    }

    /// Percentage-space bounds of a table or landmark in any area
    pub fn bounds_of(&self, id: &str) -> Option<Rect> {
        self.areas.iter().find_map(|area| area.bounds_of(id))
    }

    pub fn get_status(&self, id: &str) -> TableStatus {
        resolve(
            id,
            self.selected.as_deref(),
            self.available.as_ref(),
            self.occupied.as_ref(),
        )
    }

    /// Take the table ids of the latest snapshot. A snapshot that never
    /// synced leaves availability unknown.
    pub fn apply_availability(&mut self, snapshot: &AvailabilitySnapshot) {
        self.available = snapshot.available_table_ids.clone();
    }

    /// Tables known to be reserved by someone else
    pub fn set_occupied<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.occupied = Some(ids.into_iter().map(Into::into).collect());
    }

    pub fn clear_occupied(&mut self) {
        self.occupied = None;
    }

    /// Render list for one area, in table order
    pub fn statuses(&self, area_id: &str) -> EngineResult<Vec<TableView<'_>>> {
        let area = self
            .area(area_id)
            .ok_or_else(|| EngineError::AreaNotFound(area_id.to_string()))?;
        Ok(area
            .tables
            .iter()
            .map(|table| TableView {
                table,
                status: self.get_status(&table.id),
            })
            .collect())
    }
}
