//! Geometry normalization
//!
//! Maps a venue area drawn in arbitrary absolute coordinates into viewport
//! percentage space. Both axes are mapped independently onto
//! [`VIEWPORT_MIN`, `VIEWPORT_MAX`] with the same affine map applied to every
//! position and footprint vertex, so per-axis ordering between entities is
//! kept. An axis with zero extent (single entity, coincident or collinear
//! points) collapses onto [`VIEWPORT_CENTER`] instead of dividing by zero.

use std::ops::Deref;

use shared::models::{Area, Floorplan, Point, Rect};

pub const VIEWPORT_MIN: f64 = 8.0;
pub const VIEWPORT_MAX: f64 = 92.0;
pub const VIEWPORT_CENTER: f64 = 50.0;
/// Half-size of the box a collapsed footprint is replaced with
pub const FALLBACK_HALF_EXTENT: f64 = 6.0;

const DEGENERATE_SPAN: f64 = 1e-9;

/// An area whose coordinates are all in percentage space.
///
/// Only [`normalize`] produces one, so holding a `NormalizedArea` is proof
/// that normalization ran exactly once.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedArea(Area);

impl Deref for NormalizedArea {
    type Target = Area;

    fn deref(&self) -> &Area {
        &self.0
    }
}

impl NormalizedArea {
    pub fn into_inner(self) -> Area {
        self.0
    }

    /// Percentage-space bounds of a table or landmark
    pub fn bounds_of(&self, id: &str) -> Option<Rect> {
        if let Some(table) = self.0.table(id) {
            return element_bounds(table.position, table.footprint.as_deref());
        }
        self.0
            .landmarks()
            .iter()
            .find(|l| l.id == id)
            .and_then(|l| element_bounds(Some(l.position), l.footprint.as_deref()))
    }
}

fn element_bounds(position: Option<Point>, footprint: Option<&[Point]>) -> Option<Rect> {
    if let Some(points) = footprint.filter(|f| f.len() >= 3) {
        return Rect::bounding(points);
    }
    position.map(|p| {
        Rect::new(
            p.x - FALLBACK_HALF_EXTENT,
            p.y - FALLBACK_HALF_EXTENT,
            FALLBACK_HALF_EXTENT * 2.0,
            FALLBACK_HALF_EXTENT * 2.0,
        )
    })
}

fn usable_footprint(footprint: Option<&Vec<Point>>) -> Option<&[Point]> {
    footprint.map(Vec::as_slice).filter(|f| f.len() >= 3)
}

/// Affine map of one axis
#[derive(Debug, Clone, Copy)]
struct Axis {
    min: f64,
    span: f64,
}

impl Axis {
    fn degenerate() -> Self {
        Self { min: 0.0, span: 0.0 }
    }

    fn is_degenerate(&self) -> bool {
        !(self.span.is_finite() && self.span > DEGENERATE_SPAN)
    }

    fn map(&self, v: f64) -> f64 {
        if self.is_degenerate() || !v.is_finite() {
            return VIEWPORT_CENTER;
        }
        let t = (v - self.min) / self.span;
        (VIEWPORT_MIN + t * (VIEWPORT_MAX - VIEWPORT_MIN)).clamp(VIEWPORT_MIN, VIEWPORT_MAX)
    }

    /// Range a collapsed footprint occupies on this axis
    fn collapsed_range(&self, lo: f64, hi: f64) -> (f64, f64) {
        if self.is_degenerate() || hi - lo <= DEGENERATE_SPAN {
            let center = (lo + hi) / 2.0;
            (
                (center - FALLBACK_HALF_EXTENT).max(VIEWPORT_MIN),
                (center + FALLBACK_HALF_EXTENT).min(VIEWPORT_MAX),
            )
        } else {
            (lo, hi)
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct AxisMap {
    x: Axis,
    y: Axis,
}

impl AxisMap {
    fn from_bounds(bounds: Option<Rect>) -> Self {
        match bounds {
            Some(b) => Self {
                x: Axis {
                    min: b.x,
                    span: b.width,
                },
                y: Axis {
                    min: b.y,
                    span: b.height,
                },
            },
            None => Self {
                x: Axis::degenerate(),
                y: Axis::degenerate(),
            },
        }
    }

    fn is_degenerate(&self) -> bool {
        self.x.is_degenerate() || self.y.is_degenerate()
    }

    fn point(&self, p: Point) -> Point {
        Point::new(self.x.map(p.x), self.y.map(p.y))
    }

    fn footprint(&self, footprint: Option<Vec<Point>>) -> Option<Vec<Point>> {
        let points = footprint.filter(|f| f.len() >= 3)?;
        let mapped: Vec<Point> = points.iter().map(|p| self.point(*p)).collect();
        let bounds = Rect::bounding(&mapped)?;
        let flat = bounds.width <= DEGENERATE_SPAN || bounds.height <= DEGENERATE_SPAN;
        if !self.is_degenerate() && !flat {
            return Some(mapped);
        }
        let (x0, x1) = self.x.collapsed_range(bounds.x, bounds.x + bounds.width);
        let (y0, y1) = self.y.collapsed_range(bounds.y, bounds.y + bounds.height);
        Some(vec![
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x1, y1),
            Point::new(x0, y1),
        ])
    }
}

/// Every coordinate that takes part in the bounding box
fn collect_points(area: &Area) -> Vec<Point> {
    let mut points = Vec::new();
    for table in &area.tables {
        points.extend(table.position);
        if let Some(fp) = usable_footprint(table.footprint.as_ref()) {
            points.extend_from_slice(fp);
        }
    }
    for landmark in area.landmarks() {
        points.push(landmark.position);
        if let Some(fp) = usable_footprint(landmark.footprint.as_ref()) {
            points.extend_from_slice(fp);
        }
    }
    points
}

/// Normalize one raw area into percentage space. The input is not modified.
pub fn normalize(area: &Area) -> NormalizedArea {
    let points = collect_points(area);
    let map = AxisMap::from_bounds(Rect::bounding(&points));
    if map.is_degenerate() {
        tracing::debug!(
            area_id = %area.id,
            points = points.len(),
            "Degenerate area bounds, collapsing onto viewport center"
        );
    }

    let mut out = area.clone();
    for table in &mut out.tables {
        table.position = table.position.map(|p| map.point(p));
        table.footprint = map.footprint(table.footprint.take());
    }
    if let Some(landmarks) = out.landmarks.as_mut() {
        for landmark in landmarks {
            landmark.position = map.point(landmark.position);
            landmark.footprint = map.footprint(landmark.footprint.take());
        }
    }
    NormalizedArea(out)
}

/// Normalize every area of a floorplan, preserving order
pub fn normalize_floorplan(floorplan: &Floorplan) -> Vec<NormalizedArea> {
    floorplan.areas.iter().map(normalize).collect()
}
