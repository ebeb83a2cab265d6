//! Venue floor models (楼层、桌台、地标)
//!
//! Raw coordinates are in whatever absolute space the venue editor used.
//! The engine normalizes them into percentage space before rendering.

use serde::{Deserialize, Deserializer, Serialize};

/// 2-D point
///
/// Deserializes from either `{"x": .., "y": ..}` or a `[x, y]` pair,
/// since the floorplan endpoint emits tuples.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "PointRepr")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PointRepr {
    Pair([f64; 2]),
    Object { x: f64, y: f64 },
}

impl From<PointRepr> for Point {
    fn from(repr: PointRepr) -> Self {
        match repr {
            PointRepr::Pair([x, y]) => Point { x, y },
            PointRepr::Object { x, y } => Point { x, y },
        }
    }
}

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Smallest rect covering all points, `None` for an empty iterator
    pub fn bounding<'a>(points: impl IntoIterator<Item = &'a Point>) -> Option<Self> {
        let mut iter = points.into_iter().filter(|p| p.is_finite());
        let first = iter.next()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in iter {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Rescale a rect from percentage space into a `width` x `height` canvas
    pub fn to_canvas(&self, width: f64, height: f64) -> Self {
        Self::new(
            self.x / 100.0 * width,
            self.y / 100.0 * height,
            self.width / 100.0 * width,
            self.height / 100.0 * height,
        )
    }
}

/// Table shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableShape {
    Circle,
    Rect,
    #[serde(other)]
    Other,
}

/// Dining table entity (桌台)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub id: String,
    pub name: String,
    #[serde(default = "default_capacity")]
    pub capacity: u32,
    #[serde(default)]
    pub position: Option<Point>,
    #[serde(default)]
    pub shape: Option<TableShape>,
    /// Rotation in degrees
    #[serde(default)]
    pub rotation: Option<f64>,
    /// Ordered polygon; takes precedence over shape/position when it has 3+ points
    #[serde(default)]
    pub footprint: Option<Vec<Point>>,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_capacity() -> u32 {
    2
}

impl Table {
    /// Whether this table can seat the party
    pub fn seats(&self, party_size: u32) -> bool {
        party_size >= 1 && self.capacity >= party_size
    }

    pub fn rotation_degrees(&self) -> f64 {
        self.rotation.filter(|r| r.is_finite()).unwrap_or(0.0)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

/// Non-reservable venue feature (bar, entrance, stage, window...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub id: String,
    pub label: String,
    /// Sent as `type` by the floor plan endpoint
    #[serde(default, alias = "type", deserialize_with = "null_as_empty")]
    pub category: String,
    pub position: Point,
    #[serde(default)]
    pub footprint: Option<Vec<Point>>,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Area visual theme, passed through to the renderer untouched
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AreaTheme {
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub accent: Option<String>,
    #[serde(default)]
    pub texture: Option<String>,
}

/// Area entity (区域：大厅、露台、包厢等)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tables: Vec<Table>,
    #[serde(default)]
    pub landmarks: Option<Vec<Landmark>>,
    #[serde(default)]
    pub theme: Option<AreaTheme>,
}

impl Area {
    pub fn table(&self, id: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.id == id)
    }

    pub fn landmarks(&self) -> &[Landmark] {
        self.landmarks.as_deref().unwrap_or(&[])
    }
}

/// Editor canvas size reported with a floorplan
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 1000.0,
        }
    }
}

/// Floorplan payload (`GET /restaurants/{id}/floorplan`)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Floorplan {
    #[serde(default)]
    pub canvas: Canvas,
    #[serde(default)]
    pub areas: Vec<Area>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_accepts_pair_and_object() {
        let a: Point = serde_json::from_str("[120, 40.5]").unwrap();
        let b: Point = serde_json::from_str(r#"{"x": 120, "y": 40.5}"#).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            r#"{"x":120.0,"y":40.5}"#
        );
    }

    #[test]
    fn test_floorplan_payload() {
        let json = r#"{
            "canvas": {"width": 1000, "height": 800},
            "areas": [{
                "id": "a1",
                "name": "Main hall",
                "tables": [
                    {"id": "t1", "name": "T1", "capacity": 4, "position": [100, 200],
                     "shape": "circle", "tags": ["window"], "rotation": null, "footprint": null},
                    {"id": "t2", "name": "T2", "capacity": 2, "shape": "booth"}
                ],
                "theme": null,
                "landmarks": [{"id": "bar", "label": "Bar", "category": "bar", "position": [500, 40]}]
            }]
        }"#;
        let plan: Floorplan = serde_json::from_str(json).unwrap();
        assert_eq!(plan.canvas.height, 800.0);
        let area = &plan.areas[0];
        assert_eq!(area.tables.len(), 2);
        assert_eq!(area.tables[0].position, Some(Point::new(100.0, 200.0)));
        assert_eq!(area.tables[1].shape, Some(TableShape::Other));
        assert_eq!(area.tables[1].position, None);
        assert!(area.tables[0].has_tag("Window"));
        assert_eq!(area.landmarks().len(), 1);
        assert!(area.table("t2").is_some());
    }

    #[test]
    fn test_landmark_type_field() {
        let landmark: Landmark = serde_json::from_str(
            r#"{"id": "bar", "label": "Bar", "type": "bar", "position": [500, 40]}"#,
        )
        .unwrap();
        assert_eq!(landmark.category, "bar");

        let landmark: Landmark = serde_json::from_str(
            r#"{"id": "door", "label": "Entrance", "type": null, "position": {"x": 0, "y": 10}}"#,
        )
        .unwrap();
        assert_eq!(landmark.category, "");
    }

    #[test]
    fn test_seats() {
        let table = Table {
            id: "t1".into(),
            name: "T1".into(),
            capacity: 4,
            position: None,
            shape: None,
            rotation: Some(f64::NAN),
            footprint: None,
            tags: vec![],
        };
        assert!(table.seats(4));
        assert!(!table.seats(5));
        assert!(!table.seats(0));
        assert_eq!(table.rotation_degrees(), 0.0);
    }

    #[test]
    fn test_rect_bounding_and_percent() {
        let pts = [Point::new(10.0, 20.0), Point::new(30.0, 5.0), Point::new(f64::NAN, 0.0)];
        let rect = Rect::bounding(&pts).unwrap();
        assert_eq!(rect, Rect::new(10.0, 5.0, 20.0, 15.0));
        assert_eq!(rect.center(), Point::new(20.0, 12.5));
        assert!(Rect::bounding(&[] as &[Point]).is_none());

        let canvas = Rect::new(10.0, 20.0, 50.0, 10.0).to_canvas(400.0, 200.0);
        assert_eq!(canvas, Rect::new(40.0, 40.0, 200.0, 20.0));
    }
}
