//! Location suggestion model (arrival picker)

use serde::{Deserialize, Serialize};

/// A place the guest can pick as their departure point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSuggestion {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(alias = "latitude")]
    pub lat: f64,
    #[serde(alias = "longitude")]
    pub lon: f64,
    /// Distance to the venue
    #[serde(default)]
    pub distance_km: Option<f64>,
    #[serde(default)]
    pub eta_minutes: Option<u32>,
}

impl LocationSuggestion {
    /// Address when known, name otherwise
    pub fn label(&self) -> &str {
        self.address.as_deref().unwrap_or(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_field_names() {
        let json = r#"{
            "id": "p1", "name": "Koala Park", "address": null,
            "latitude": 40.41, "longitude": 49.86,
            "distance_km": 2.4, "eta_minutes": 9, "eta_seconds": 540,
            "route_summary": null, "provider": "gomap"
        }"#;
        let s: LocationSuggestion = serde_json::from_str(json).unwrap();
        assert_eq!(s.lat, 40.41);
        assert_eq!(s.lon, 49.86);
        assert_eq!(s.eta_minutes, Some(9));
        assert_eq!(s.label(), "Koala Park");
    }
}
