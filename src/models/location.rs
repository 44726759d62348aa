//! Location model for geographic coordinates

use serde::{Deserialize, Serialize};

/// Device position used by the weather panel. Lives for one session only.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Location {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Human readable label (city, "Current Location", ...)
    pub label: String,
}

impl Location {
    /// Create a new location
    #[must_use]
    pub fn new(latitude: f64, longitude: f64, label: impl Into<String>) -> Self {
        Self {
            latitude,
            longitude,
            label: label.into(),
        }
    }

    /// Check both coordinates are within their valid ranges
    #[must_use]
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_coordinates() {
        let location = Location::new(40.7128, -74.006, "New York");
        assert_eq!(location.format_coordinates(), "40.7128, -74.0060");
    }

    #[test]
    fn test_validity() {
        assert!(Location::new(40.7128, -74.006, "NYC").is_valid());
        assert!(!Location::new(91.0, 0.0, "nowhere").is_valid());
        assert!(!Location::new(0.0, -181.0, "nowhere").is_valid());
    }
}
