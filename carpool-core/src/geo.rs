use serde::{Deserialize, Serialize};

/// Default zoom used when a map centres on a single point
pub const DEFAULT_LATITUDE_DELTA: f64 = 0.0922;
pub const DEFAULT_LONGITUDE_DELTA: f64 = 0.0421;

/// Slack for the rounding in `latitude +/- delta / 2`
const EDGE_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// Visible map area: a centre plus the span shown in each direction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapRegion {
    pub latitude: f64,
    pub longitude: f64,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl MapRegion {
    pub fn around(point: LatLng) -> Self {
        Self {
            latitude: point.lat,
            longitude: point.lng,
            latitude_delta: DEFAULT_LATITUDE_DELTA,
            longitude_delta: DEFAULT_LONGITUDE_DELTA,
        }
    }

    /// Smallest region showing every point (origin, destination, current location).
    /// Never zooms in further than `around` would.
    pub fn enclosing(points: &[LatLng]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_lat, mut max_lat) = (first.lat, first.lat);
        let (mut min_lng, mut max_lng) = (first.lng, first.lng);
        for point in &points[1..] {
            min_lat = min_lat.min(point.lat);
            max_lat = max_lat.max(point.lat);
            min_lng = min_lng.min(point.lng);
            max_lng = max_lng.max(point.lng);
        }

        Some(Self {
            latitude: (min_lat + max_lat) / 2.0,
            longitude: (min_lng + max_lng) / 2.0,
            latitude_delta: (max_lat - min_lat).max(DEFAULT_LATITUDE_DELTA),
            longitude_delta: (max_lng - min_lng).max(DEFAULT_LONGITUDE_DELTA),
        })
    }

    /// Edges count as inside
    pub fn contains(&self, point: LatLng) -> bool {
        (point.lat - self.latitude).abs() <= self.latitude_delta / 2.0 + EDGE_TOLERANCE
            && (point.lng - self.longitude).abs() <= self.longitude_delta / 2.0 + EDGE_TOLERANCE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_has_no_region() {
        assert!(MapRegion::enclosing(&[]).is_none());
    }

    #[test]
    fn test_single_point_uses_default_zoom() {
        let point = LatLng { lat: 40.0, lng: -3.7 };
        assert_eq!(MapRegion::enclosing(&[point]), Some(MapRegion::around(point)));
    }

    #[test]
    fn test_region_encloses_origin_and_destination() {
        let origin = LatLng { lat: 40.40, lng: -3.70 };
        let destination = LatLng { lat: 40.60, lng: -3.40 };
        let region = MapRegion::enclosing(&[origin, destination]).unwrap();

        assert!((region.latitude - 40.50).abs() < 1e-9);
        assert!((region.longitude_delta - 0.30).abs() < 1e-9);
        assert!(region.contains(origin));
        assert!(region.contains(destination));
        assert!(!region.contains(LatLng { lat: 40.70, lng: -3.50 }));
    }

    #[test]
    fn test_region_contains_every_point_it_was_built_from() {
        let points = [
            LatLng { lat: 40.4168, lng: -3.7038 },
            LatLng { lat: 41.3874, lng: 2.1686 },
            LatLng { lat: 39.4699, lng: -0.3763 },
            LatLng { lat: -33.8688, lng: 151.2093 },
        ];
        for end in 1..=points.len() {
            let region = MapRegion::enclosing(&points[..end]).unwrap();
            for point in &points[..end] {
                assert!(region.contains(*point), "{point:?} outside {region:?}");
            }
        }
    }
}
