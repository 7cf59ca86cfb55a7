use crate::models::Coordinates;

/// Earth's radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Candidates within this distance of the reference point score the top
/// proximity tier during resolution.
pub const NEAR_BAND_KM: f64 = 1.0;
/// Outer edge of the middle proximity tier.
pub const MID_BAND_KM: f64 = 2.0;

/// Proximity tier of a directory candidate relative to the campus reference
/// point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProximityBand {
    Near,
    Mid,
    Far,
}

/// Calculate the Haversine distance between two points in kilometers.
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Band the distance between two coordinates into near/mid/far tiers.
#[inline]
pub fn proximity_band(from: Coordinates, to: Coordinates) -> ProximityBand {
    let distance = haversine_distance(from.lat, from.lng, to.lat, to.lng);
    if distance < NEAR_BAND_KM {
        ProximityBand::Near
    } else if distance < MID_BAND_KM {
        ProximityBand::Mid
    } else {
        ProximityBand::Far
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAMPUS: Coordinates = Coordinates {
        lat: 30.6280,
        lng: -96.3344,
    };

    #[test]
    fn test_haversine_distance_zero() {
        let distance = haversine_distance(CAMPUS.lat, CAMPUS.lng, CAMPUS.lat, CAMPUS.lng);
        assert!(distance < 0.01);
    }

    #[test]
    fn test_haversine_known_distance() {
        // Campus center to downtown Bryan is roughly 8 km
        let distance = haversine_distance(30.6280, -96.3344, 30.6744, -96.3698);
        assert!(distance > 5.0 && distance < 10.0, "got {}", distance);
    }

    #[test]
    fn test_proximity_bands() {
        // ~0.4 km north of the reference point
        let near = Coordinates {
            lat: 30.6315,
            lng: -96.3344,
        };
        assert_eq!(proximity_band(CAMPUS, near), ProximityBand::Near);

        // ~1.6 km away
        let mid = Coordinates {
            lat: 30.6425,
            lng: -96.3344,
        };
        assert_eq!(proximity_band(CAMPUS, mid), ProximityBand::Mid);

        // ~11 km away
        let far = Coordinates {
            lat: 30.7280,
            lng: -96.3344,
        };
        assert_eq!(proximity_band(CAMPUS, far), ProximityBand::Far);
    }
}
