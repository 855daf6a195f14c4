//! Great-circle geometry used by the nearby-club search and GPS check-in.
//!
//! All trigonometry is done in f64 radians and every distance is in kilometers.

use crate::core::error::{AppError, Result};

/// Mean Earth radius in kilometers (for Haversine formula)
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A validated (latitude, longitude) pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    lat: f64,
    lng: f64,
}

impl Coordinate {
    /// Build a coordinate, rejecting anything outside [-90, 90] x [-180, 180]
    pub fn new(lat: f64, lng: f64) -> Result<Self> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(AppError::Validation(format!(
                "Latitude must be between -90 and 90, got {}",
                lat
            )));
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(AppError::Validation(format!(
                "Longitude must be between -180 and 180, got {}",
                lng
            )));
        }
        Ok(Self { lat, lng })
    }

    /// Build from an optional pair; both halves must be present or absent together
    pub fn from_parts(lat: Option<f64>, lng: Option<f64>) -> Result<Option<Self>> {
        match (lat, lng) {
            (Some(lat), Some(lng)) => Self::new(lat, lng).map(Some),
            (None, None) => Ok(None),
            _ => Err(AppError::Validation(
                "Latitude and longitude must be provided together".to_string(),
            )),
        }
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }
}

/// Great-circle distance between two coordinates in kilometers
pub fn haversine_km(from: Coordinate, to: Coordinate) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let delta_lat = (to.lat - from.lat).to_radians();
    let delta_lng = (to.lng - from.lng).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    // Clamp guards against a drifting slightly above 1.0 for antipodal points
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Round a distance to one decimal place for presentation
pub fn round_distance(km: f64) -> f64 {
    (km * 10.0).round() / 10.0
}

/// Latitude/longitude rectangle that contains every point within a radius of a center
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    /// Compute the prefilter box around `center`.
    ///
    /// The box can be larger than the circle but never smaller. When it would
    /// touch a pole or cross the antimeridian, the longitude range widens to the
    /// full [-180, 180] so no candidate is dropped before the exact distance check.
    pub fn around(center: Coordinate, radius_km: f64) -> Self {
        let angular = radius_km / EARTH_RADIUS_KM;
        let lat_delta = angular.to_degrees();

        let min_lat = (center.lat - lat_delta).max(-90.0);
        let max_lat = (center.lat + lat_delta).min(90.0);

        let cos_lat = center.lat.to_radians().cos();
        let full_lng = min_lat <= -90.0
            || max_lat >= 90.0
            || cos_lat <= f64::EPSILON
            || angular.sin() >= cos_lat;

        let (min_lng, max_lng) = if full_lng {
            (-180.0, 180.0)
        } else {
            // Δ/cos(lat) alone falls short of the circle's true extent at high
            // latitudes; asin(sin Δ / cos lat) is exact, take the wider of the two.
            let lng_delta = (angular / cos_lat)
                .max((angular.sin() / cos_lat).asin())
                .to_degrees();
            let min_lng = center.lng - lng_delta;
            let max_lng = center.lng + lng_delta;
            if min_lng < -180.0 || max_lng > 180.0 {
                (-180.0, 180.0)
            } else {
                (min_lng, max_lng)
            }
        };

        Self {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        }
    }

    /// Same predicate the Postgres store applies with `BETWEEN`
    #[cfg(test)]
    pub fn contains(&self, point: Coordinate) -> bool {
        (self.min_lat..=self.max_lat).contains(&point.lat)
            && (self.min_lng..=self.max_lng).contains(&point.lng)
    }
}

/// A candidate annotated with its exact distance from the search center
#[derive(Debug, Clone)]
pub struct WithinRadius<T> {
    pub item: T,
    pub distance_km: f64,
}

/// Keep candidates within `radius_km` of `center`, nearest first, at most `limit`.
///
/// The reported distance is rounded for presentation only; filtering and
/// ordering use the exact value.
pub fn nearest_within<T, F>(
    center: Coordinate,
    radius_km: f64,
    limit: usize,
    candidates: impl IntoIterator<Item = T>,
    position: F,
) -> Vec<WithinRadius<T>>
where
    F: Fn(&T) -> Coordinate,
{
    let mut hits: Vec<(T, f64)> = candidates
        .into_iter()
        .filter_map(|item| {
            let distance = haversine_km(center, position(&item));
            (distance <= radius_km).then_some((item, distance))
        })
        .collect();

    hits.sort_by(|a, b| a.1.total_cmp(&b.1));
    hits.truncate(limit);

    hits.into_iter()
        .map(|(item, distance)| WithinRadius {
            item,
            distance_km: round_distance(distance),
        })
        .collect()
}
