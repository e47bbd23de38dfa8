//! Mercator projection from geographic to planar coordinates.
//!
//! The projector is centered on a reference point which maps to the origin.
//! `x` grows eastward and `y` grows southward, matching screen orientation.

use std::f64::consts::FRAC_PI_4;

use crate::errors::{Error, Result};

/// Latitude limit of the Mercator projection, in degrees.
pub const MAX_LAT: f64 = 85.05112878;
pub const MIN_LAT: f64 = -MAX_LAT;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanarPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projector {
    center_lon_rad: f64,
    center_y: f64,
    scale: f64,
}

fn mercator_y(lat: f64) -> f64 {
    let phi = lat.clamp(MIN_LAT, MAX_LAT).to_radians();
    (FRAC_PI_4 + phi / 2.0).tan().ln()
}

impl Projector {
    pub fn new(center_lon: f64, center_lat: f64, scale: f64) -> Result<Self> {
        if !(center_lon.is_finite() && center_lat.is_finite()) {
            return Err(Error::Construction(format!(
                "projector center must be finite, got ({}, {})",
                center_lon, center_lat
            )));
        }
        if !(scale.is_finite() && scale > 0.0) {
            return Err(Error::Construction(format!(
                "projector scale must be positive, got {}",
                scale
            )));
        }
        Ok(Projector {
            center_lon_rad: center_lon.to_radians(),
            center_y: mercator_y(center_lat),
            scale,
        })
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    #[inline]
    pub fn project(&self, lon: f64, lat: f64) -> PlanarPoint {
        PlanarPoint {
            x: self.scale * (lon.to_radians() - self.center_lon_rad),
            y: -self.scale * (mercator_y(lat) - self.center_y),
        }
    }
}
