/// Exact (lat, lng) pair usable as a hash key.
///
/// Coordinates come straight from the profile text, so equal locations parse
/// to bit-identical floats. `-0.0` is folded into `0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CoordinateKey {
    lat_bits: u64,
    lng_bits: u64,
}

impl CoordinateKey {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat_bits: normalize(lat).to_bits(),
            lng_bits: normalize(lng).to_bits(),
        }
    }

    pub fn lat(&self) -> f64 {
        f64::from_bits(self.lat_bits)
    }

    pub fn lng(&self) -> f64 {
        f64::from_bits(self.lng_bits)
    }
}

fn normalize(value: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        value
    }
}
