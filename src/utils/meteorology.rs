use crate::utils::constants::{
    DAYTIME_PBL_HEIGHT, GAS_CONSTANT_DRY_AIR, GRAVITY, LAPSE_RATE_K_PER_KM, NIGHTTIME_PBL_HEIGHT,
    REFERENCE_TEMPERATURE_K, SURFACE_PRESSURE_MB,
};

/// Standard-atmosphere height (m) of a pressure level (mb)
pub fn height_from_pressure(pressure: f64) -> f64 {
    let lapse = LAPSE_RATE_K_PER_KM * 0.001;
    let exponent = GAS_CONSTANT_DRY_AIR * lapse / GRAVITY;
    (REFERENCE_TEMPERATURE_K / lapse) * (1.0 - (pressure / SURFACE_PRESSURE_MB).powf(exponent))
}

/// Relative humidity (%) from specific humidity (g/kg), pressure (mb) and
/// temperature (°C).
///
/// `SPHU = 0.622 * EVAP / PRES` and `ESAT = exp(21.4 - 5351 / T)`, so
/// `RH = (SPHU * PRES / 0.622) / ESAT`, scaled by 1/10 for the g/kg units.
pub fn relative_humidity(specific_humidity: f64, pressure: f64, temperature: f64) -> f64 {
    let vapor_pressure = specific_humidity * pressure / 0.622;
    let saturation = (21.4 - 5351.0 / (temperature + 273.15)).exp();
    vapor_pressure / saturation / 10.0
}

/// Dew point (°C) from relative humidity (%) and temperature (°C)
pub fn dew_point(relative_humidity: f64, temperature: f64) -> f64 {
    let log_rh = if relative_humidity < 1.0 {
        -5.0
    } else {
        (relative_humidity / 100.0).ln()
    };
    -5321.0 / (log_rh - 5321.0 / (273.0 + temperature)) - 273.0
}

/// Step-function default for the planetary boundary layer height
pub fn default_pbl(hour: f64, sunrise: f64, sunset: f64) -> f64 {
    if sunrise + 1.0 < hour && hour < sunset {
        DAYTIME_PBL_HEIGHT
    } else {
        NIGHTTIME_PBL_HEIGHT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_height_from_pressure() {
        assert_close(height_from_pressure(993.0), 59.20695352193937);
        assert_close(height_from_pressure(1000.0), 0.0);
    }

    #[test]
    fn test_relative_humidity() {
        assert_close(relative_humidity(3.2, 993.0, 31.0), 11.352118179569345);
    }

    #[test]
    fn test_dew_point_branches() {
        let rh = relative_humidity(3.2, 993.0, 31.0);
        assert_close(dew_point(rh, 31.0), -2.6110043729268);

        let dry = dew_point(0.5, 10.0);
        assert_close(dry, -5321.0 / (-5.0 - 5321.0 / 283.0) - 273.0);
    }

    #[test]
    fn test_default_pbl_step() {
        assert_eq!(default_pbl(12.0, 6.0, 20.0), DAYTIME_PBL_HEIGHT);
        assert_eq!(default_pbl(7.0, 6.0, 20.0), NIGHTTIME_PBL_HEIGHT);
        assert_eq!(default_pbl(20.0, 6.0, 20.0), NIGHTTIME_PBL_HEIGHT);
        assert_eq!(default_pbl(0.0, 6.0, 20.0), NIGHTTIME_PBL_HEIGHT);
    }
}
