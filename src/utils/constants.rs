/// Line markers emitted by the ARL profiler
pub const HOUR_SEPARATOR: &str = "______";
pub const NEXT_SEPARATOR: &str = "------next------";
pub const PROFILE_TIME_MARKER: &str = "Profile Time:";
pub const BULK_LOCATION_MARKER: &str = "Profile:";
pub const SINGLE_LOCATION_MARKER: &str = "Profile Location:";

/// Two-digit profile years at or below this value belong to the 2000s
pub const TWO_DIGIT_YEAR_PIVOT: i32 = 1980;

/// Synthesized column names
pub const PRESSURE: &str = "pressure";
pub const PRESSURE_AT_SURFACE: &str = "pressure_at_surface";

/// Surface variables replaced when the first hour is zeroed out
pub const FIRST_HOUR_KEYS: [&str; 7] = [
    PRESSURE_AT_SURFACE,
    "TPP3",
    "T02M",
    "RH2M",
    "U10M",
    "V10M",
    "PRSS",
];

/// Level variables every hour carries, `null` when the file lacks them
pub const ENSURED_KEYS: [&str; 7] = [PRESSURE, "TPOT", "WSPD", "WDIR", "WWND", "TEMP", "SPHU"];

/// Surface variables reported as a single value
pub const SCALAR_KEYS: [&str; 12] = [
    "TO2M",
    "RH2M",
    "TPP3",
    "TPP6",
    "PBLH",
    "T02M",
    "U10M",
    "V10M",
    "PRSS",
    "SHGT",
    "TPPA",
    PRESSURE_AT_SURFACE,
];

/// Derived output fields
pub const HEIGHT: &str = "HGTS";
pub const RELATIVE_HUMIDITY: &str = "RELH";
pub const DEW_POINT: &str = "dew_point";
pub const SUNRISE_HOUR: &str = "sunrise_hour";
pub const SUNSET_HOUR: &str = "sunset_hour";
pub const BOUNDARY_LAYER_HEIGHT: &str = "HPBL";

/// Standard atmosphere for pressure-to-height conversion
pub const SURFACE_PRESSURE_MB: f64 = 1000.0;
pub const REFERENCE_TEMPERATURE_K: f64 = 288.15;
pub const LAPSE_RATE_K_PER_KM: f64 = 6.5;
pub const GRAVITY: f64 = 9.80665;
pub const GAS_CONSTANT_DRY_AIR: f64 = 287.04;

/// Default planetary boundary layer heights (m)
pub const DAYTIME_PBL_HEIGHT: f64 = 1000.0;
pub const NIGHTTIME_PBL_HEIGHT: f64 = 100.0;

/// Official zenith for sunrise/sunset, including refraction
pub const SUN_ZENITH_DEGREES: f64 = 90.833;

/// Processing defaults
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB
pub const DEFAULT_CONFIG_FILE: &str = "arl-profiler.toml";
pub const CONFIG_ENV_PREFIX: &str = "ARL_PROFILER";
