//! Number formatting helpers shared by every plugin.

use crate::utils::error::{PluginError, Result};

const BINARY_UNITS: [&str; 8] = ["", "Ki", "Mi", "Gi", "Ti", "Pi", "Ei", "Zi"];

/// Units accepted by [`byte_converter`], plus `auto` for [`format_number`].
pub fn valid_storage_units() -> Vec<&'static str> {
    vec![
        "K", "Ki", "M", "Mi", "G", "Gi", "T", "Ti", "P", "Pi", "E", "Ei", "Z", "Zi", "auto",
    ]
}

pub fn pad_float(number: f64) -> String {
    format!("{:.2}", number)
}

/// Convert bytes to a fixed unit. `Ki`-style units divide by 1024, bare
/// prefixes by 1000.
pub fn byte_converter(bytes: u64, unit: &str) -> Result<String> {
    let (prefix, binary) = match unit.as_bytes() {
        [p] => (*p, false),
        [p, b'i'] => (*p, true),
        _ => return Err(invalid_unit(unit)),
    };
    let exponent = match prefix {
        b'K' => 1,
        b'M' => 2,
        b'G' => 3,
        b'T' => 4,
        b'P' => 5,
        b'E' => 6,
        b'Z' => 7,
        _ => return Err(invalid_unit(unit)),
    };
    let divisor: f64 = if binary { 1024.0 } else { 1000.0 };

    Ok(format!(
        "{} {}B",
        pad_float(bytes as f64 / divisor.powi(exponent)),
        unit
    ))
}

fn invalid_unit(unit: &str) -> PluginError {
    PluginError::InvalidConfigValueError {
        field: "unit".to_string(),
        value: unit.to_string(),
        reason: format!("Valid units: {}", valid_storage_units().join(", ")),
    }
}

/// Pick the most logical binary unit for a byte count.
pub fn format_number(num: u64) -> String {
    auto_scale(num, "")
}

/// Same as [`format_number`] for a transfer rate.
pub fn process_bytes(num: u64) -> String {
    auto_scale(num, "/s")
}

/// `auto` picks a unit, anything else must be a valid [`byte_converter`] unit.
pub fn format_bytes(bytes: u64, unit: &str) -> Result<String> {
    if unit == "auto" {
        Ok(format_number(bytes))
    } else {
        byte_converter(bytes, unit)
    }
}

fn auto_scale(num: u64, suffix: &str) -> String {
    if num < 1024 {
        return format!("{} B{}", num, suffix);
    }

    let mut value = num as f64;
    for unit in BINARY_UNITS {
        if value.abs() < 1024.0 {
            return format!("{} {}B{}", round_display(value), unit, suffix);
        }
        value /= 1024.0;
    }
    format!("{} YiB{}", pad_float(value), suffix)
}

/// Two-decimal rounding printed in shortest form, always with a fraction.
fn round_display(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{:.1}", rounded)
    } else {
        format!("{}", rounded)
    }
}

pub fn float_to_pct(number: f64) -> String {
    format!("{:.2}%", number * 100.0)
}

pub fn miles_to_kilometers(miles: f64) -> f64 {
    miles * 1.609344
}

pub fn kilometers_to_miles(kilometers: f64) -> f64 {
    kilometers * 0.6213712
}
