//! Recent earthquakes around the caller's geolocated public IP.

use crate::adapters::http::HttpRequest;
use crate::config::settings::SettingDefinition;
use crate::core::context::PluginContext;
use crate::core::menu::{Justify, Menu};
use crate::core::params::Params;
use crate::domain::ports::{CommandRunner, Plugin};
use crate::plugins::{debug_setting, fetch_public_ip, PUBLIC_IP_URL};
use crate::utils::error::{PluginError, Result};
use crate::utils::format::{kilometers_to_miles, miles_to_kilometers};
use crate::utils::time::unix_to_human;
use async_trait::async_trait;
use chrono::{Duration, Local};
use serde::Deserialize;
use serde_json::Value;

const DEBUG_ENABLED: &str = "VAR_EARTHQUAKES_DEBUG_ENABLED";
const LIMIT: &str = "VAR_EARTHQUAKES_LIMIT";
const MIN_MAGNITUDE: &str = "VAR_EARTHQUAKES_MIN_MAGNITUDE";
const RADIUS: &str = "VAR_EARTHQUAKES_RADIUS_MILES";
const UNIT: &str = "VAR_EARTHQUAKES_UNIT";

const TIME_FORMAT: &str = "%a, %B %-d, %Y %H:%M:%S";

pub const GEOLOCATION_URL: &str = "https://ipinfo.io";
pub const EVENTS_URL: &str = "https://earthquake.usgs.gov/fdsnws/event/1/query";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub public_ip: String,
    /// Base URL; the address is looked up at `<base>/<ip>/json`.
    pub geolocation: String,
    pub events: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            public_ip: PUBLIC_IP_URL.to_string(),
            geolocation: GEOLOCATION_URL.to_string(),
            events: EVENTS_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeoData {
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub postal: Option<String>,
    pub loc: Option<String>,
}

impl GeoData {
    /// `City, Region, Country[, Postal]`, when the first three are known.
    pub fn location(&self) -> Option<String> {
        let mut parts = vec![self.city.clone()?, self.region.clone()?, self.country.clone()?];
        if let Some(postal) = &self.postal {
            parts.push(postal.clone());
        }
        Some(parts.join(", "))
    }

    pub fn coordinates(&self) -> Option<(String, String)> {
        let loc = self.loc.as_deref()?;
        let mut parts = regex!(r"\s*,\s*").split(loc.trim());
        let latitude = parts.next()?.to_string();
        let longitude = parts.next()?.to_string();
        Some((latitude, longitude))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuakeProperties {
    #[serde(default)]
    pub place: Option<String>,
    pub mag: Option<f64>,
    pub time: i64,
    pub updated: i64,
    pub url: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Feature {
    pub properties: QuakeProperties,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone)]
pub struct QuakeReport {
    pub location: Option<String>,
    pub features: Vec<Feature>,
}

/// Rewrite a leading `N km` distance in a USGS place name to miles.
pub fn place_in_miles(place: &str) -> String {
    let Some(caps) = regex!(r"^(\d+) km").captures(place) else {
        return place.to_string();
    };
    let Ok(km) = caps[1].parse::<f64>() else {
        return place.to_string();
    };
    let miles = (kilometers_to_miles(km) * 100.0).round() / 100.0;
    place.replacen(&caps[0], &format!("{} m", miles), 1)
}

#[derive(Debug, Default)]
pub struct Earthquakes {
    endpoints: Endpoints,
}

impl Earthquakes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_endpoints(endpoints: Endpoints) -> Self {
        Self { endpoints }
    }

    fn events_request(&self, ctx: &PluginContext, latitude: &str, longitude: &str) -> HttpRequest {
        let settings = &ctx.settings;
        let radius = settings.get_f64(RADIUS);
        let radius_km = if settings.get_str(UNIT) == "m" {
            miles_to_kilometers(radius)
        } else {
            radius
        };
        let now = Local::now();
        let start = now - Duration::days(1);
        HttpRequest::get(self.endpoints.events.clone())
            .query("format", "geojson")
            .query("starttime", start.format("%Y-%m-%dT%H:%M:%S"))
            .query("endtime", now.format("%Y-%m-%dT%H:%M:%S"))
            .query("latitude", latitude)
            .query("longitude", longitude)
            .query("limit", settings.get_i64(LIMIT))
            .query("maxradiuskm", format!("{:.2}", radius_km))
            .query("minmagnitude", settings.get_i64(MIN_MAGNITUDE))
            .query("offset", 1)
            .query("orderby", "time")
            .encode_query(true)
    }
}

#[async_trait]
impl Plugin for Earthquakes {
    type Data = QuakeReport;

    fn name(&self) -> &str {
        "Earthquakes"
    }

    fn failure_title(&self) -> String {
        "Earthquakes: Error".to_string()
    }

    fn settings(&self, _runner: &dyn CommandRunner) -> Vec<SettingDefinition> {
        let steps = |from: i64, to: i64, step: usize| -> Vec<Value> {
            (from..=to).step_by(step).map(Value::from).collect()
        };
        vec![
            debug_setting(DEBUG_ENABLED),
            SettingDefinition::new(LIMIT, 30)
                .range(5.0, 50.0)
                .choice_with("limit", "Limit", steps(5, 50, 5)),
            SettingDefinition::new(MIN_MAGNITUDE, 0)
                .range(0.0, 20.0)
                .choice_with("magnitude", "Minimum Magnitude", steps(0, 20, 2)),
            SettingDefinition::new(RADIUS, 100)
                .range(10.0, 500.0)
                .choice_with("radius", "Radius in {VAR_EARTHQUAKES_UNIT}", steps(50, 500, 50)),
            SettingDefinition::new(UNIT, "m")
                .one_of(vec![Value::from("km"), Value::from("m")])
                .choice("unit", "Unit"),
        ]
    }

    fn debug_setting(&self) -> Option<&str> {
        Some(DEBUG_ENABLED)
    }

    async fn collect(&self, ctx: &PluginContext) -> Result<QuakeReport> {
        let ip = fetch_public_ip(&ctx.http, &self.endpoints.public_ip).await?;
        let geo_url = format!("{}/{}/json", self.endpoints.geolocation.trim_end_matches('/'), ip);
        let geodata: GeoData = ctx.http.get_json(&HttpRequest::get(geo_url)).await?;
        let (latitude, longitude) = geodata
            .coordinates()
            .ok_or_else(|| PluginError::parse("geolocation", format!("no coordinates for {}", ip)))?;
        tracing::debug!("Geolocated {} to {},{}", ip, latitude, longitude);

        let request = self.events_request(ctx, &latitude, &longitude);
        let events: FeatureCollection = ctx.http.get_json(&request).await?;
        Ok(QuakeReport {
            location: geodata.location(),
            features: events.features,
        })
    }

    fn render(&self, report: QuakeReport, ctx: &PluginContext, menu: &mut Menu) -> Result<()> {
        let in_miles = ctx.settings.get_str(UNIT) == "m";
        menu.title(&format!("Earthquakes: {}", report.features.len()), Params::new());
        menu.separator();
        if let Some(location) = &report.location {
            menu.text(location);
            menu.separator();
        }
        for feature in &report.features {
            let quake = &feature.properties;
            let place = quake.place.clone().unwrap_or_else(|| "Unknown location".to_string());
            let place = if in_miles { place_in_miles(&place) } else { place };
            menu.text(&place);
            menu.item(&format!("--{}", quake.url), Params::new().color("blue").href(&quake.url));
            let rows = vec![
                (
                    "Magnitude".to_string(),
                    quake.mag.map(|m| m.to_string()).unwrap_or_else(|| "N/A".to_string()),
                ),
                ("Time".to_string(), unix_to_human(quake.time / 1000, TIME_FORMAT)),
                ("Updated".to_string(), unix_to_human(quake.updated / 1000, TIME_FORMAT)),
                ("Status".to_string(), quake.status.clone()),
            ];
            menu.ordered_dict(&rows, Justify::Left, "", 2);
        }
        Ok(())
    }
}
