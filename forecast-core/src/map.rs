//! Map overlay description: base layer, weather tile overlays and a city marker.
//!
//! Nothing here renders anything. A front end picks the layers it wants and
//! fetches tiles from the URLs.

use serde::Serialize;
use std::f64::consts::PI;

use crate::Coordinates;

/// Center used before any city has been resolved.
pub const DEFAULT_CENTER: Coordinates = Coordinates { latitude: 51.505, longitude: -0.09 };
pub const DEFAULT_ZOOM: u8 = 10;

const OSM_TILES: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
const OSM_ATTRIBUTION: &str =
    "Map data © <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";
const OWM_ATTRIBUTION: &str = "Weather data © <a href=\"https://openweathermap.org/\">OpenWeatherMap</a>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Overlay {
    Clouds,
    Temperature,
    Precipitation,
}

impl Overlay {
    pub const ALL: [Overlay; 3] = [Overlay::Clouds, Overlay::Temperature, Overlay::Precipitation];

    /// Layer name in the OpenWeather tile API.
    pub fn layer(&self) -> &'static str {
        match self {
            Overlay::Clouds => "clouds",
            Overlay::Temperature => "temp",
            Overlay::Precipitation => "precipitation",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Overlay::Clouds => "Weather - Clouds",
            Overlay::Temperature => "Weather - Temperature",
            Overlay::Precipitation => "Weather - Precipitation",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileLayer {
    pub name: String,
    pub url_template: String,
    pub attribution: &'static str,
    pub enabled: bool,
}

impl TileLayer {
    /// Concrete URL of one tile. `{s}` always resolves to subdomain `a`.
    pub fn tile_url(&self, z: u8, x: u32, y: u32) -> String {
        self.url_template
            .replace("{s}", "a")
            .replace("{z}", &z.to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub position: Coordinates,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub center: Coordinates,
    pub zoom: u8,
    pub base: TileLayer,
    pub overlays: Vec<TileLayer>,
    pub marker: Option<Marker>,
}

impl MapView {
    /// Build the map for a (possibly unresolved) location.
    ///
    /// Weather overlays need an API key and are left out without one.
    pub fn new(location: Option<Coordinates>, label: &str, api_key: Option<&str>) -> Self {
        let base = TileLayer {
            name: "OpenStreetMap".to_string(),
            url_template: OSM_TILES.to_string(),
            attribution: OSM_ATTRIBUTION,
            enabled: true,
        };

        let overlays = api_key
            .map(|key| {
                Overlay::ALL
                    .iter()
                    .map(|overlay| TileLayer {
                        name: overlay.title().to_string(),
                        url_template: format!(
                            "https://tile.openweathermap.org/map/{}/{{z}}/{{x}}/{{y}}.png?appid={key}",
                            overlay.layer()
                        ),
                        attribution: OWM_ATTRIBUTION,
                        enabled: *overlay == Overlay::Clouds,
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            center: location.unwrap_or(DEFAULT_CENTER),
            zoom: DEFAULT_ZOOM,
            base,
            overlays,
            marker: location.map(|position| Marker { position, label: label.to_string() }),
        }
    }

    /// Enabled layers, base first.
    pub fn visible_layers(&self) -> impl Iterator<Item = &TileLayer> {
        std::iter::once(&self.base).chain(self.overlays.iter().filter(|l| l.enabled))
    }

    pub fn center_tile(&self) -> (u32, u32) {
        tile_index(self.center, self.zoom)
    }
}

/// Web-Mercator tile holding `at` at `zoom`.
pub fn tile_index(at: Coordinates, zoom: u8) -> (u32, u32) {
    let n = f64::from(1u32 << zoom.min(31));
    let max = n - 1.0;

    let x = ((at.longitude + 180.0) / 360.0 * n).floor();
    let lat = at.latitude.clamp(-85.0511, 85.0511).to_radians();
    let y = ((1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * n).floor();

    (x.clamp(0.0, max) as u32, y.clamp(0.0, max) as u32)
}
