//! Synthesized profile data.
//!
//! A [`Profile`] is immutable once built. Regenerating a scope produces a new
//! profile; existing holders of an `Arc<Profile>` keep the old one.

use serde::{Serialize, Serializer};

use crate::profile::tables::{FormFactor, GpuVendor, OsFamily, PluginInfo};
use crate::random::Seed;

/// Complete, internally consistent device identity for one seed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub seed: Seed,
    pub archetype_name: String,
    pub form_factor: FormFactor,
    pub os: OsInfo,
    pub hardware: HardwareInfo,
    pub display: DisplayInfo,
    pub locale: LocaleInfo,
    pub fonts: Vec<String>,
    pub user_agent: String,
    pub navigator_block: NavigatorBlock,
    pub graphics_block: GraphicsBlock,
    pub audio_block: AudioBlock,
    pub power_block: PowerBlock,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OsInfo {
    /// OS name as written in the catalog, e.g. `"Windows 11"`.
    pub name: String,
    pub family: OsFamily,
    pub platform: String,
    pub vendor: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HardwareInfo {
    pub cpu: String,
    pub hardware_concurrency: u32,
    /// Installed RAM in GB.
    pub ram_gb: u32,
    /// `navigator.deviceMemory`: RAM bucketed to a power of two, capped at 8.
    pub device_memory: u32,
    pub gpu: GpuInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GpuInfo {
    pub vendor: GpuVendor,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayInfo {
    /// `"WxH"`.
    pub resolution: String,
    pub width: u32,
    pub height: u32,
    pub avail_width: u32,
    pub avail_height: u32,
    pub color_depth: u32,
    pub pixel_depth: u32,
    pub device_pixel_ratio: f64,
    pub max_touch_points: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocaleInfo {
    pub language: String,
    pub languages: Vec<String>,
    /// IANA zone name.
    pub timezone: String,
    /// Standard offset in minutes east of UTC (e.g. -300 for New York).
    pub timezone_offset: i32,
}

/// Values a host adapter reports through `navigator`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigatorBlock {
    pub user_agent: String,
    pub app_version: String,
    pub app_name: String,
    pub app_code_name: String,
    pub product: String,
    pub product_sub: String,
    pub platform: String,
    pub vendor: String,
    pub vendor_sub: String,
    pub language: String,
    pub languages: Vec<String>,
    pub hardware_concurrency: u32,
    pub device_memory: u32,
    pub max_touch_points: u32,
    /// Always `false`.
    pub webdriver: bool,
    pub cookie_enabled: bool,
    pub on_line: bool,
    pub do_not_track: Option<String>,
    pub pdf_viewer_enabled: bool,
    pub plugins: Vec<PluginInfo>,
}

/// WebGL identity and capability limits.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphicsBlock {
    pub vendor: String,
    pub renderer: String,
    pub unmasked_vendor: String,
    pub unmasked_renderer: String,
    pub version: String,
    pub shading_language_version: String,
    pub max_texture_size: u32,
    pub max_viewport_dims: [u32; 2],
    pub max_vertex_attribs: u32,
    pub max_varying_vectors: u32,
    pub max_vertex_uniform_vectors: u32,
    pub max_fragment_uniform_vectors: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioBlock {
    pub sample_rate: u32,
    pub max_channel_count: u32,
}

/// Battery status. Times are seconds; infinite serializes as `"Infinity"`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerBlock {
    pub has_battery: bool,
    pub charging: bool,
    pub level: f64,
    #[serde(serialize_with = "serialize_seconds")]
    pub charging_time: f64,
    #[serde(serialize_with = "serialize_seconds")]
    pub discharging_time: f64,
}

impl PowerBlock {
    /// Mains-powered machine: no battery, reported as full and charging.
    pub fn mains() -> Self {
        Self {
            has_battery: false,
            charging: true,
            level: 1.0,
            charging_time: 0.0,
            discharging_time: f64::INFINITY,
        }
    }
}

// JSON has no infinity; the Battery API reports it, so spell it out.
fn serialize_seconds<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_infinite() {
        serializer.serialize_str("Infinity")
    } else {
        serializer.serialize_f64(*value)
    }
}
