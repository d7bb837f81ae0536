//! Coherent profile synthesis.
//!
//! Every attribute is taken from a fixed draw index of the seed's random field,
//! then run through the lookup tables so dependent values can never contradict
//! the values they depend on. Synthesis cannot fail: anything the catalog
//! leaves out is filled from built-in defaults.

use tracing::{debug, warn};

use crate::profile::catalog::{Archetype, ArchetypeCatalog, WeightTable};
use crate::profile::tables::{
    timezones_for_language, CpuTier, FormFactor, GpuVendor, OsFamily, UA_VERSION_POOL,
};
use crate::profile::types::{
    AudioBlock, DisplayInfo, GpuInfo, GraphicsBlock, HardwareInfo, LocaleInfo, NavigatorBlock,
    OsInfo, PowerBlock, Profile,
};
use crate::random::{indices, Seed, SeededRandomField};

const DEFAULT_OS: &str = "Windows 11";
const DEFAULT_LANGUAGES: &[&str] = &["en-US", "en"];
const DEFAULT_COLOR_DEPTH: u32 = 24;
const DEFAULT_TOUCH_POINTS: u32 = 5;

const SAMPLE_RATES: &[u32] = &[44_100, 48_000];
const CHANNEL_COUNTS: &[u32] = &[2, 6, 8];
const HANDHELD_CHANNELS: u32 = 2;

const BATTERY_LEVEL_MEAN: f64 = 0.72;
const BATTERY_LEVEL_STD_DEV: f64 = 0.18;
const CHARGING_SECONDS: (i64, i64) = (600, 7_200);
const DISCHARGING_SECONDS: (i64, i64) = (3_600, 28_800);
const DO_NOT_TRACK_PROBABILITY: f64 = 0.15;

/// Builds [`Profile`]s from a seed against one catalog.
#[derive(Debug, Clone, Copy)]
pub struct CoherentProfileSynthesizer<'c> {
    catalog: &'c ArchetypeCatalog,
}

impl<'c> CoherentProfileSynthesizer<'c> {
    pub fn new(catalog: &'c ArchetypeCatalog) -> Self {
        Self { catalog }
    }

    /// Derive the full profile for `seed`. Same seed and catalog, same profile.
    pub fn synthesize(&self, seed: &Seed) -> Profile {
        let field = SeededRandomField::new(seed);
        let archetype = self.choose_archetype(&field);
        let form_factor = archetype.form_factor();

        // OS and everything keyed off its family
        let os_name = choose_key(&field, indices::OS, &archetype.os, "os")
            .unwrap_or_else(|| DEFAULT_OS.to_string());
        let family = OsFamily::detect(&os_name)
            .or_else(|| {
                archetype
                    .platform
                    .as_deref()
                    .and_then(OsFamily::from_platform_hint)
            })
            .unwrap_or(OsFamily::Windows);
        let os = OsInfo {
            name: os_name,
            family,
            platform: family.platform().to_string(),
            vendor: family.vendor().to_string(),
        };

        let hardware = synthesize_hardware(&field, archetype, family);
        let display = synthesize_display(&field, archetype, family, form_factor);
        let locale = synthesize_locale(&field, archetype);

        let fonts = if archetype.fonts.is_empty() {
            family.default_fonts()
        } else {
            archetype.fonts.clone()
        };

        let user_agent = synthesize_user_agent(&field, archetype, family);
        let navigator_block =
            synthesize_navigator(&field, &os, &hardware, &display, &locale, &user_agent);
        let graphics_block = synthesize_graphics(family, &hardware.gpu);
        let audio_block = synthesize_audio(&field, form_factor);
        let power_block = synthesize_power(&field, form_factor);

        debug!(
            archetype = %archetype.name,
            os = %os.name,
            cpu = %hardware.cpu,
            gpu = %hardware.gpu.model,
            "synthesized profile"
        );

        Profile {
            seed: seed.clone(),
            archetype_name: archetype.name.clone(),
            form_factor,
            os,
            hardware,
            display,
            locale,
            fonts,
            user_agent,
            navigator_block,
            graphics_block,
            audio_block,
            power_block,
        }
    }

    fn choose_archetype(&self, field: &SeededRandomField<'_>) -> &'c Archetype {
        let archetypes = self.catalog.archetypes();
        match field.weighted_choice(indices::ARCHETYPE, archetypes, &self.catalog.weights()) {
            Ok(archetype) => archetype,
            Err(e) => {
                warn!("Archetype choice failed, using built-in archetype: {}", e);
                Archetype::fallback()
            }
        }
    }
}

/// Shorthand for [`CoherentProfileSynthesizer::synthesize`].
pub fn synthesize(seed: &Seed, catalog: &ArchetypeCatalog) -> Profile {
    CoherentProfileSynthesizer::new(catalog).synthesize(seed)
}

/// Weighted pick over a table's keys; `None` for empty or unusable tables.
fn choose_key(
    field: &SeededRandomField<'_>,
    index: u64,
    table: &WeightTable,
    what: &str,
) -> Option<String> {
    if table.is_empty() {
        return None;
    }
    let keys: Vec<&String> = table.keys().collect();
    let weights: Vec<f64> = table.values().copied().collect();
    match field.weighted_choice(index, &keys, &weights) {
        Ok(key) => Some((*key).clone()),
        Err(e) => {
            warn!("Unusable {} table, using default: {}", what, e);
            None
        }
    }
}

/// Uniform pick from a fixed list.
fn choose_from<T: Copy>(field: &SeededRandomField<'_>, index: u64, items: &[T]) -> T {
    items[field.bounded_usize(index, items.len())]
}

fn synthesize_hardware(
    field: &SeededRandomField<'_>,
    archetype: &Archetype,
    family: OsFamily,
) -> HardwareInfo {
    let defaults = family.hardware_defaults();
    let cpu = choose_key(field, indices::CPU, &archetype.hardware.cpu, "cpu")
        .unwrap_or_else(|| defaults.cpu.to_string());
    let hardware_concurrency = choose_from(
        field,
        indices::CORE_COUNT,
        CpuTier::classify(&cpu).core_candidates(),
    );

    let ram_gb = choose_ram(field, &archetype.hardware.ram).unwrap_or(defaults.ram_gb);

    let gpu_model = choose_key(field, indices::GPU, &archetype.hardware.gpu, "gpu")
        .unwrap_or_else(|| defaults.gpu.to_string());
    let gpu = GpuInfo {
        vendor: GpuVendor::parse(&gpu_model),
        model: gpu_model,
    };

    HardwareInfo {
        cpu,
        hardware_concurrency,
        ram_gb,
        device_memory: device_memory_bucket(ram_gb),
        gpu,
    }
}

fn choose_ram(field: &SeededRandomField<'_>, table: &WeightTable) -> Option<u32> {
    let (sizes, weights): (Vec<u32>, Vec<f64>) = table
        .iter()
        .filter_map(|(key, weight)| match key.trim().parse::<u32>() {
            Ok(gb) => Some((gb, *weight)),
            Err(_) => {
                warn!("Ignoring non-numeric RAM entry '{}'", key);
                None
            }
        })
        .unzip();
    if sizes.is_empty() {
        return None;
    }
    match field.weighted_choice(indices::RAM, &sizes, &weights) {
        Ok(gb) => Some(*gb),
        Err(e) => {
            warn!("Unusable ram table, using default: {}", e);
            None
        }
    }
}

/// Largest power of two not above `min(ram, 8)`, at least 1.
pub fn device_memory_bucket(ram_gb: u32) -> u32 {
    let capped = ram_gb.clamp(1, 8);
    1 << (31 - capped.leading_zeros())
}

/// Parse `"WxH"` (also accepts `×` and surrounding whitespace).
pub fn parse_resolution(text: &str) -> Option<(u32, u32)> {
    let normalized = text.replace('×', "x").to_ascii_lowercase();
    let (w, h) = normalized.split_once('x')?;
    let width = w.trim().parse::<u32>().ok()?;
    let height = h.trim().parse::<u32>().ok()?;
    (width > 0 && height > 0).then_some((width, height))
}

fn synthesize_display(
    field: &SeededRandomField<'_>,
    archetype: &Archetype,
    family: OsFamily,
    form_factor: FormFactor,
) -> DisplayInfo {
    let table = &archetype.display;
    let fallback = family.hardware_defaults().resolution;
    let (width, height) = if table.resolutions.is_empty() {
        fallback
    } else {
        let position = field.bounded_usize(indices::RESOLUTION, table.resolutions.len());
        let choice = &table.resolutions[position];
        parse_resolution(choice).unwrap_or_else(|| {
            warn!("Unparseable resolution '{}', using default", choice);
            fallback
        })
    };

    let device_pixel_ratio = if (width >= 2560 && height >= 1600) || family.is_mobile() {
        2.0
    } else {
        1.0
    };

    let max_touch_points = table.max_touch_points.unwrap_or(
        if family.is_mobile() || form_factor.is_handheld() {
            DEFAULT_TOUCH_POINTS
        } else {
            0
        },
    );

    let color_depth = table.color_depth.unwrap_or(DEFAULT_COLOR_DEPTH);

    DisplayInfo {
        resolution: format!("{}x{}", width, height),
        width,
        height,
        avail_width: width,
        avail_height: height.saturating_sub(family.reserved_chrome_height()),
        color_depth,
        pixel_depth: table.pixel_depth.unwrap_or(color_depth),
        device_pixel_ratio,
        max_touch_points,
    }
}

fn synthesize_locale(field: &SeededRandomField<'_>, archetype: &Archetype) -> LocaleInfo {
    let languages: Vec<String> = if archetype.locale.languages.is_empty() {
        DEFAULT_LANGUAGES.iter().map(|l| l.to_string()).collect()
    } else {
        archetype.locale.languages.clone()
    };
    let language = languages[0].clone();
    let (timezone, timezone_offset) =
        choose_from(field, indices::TIMEZONE, timezones_for_language(&language));

    LocaleInfo {
        language,
        languages,
        timezone: timezone.to_string(),
        timezone_offset,
    }
}

fn synthesize_user_agent(
    field: &SeededRandomField<'_>,
    archetype: &Archetype,
    family: OsFamily,
) -> String {
    let version = choose_from(field, indices::UA_VERSION, UA_VERSION_POOL);
    let template = match &archetype.user_agent_template {
        Some(template) if !template.trim().is_empty() => template.clone(),
        _ => family.default_user_agent_template(),
    };
    template.replace("{version}", version)
}

/// `navigator.appVersion`: the user agent without its `Mozilla/` prefix.
fn app_version(user_agent: &str) -> String {
    match user_agent.find("Mozilla/") {
        Some(pos) => user_agent[pos + "Mozilla/".len()..].to_string(),
        None => user_agent.to_string(),
    }
}

fn synthesize_navigator(
    field: &SeededRandomField<'_>,
    os: &OsInfo,
    hardware: &HardwareInfo,
    display: &DisplayInfo,
    locale: &LocaleInfo,
    user_agent: &str,
) -> NavigatorBlock {
    let plugins = os.family.plugins();
    let do_not_track =
        (field.draw(indices::DO_NOT_TRACK) < DO_NOT_TRACK_PROBABILITY).then(|| "1".to_string());

    NavigatorBlock {
        user_agent: user_agent.to_string(),
        app_version: app_version(user_agent),
        app_name: "Netscape".to_string(),
        app_code_name: "Mozilla".to_string(),
        product: "Gecko".to_string(),
        product_sub: "20030107".to_string(),
        platform: os.platform.clone(),
        vendor: os.vendor.clone(),
        vendor_sub: String::new(),
        language: locale.language.clone(),
        languages: locale.languages.clone(),
        hardware_concurrency: hardware.hardware_concurrency,
        device_memory: hardware.device_memory,
        max_touch_points: display.max_touch_points,
        webdriver: false,
        cookie_enabled: true,
        on_line: true,
        do_not_track,
        pdf_viewer_enabled: !plugins.is_empty(),
        plugins,
    }
}

fn synthesize_graphics(family: OsFamily, gpu: &GpuInfo) -> GraphicsBlock {
    let label = gpu.vendor.label();
    let (unmasked_vendor, unmasked_renderer) = match family {
        OsFamily::Windows => (
            format!("Google Inc. ({})", label),
            format!("ANGLE ({}, {} Direct3D11 vs_5_0 ps_5_0, D3D11)", label, gpu.model),
        ),
        OsFamily::MacOs => (
            format!("Google Inc. ({})", label),
            format!(
                "ANGLE ({}, ANGLE Metal Renderer: {}, Unspecified Version)",
                label, gpu.model
            ),
        ),
        OsFamily::Linux | OsFamily::ChromeOs => (
            format!("Google Inc. ({})", label),
            format!("ANGLE ({}, {}, OpenGL 4.6)", label, gpu.model),
        ),
        OsFamily::Android | OsFamily::Ios | OsFamily::IpadOs => {
            (gpu.vendor.native_vendor().to_string(), gpu.model.clone())
        }
    };
    let (max_texture_size, max_viewport_dims) = gpu.vendor.limits();

    GraphicsBlock {
        vendor: "WebKit".to_string(),
        renderer: "WebKit WebGL".to_string(),
        unmasked_vendor,
        unmasked_renderer,
        version: "WebGL 1.0 (OpenGL ES 2.0 Chromium)".to_string(),
        shading_language_version: "WebGL GLSL ES 1.0 (OpenGL ES GLSL ES 1.0 Chromium)"
            .to_string(),
        max_texture_size,
        max_viewport_dims,
        max_vertex_attribs: 16,
        max_varying_vectors: if family.is_mobile() { 15 } else { 30 },
        max_vertex_uniform_vectors: if family.is_mobile() { 256 } else { 4096 },
        max_fragment_uniform_vectors: if family.is_mobile() { 224 } else { 1024 },
    }
}

fn synthesize_audio(field: &SeededRandomField<'_>, form_factor: FormFactor) -> AudioBlock {
    let sample_rate = choose_from(field, indices::AUDIO_SAMPLE_RATE, SAMPLE_RATES);
    let channels = choose_from(field, indices::AUDIO_CHANNELS, CHANNEL_COUNTS);
    AudioBlock {
        sample_rate,
        max_channel_count: if form_factor.is_handheld() {
            HANDHELD_CHANNELS
        } else {
            channels
        },
    }
}

fn synthesize_power(field: &SeededRandomField<'_>, form_factor: FormFactor) -> PowerBlock {
    if !form_factor.has_battery() {
        return PowerBlock::mains();
    }

    let charging = field.draw(indices::BATTERY_CHARGING) < 0.5;
    let raw_level = field.gaussian(
        indices::BATTERY_LEVEL,
        BATTERY_LEVEL_MEAN,
        BATTERY_LEVEL_STD_DEV,
    );
    let level = (raw_level.clamp(0.05, 1.0) * 100.0).round() / 100.0;

    let charging_time = if charging && level < 1.0 {
        seconds_between(field, indices::BATTERY_CHARGING_TIME, CHARGING_SECONDS)
    } else if charging {
        0.0
    } else {
        f64::INFINITY
    };
    let discharging_time = if charging {
        f64::INFINITY
    } else {
        seconds_between(field, indices::BATTERY_DISCHARGING_TIME, DISCHARGING_SECONDS)
    };

    PowerBlock {
        has_battery: true,
        charging,
        level,
        charging_time,
        discharging_time,
    }
}

fn seconds_between(field: &SeededRandomField<'_>, index: u64, (min, max): (i64, i64)) -> f64 {
    // Constant ranges, min < max.
    field.bounded_int(index, min, max).unwrap_or(min) as f64
}
