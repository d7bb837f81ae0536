//! Fixed lookup tables.
//!
//! Nothing in this module is randomized. These tables are what keeps a
//! synthesized profile coherent: platform strings, core counts, GPU vendors
//! and plugin lists are derived from the chosen values, never drawn
//! independently.

use serde::{Deserialize, Serialize};

// ============================================================================
// Operating system families
// ============================================================================

/// Operating system family a concrete OS name belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OsFamily {
    Windows,
    #[serde(rename = "macOS")]
    MacOs,
    Linux,
    #[serde(rename = "ChromeOS")]
    ChromeOs,
    Android,
    #[serde(rename = "iOS")]
    Ios,
    #[serde(rename = "iPadOS")]
    IpadOs,
}

impl OsFamily {
    /// Classify an OS name such as `"Windows 11"` or `"macOS Sonoma"`.
    pub fn detect(os_name: &str) -> Option<Self> {
        let name = os_name.to_ascii_lowercase();
        if name.contains("windows") {
            Some(Self::Windows)
        } else if name.contains("mac") || name.contains("os x") {
            Some(Self::MacOs)
        } else if name.contains("chrome os") || name.contains("chromeos") {
            Some(Self::ChromeOs)
        } else if name.contains("android") {
            Some(Self::Android)
        } else if name.contains("ipad") {
            Some(Self::IpadOs)
        } else if name.contains("ios") || name.contains("iphone") {
            Some(Self::Ios)
        } else if ["linux", "ubuntu", "debian", "fedora", "arch", "mint"]
            .iter()
            .any(|distro| name.contains(distro))
        {
            Some(Self::Linux)
        } else {
            None
        }
    }

    /// Classify a `navigator.platform` hint such as `"Win32"` or `"MacIntel"`.
    pub fn from_platform_hint(platform: &str) -> Option<Self> {
        let hint = platform.to_ascii_lowercase();
        if hint.starts_with("win") {
            Some(Self::Windows)
        } else if hint.starts_with("mac") {
            Some(Self::MacOs)
        } else if hint == "iphone" {
            Some(Self::Ios)
        } else if hint == "ipad" {
            Some(Self::IpadOs)
        } else if hint.contains("arm") || hint.contains("android") {
            Some(Self::Android)
        } else if hint.starts_with("linux") {
            Some(Self::Linux)
        } else {
            None
        }
    }

    /// `navigator.platform` string.
    pub fn platform(&self) -> &'static str {
        match self {
            OsFamily::Windows => "Win32",
            OsFamily::MacOs => "MacIntel",
            OsFamily::Linux | OsFamily::ChromeOs => "Linux x86_64",
            OsFamily::Android => "Linux armv81",
            OsFamily::Ios => "iPhone",
            OsFamily::IpadOs => "iPad",
        }
    }

    /// `navigator.vendor` string.
    pub fn vendor(&self) -> &'static str {
        match self {
            OsFamily::Ios | OsFamily::IpadOs => "Apple Computer, Inc.",
            _ => "Google Inc.",
        }
    }

    /// Vertical pixels the OS reserves for taskbars, docks and status bars.
    pub fn reserved_chrome_height(&self) -> u32 {
        match self {
            OsFamily::Windows => 40,
            OsFamily::MacOs => 25,
            OsFamily::Linux => 27,
            OsFamily::ChromeOs => 48,
            OsFamily::Android | OsFamily::Ios | OsFamily::IpadOs => 0,
        }
    }

    /// Touch-first mobile OS.
    pub fn is_mobile(&self) -> bool {
        matches!(self, OsFamily::Android | OsFamily::Ios | OsFamily::IpadOs)
    }

    /// OS token inside the parentheses of a user-agent string.
    pub fn ua_os_token(&self) -> &'static str {
        match self {
            OsFamily::Windows => "Windows NT 10.0; Win64; x64",
            OsFamily::MacOs => "Macintosh; Intel Mac OS X 10_15_7",
            OsFamily::Linux => "X11; Linux x86_64",
            OsFamily::ChromeOs => "X11; CrOS x86_64 14541.0.0",
            OsFamily::Android => "Linux; Android 10; K",
            OsFamily::Ios => "iPhone; CPU iPhone OS 17_4 like Mac OS X",
            OsFamily::IpadOs => "iPad; CPU OS 17_4 like Mac OS X",
        }
    }

    /// User-agent template used when the archetype does not carry one.
    pub fn default_user_agent_template(&self) -> String {
        match self {
            OsFamily::Android => format!(
                "Mozilla/5.0 ({}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{{version}} Mobile Safari/537.36",
                self.ua_os_token()
            ),
            OsFamily::Ios | OsFamily::IpadOs => format!(
                "Mozilla/5.0 ({}) AppleWebKit/605.1.15 (KHTML, like Gecko) CriOS/{{version}} Mobile/15E148 Safari/604.1",
                self.ua_os_token()
            ),
            _ => format!(
                "Mozilla/5.0 ({}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{{version}} Safari/537.36",
                self.ua_os_token()
            ),
        }
    }

    /// Font list used when the archetype does not carry one.
    pub fn default_fonts(&self) -> Vec<String> {
        let extra: &[&str] = match self {
            OsFamily::Windows => &[
                "Calibri",
                "Cambria",
                "Consolas",
                "Segoe UI",
                "Tahoma",
                "Microsoft Sans Serif",
            ],
            OsFamily::MacOs | OsFamily::Ios | OsFamily::IpadOs => &[
                "Helvetica",
                "Helvetica Neue",
                "Lucida Grande",
                "Monaco",
                "Menlo",
                "SF Pro",
            ],
            OsFamily::Linux => &[
                "DejaVu Sans",
                "DejaVu Serif",
                "Liberation Sans",
                "Liberation Serif",
                "Ubuntu",
                "Noto Sans",
            ],
            OsFamily::ChromeOs | OsFamily::Android => {
                &["Roboto", "Noto Sans", "Noto Serif", "Droid Sans Mono"]
            }
        };
        BASE_FONTS
            .iter()
            .chain(extra.iter())
            .map(|name| name.to_string())
            .collect()
    }

    /// Hardware used when the archetype leaves a table out.
    pub fn hardware_defaults(&self) -> HardwareDefaults {
        match self {
            OsFamily::Windows | OsFamily::Linux => HardwareDefaults {
                cpu: "Intel Core i5",
                gpu: "Intel(R) UHD Graphics 630",
                ram_gb: 8,
                resolution: (1920, 1080),
            },
            OsFamily::MacOs => HardwareDefaults {
                cpu: "Apple M2",
                gpu: "Apple M2",
                ram_gb: 8,
                resolution: (1470, 956),
            },
            OsFamily::ChromeOs => HardwareDefaults {
                cpu: "Intel Celeron N4500",
                gpu: "Intel(R) UHD Graphics",
                ram_gb: 4,
                resolution: (1366, 768),
            },
            OsFamily::Android => HardwareDefaults {
                cpu: "Qualcomm Snapdragon 8 Gen 2",
                gpu: "Adreno (TM) 740",
                ram_gb: 8,
                resolution: (412, 915),
            },
            OsFamily::Ios => HardwareDefaults {
                cpu: "Apple A17 Pro",
                gpu: "Apple GPU",
                ram_gb: 8,
                resolution: (393, 852),
            },
            OsFamily::IpadOs => HardwareDefaults {
                cpu: "Apple M2",
                gpu: "Apple GPU",
                ram_gb: 8,
                resolution: (820, 1180),
            },
        }
    }

    /// Browser plugins exposed on this family. Mobile Chromium exposes none.
    pub fn plugins(&self) -> Vec<PluginInfo> {
        if self.is_mobile() {
            Vec::new()
        } else {
            default_chrome_plugins()
        }
    }
}

/// Per-family hardware fallbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HardwareDefaults {
    pub cpu: &'static str,
    pub gpu: &'static str,
    pub ram_gb: u32,
    pub resolution: (u32, u32),
}

const BASE_FONTS: &[&str] = &[
    "Arial",
    "Arial Black",
    "Comic Sans MS",
    "Courier New",
    "Georgia",
    "Impact",
    "Times New Roman",
    "Trebuchet MS",
    "Verdana",
];

// ============================================================================
// Form factor
// ============================================================================

/// Physical device class; decides battery presence and audio channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormFactor {
    Desktop,
    Laptop,
    Tablet,
    Phone,
}

impl FormFactor {
    /// Infer from an archetype name when the catalog does not say.
    pub fn infer(archetype_name: &str) -> Self {
        let name = archetype_name.to_ascii_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| name.contains(w));
        if has(&[
            "laptop",
            "notebook",
            "macbook",
            "ultrabook",
            "chromebook",
            "pixelbook",
            "mobile workstation",
        ]) {
            FormFactor::Laptop
        } else if has(&["tablet", "ipad"]) {
            FormFactor::Tablet
        } else if has(&["phone", "iphone", "pixel", "galaxy s"]) {
            FormFactor::Phone
        } else {
            FormFactor::Desktop
        }
    }

    /// Runs on a battery.
    pub fn has_battery(&self) -> bool {
        !matches!(self, FormFactor::Desktop)
    }

    /// Handheld device with stereo-only audio output.
    pub fn is_handheld(&self) -> bool {
        matches!(self, FormFactor::Tablet | FormFactor::Phone)
    }
}

// ============================================================================
// CPU tiers
// ============================================================================

/// Performance tier of a CPU model, each with a plausible logical core set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuTier {
    Entry,
    Core5,
    Core7,
    Enthusiast,
    Ryzen5,
    Ryzen7,
    AppleProMax,
    AppleBase,
    AppleMobile,
    Mobile,
    Budget,
    Mainstream,
}

impl CpuTier {
    /// Classify a CPU model string. First match wins.
    pub fn classify(cpu: &str) -> Self {
        let name = cpu.to_ascii_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| name.contains(w));

        if has(&["i3"]) {
            CpuTier::Entry
        } else if has(&["i5"]) {
            CpuTier::Core5
        } else if has(&["i7"]) {
            CpuTier::Core7
        } else if has(&["i9", "threadripper", "ryzen 9"]) {
            CpuTier::Enthusiast
        } else if has(&["ryzen 5"]) {
            CpuTier::Ryzen5
        } else if has(&["ryzen 7"]) {
            CpuTier::Ryzen7
        } else if has(&["apple m"]) && has(&[" pro", " max"]) {
            CpuTier::AppleProMax
        } else if has(&["apple m"]) {
            CpuTier::AppleBase
        } else if has(&["apple a", "bionic"]) {
            CpuTier::AppleMobile
        } else if has(&["snapdragon", "exynos", "tensor", "dimensity"]) {
            CpuTier::Mobile
        } else if has(&["celeron", "pentium", "athlon"]) {
            CpuTier::Budget
        } else {
            CpuTier::Mainstream
        }
    }

    /// Logical core counts this tier ships with.
    pub fn core_candidates(&self) -> &'static [u32] {
        match self {
            CpuTier::Entry => &[4, 8],
            CpuTier::Core5 => &[6, 8, 12],
            CpuTier::Core7 => &[8, 12, 16],
            CpuTier::Enthusiast => &[16, 20, 24, 32],
            CpuTier::Ryzen5 => &[6, 12],
            CpuTier::Ryzen7 => &[8, 16],
            CpuTier::AppleProMax => &[10, 12],
            CpuTier::AppleBase => &[8],
            CpuTier::AppleMobile => &[6],
            CpuTier::Mobile => &[8],
            CpuTier::Budget => &[2, 4],
            CpuTier::Mainstream => &[4, 8],
        }
    }
}

// ============================================================================
// GPU vendors
// ============================================================================

/// GPU vendor parsed from a model string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GpuVendor {
    #[serde(rename = "NVIDIA")]
    Nvidia,
    #[serde(rename = "AMD")]
    Amd,
    Intel,
    Apple,
    Qualcomm,
    #[serde(rename = "ARM")]
    Arm,
    Unknown,
}

impl GpuVendor {
    /// Vendor of a GPU model string such as `"NVIDIA GeForce RTX 3060"`.
    pub fn parse(model: &str) -> Self {
        let name = model.to_ascii_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| name.contains(w));

        if has(&["nvidia", "geforce", "rtx", "gtx"]) {
            GpuVendor::Nvidia
        } else if has(&["amd", "radeon"]) {
            GpuVendor::Amd
        } else if has(&["intel", "iris", "uhd", "arc"]) {
            GpuVendor::Intel
        } else if has(&["apple"]) {
            GpuVendor::Apple
        } else if has(&["adreno", "qualcomm"]) {
            GpuVendor::Qualcomm
        } else if has(&["mali"]) {
            GpuVendor::Arm
        } else {
            GpuVendor::Unknown
        }
    }

    /// Short vendor label used inside ANGLE renderer strings.
    pub fn label(&self) -> &'static str {
        match self {
            GpuVendor::Nvidia => "NVIDIA",
            GpuVendor::Amd => "AMD",
            GpuVendor::Intel => "Intel",
            GpuVendor::Apple => "Apple",
            GpuVendor::Qualcomm => "Qualcomm",
            GpuVendor::Arm => "ARM",
            GpuVendor::Unknown => "Google",
        }
    }

    /// Vendor string a native (non-ANGLE) GL driver reports.
    pub fn native_vendor(&self) -> &'static str {
        match self {
            GpuVendor::Nvidia => "NVIDIA Corporation",
            GpuVendor::Amd => "AMD",
            GpuVendor::Intel => "Intel Inc.",
            GpuVendor::Apple => "Apple Inc.",
            GpuVendor::Qualcomm => "Qualcomm",
            GpuVendor::Arm => "ARM",
            GpuVendor::Unknown => "Google Inc.",
        }
    }

    /// `(MAX_TEXTURE_SIZE, MAX_VIEWPORT_DIMS)` for this vendor class.
    pub fn limits(&self) -> (u32, [u32; 2]) {
        match self {
            GpuVendor::Nvidia => (16384, [32767, 32767]),
            GpuVendor::Amd | GpuVendor::Intel | GpuVendor::Apple => (16384, [16384, 16384]),
            GpuVendor::Qualcomm | GpuVendor::Arm | GpuVendor::Unknown => (8192, [8192, 8192]),
        }
    }
}

// ============================================================================
// Plugins
// ============================================================================

/// A `navigator.plugins` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginInfo {
    pub name: String,
    pub description: String,
    pub filename: String,
    pub mime_types: Vec<MimeTypeInfo>,
}

impl PluginInfo {
    fn pdf_viewer(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: "Portable Document Format".to_string(),
            filename: "internal-pdf-viewer".to_string(),
            mime_types: vec![MimeTypeInfo::pdf(), MimeTypeInfo::text_pdf()],
        }
    }
}

/// A `navigator.mimeTypes` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MimeTypeInfo {
    #[serde(rename = "type")]
    pub mime_type: String,
    pub description: String,
    pub suffixes: String,
}

impl MimeTypeInfo {
    fn pdf() -> Self {
        Self {
            mime_type: "application/pdf".to_string(),
            description: "Portable Document Format".to_string(),
            suffixes: "pdf".to_string(),
        }
    }

    fn text_pdf() -> Self {
        Self {
            mime_type: "text/pdf".to_string(),
            description: "Portable Document Format".to_string(),
            suffixes: "pdf".to_string(),
        }
    }
}

/// The five PDF viewer entries every desktop Chromium build reports.
fn default_chrome_plugins() -> Vec<PluginInfo> {
    [
        "PDF Viewer",
        "Chrome PDF Viewer",
        "Chromium PDF Viewer",
        "Microsoft Edge PDF Viewer",
        "WebKit built-in PDF",
    ]
    .iter()
    .map(|name| PluginInfo::pdf_viewer(name))
    .collect()
}

// ============================================================================
// Browser versions and timezones
// ============================================================================

/// Chromium versions substituted into `{version}`.
pub const UA_VERSION_POOL: &[&str] = &[
    "120.0.0.0",
    "121.0.0.0",
    "122.0.0.0",
    "123.0.0.0",
    "124.0.0.0",
    "125.0.0.0",
];

/// IANA zone name with its standard offset in minutes east of UTC.
pub type TimezoneEntry = (&'static str, i32);

const UTC: &[TimezoneEntry] = &[("UTC", 0)];

/// Zones plausible for a language tag's region; `UTC` when the region is unknown.
pub fn timezones_for_language(language: &str) -> &'static [TimezoneEntry] {
    let tag = language.to_ascii_lowercase().replace('_', "-");
    let primary = tag.split('-').next().unwrap_or_default();

    match tag.as_str() {
        "en-us" => &[
            ("America/New_York", -300),
            ("America/Chicago", -360),
            ("America/Denver", -420),
            ("America/Los_Angeles", -480),
        ],
        "en-gb" => &[("Europe/London", 0)],
        "en-ca" | "fr-ca" => &[("America/Toronto", -300), ("America/Vancouver", -480)],
        "en-au" => &[("Australia/Sydney", 600), ("Australia/Perth", 480)],
        "en-in" | "hi-in" => &[("Asia/Kolkata", 330)],
        "de-de" => &[("Europe/Berlin", 60)],
        "de-at" => &[("Europe/Vienna", 60)],
        "de-ch" => &[("Europe/Zurich", 60)],
        "fr-fr" => &[("Europe/Paris", 60)],
        "es-es" => &[("Europe/Madrid", 60)],
        "es-mx" => &[("America/Mexico_City", -360)],
        "it-it" => &[("Europe/Rome", 60)],
        "nl-nl" => &[("Europe/Amsterdam", 60)],
        "pl-pl" => &[("Europe/Warsaw", 60)],
        "pt-br" => &[("America/Sao_Paulo", -180)],
        "pt-pt" => &[("Europe/Lisbon", 0)],
        "ru-ru" => &[("Europe/Moscow", 180)],
        "ja-jp" => &[("Asia/Tokyo", 540)],
        "ko-kr" => &[("Asia/Seoul", 540)],
        "zh-cn" => &[("Asia/Shanghai", 480)],
        "zh-tw" => &[("Asia/Taipei", 480)],
        _ => match primary {
            "en" => timezones_for_language("en-US"),
            "de" => timezones_for_language("de-DE"),
            "fr" => timezones_for_language("fr-FR"),
            "es" => timezones_for_language("es-ES"),
            "it" => timezones_for_language("it-IT"),
            "nl" => timezones_for_language("nl-NL"),
            "pl" => timezones_for_language("pl-PL"),
            "pt" => timezones_for_language("pt-BR"),
            "ru" => timezones_for_language("ru-RU"),
            "ja" => timezones_for_language("ja-JP"),
            "ko" => timezones_for_language("ko-KR"),
            "zh" => timezones_for_language("zh-CN"),
            _ => UTC,
        },
    }
}
