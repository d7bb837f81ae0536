//! Integration tests for profile synthesis
//!
//! Covers catalog loading from disk, the built-in fallback, determinism and
//! the cross-attribute coherence rules over many seeds.

use std::io::Write;

use ki_fingerprint_engine::{
    config::EngineSettings,
    profile::{synthesize, ArchetypeCatalog, FileCatalog, FormFactor, OsFamily},
    IdentityEngine, Seed,
};

const END_TO_END_SEED: &str = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08";

fn seeds(count: usize) -> impl Iterator<Item = Seed> {
    (0..count).map(|i| Seed::new(format!("coherence-{:04}", i)).unwrap())
}

fn write_catalog(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

// ============================================================================
// End-to-end
// ============================================================================

#[test]
fn test_single_archetype_end_to_end() {
    let catalog = ArchetypeCatalog::from_json_str(
        r#"[{
            "name": "Default Windows PC",
            "weight": 1,
            "os": { "Windows 11": 1 },
            "hardware": { "cpu": { "Intel Core i5": 100 } }
        }]"#,
    )
    .unwrap();

    let seed = Seed::new(END_TO_END_SEED).unwrap();
    assert!(seed.is_high_entropy());

    let profile = synthesize(&seed, &catalog);

    assert_eq!(profile.archetype_name, "Default Windows PC");
    assert_eq!(profile.hardware.cpu, "Intel Core i5");
    assert!([6, 8, 12].contains(&profile.hardware.hardware_concurrency));
    assert_eq!(profile.os.platform, "Win32");
    assert_eq!(profile.navigator_block.platform, "Win32");
    assert_eq!(profile.os.vendor, "Google Inc.");
}

#[test]
fn test_same_seed_same_profile_across_engines() {
    let seed = Seed::new(END_TO_END_SEED).unwrap();
    let a = IdentityEngine::default().pin_seed("x", seed.clone());
    let b = IdentityEngine::new(&EngineSettings::default()).pin_seed("y", seed);
    assert_eq!(*a, *b);
    assert_eq!(
        serde_json::to_string(&*a).unwrap(),
        serde_json::to_string(&*b).unwrap()
    );
}

#[test]
fn test_bundled_profiles_are_stable() {
    let catalog = ArchetypeCatalog::bundled().unwrap();

    let desktop = synthesize(&Seed::new(END_TO_END_SEED).unwrap(), &catalog);
    assert_eq!(desktop.archetype_name, "Office Desktop");
    assert_eq!(desktop.os.name, "Windows 10");
    assert_eq!(desktop.hardware.cpu, "Intel Core i3-12100");
    assert_eq!(desktop.hardware.hardware_concurrency, 4);
    assert_eq!(desktop.hardware.ram_gb, 16);
    assert_eq!(desktop.hardware.gpu.model, "Intel(R) UHD Graphics 630");
    assert_eq!(desktop.display.resolution, "1920x1080");
    assert_eq!(desktop.locale.timezone, "America/New_York");
    assert_eq!(desktop.locale.timezone_offset, -300);
    assert_eq!(desktop.power_block.level, 1.0);

    let laptop = synthesize(&Seed::new("golden-12").unwrap(), &catalog);
    assert_eq!(laptop.archetype_name, "Gaming Laptop");
    assert_eq!(laptop.hardware.cpu, "Intel Core i7-12700H");
    assert_eq!(laptop.hardware.hardware_concurrency, 8);
    assert_eq!(laptop.hardware.gpu.model, "NVIDIA GeForce RTX 3060 Laptop GPU");
    assert_eq!(laptop.display.resolution, "2560x1440");
    assert_eq!(laptop.locale.timezone, "America/New_York");
    assert!(laptop.power_block.charging);
    assert_eq!(laptop.power_block.level, 0.59);
    assert_eq!(laptop.power_block.charging_time, 976.0);
}

// ============================================================================
// Catalog loading
// ============================================================================

#[test]
fn test_toml_catalog_from_file() {
    let file = write_catalog(
        ".toml",
        r#"
[[archetypes]]
name = "Studio Mac"
weight = 1.0
platform = "MacIntel"
userAgentTemplate = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{version} Safari/537.36"

[archetypes.os]
"macOS 14" = 1.0

[archetypes.hardware.cpu]
"Apple M2 Max" = 1.0

[archetypes.hardware.ram]
"32" = 1.0

[archetypes.hardware.gpu]
"Apple M2 Max" = 1.0

[archetypes.display]
resolutions = ["3456x2234"]
colorDepth = 30
"#,
    );

    let settings = EngineSettings::default().with_catalog_path(file.path());
    let engine = IdentityEngine::new(&settings);
    assert!(!engine.catalog().is_fallback());

    let profile = engine.get_profile("mac");
    assert_eq!(profile.archetype_name, "Studio Mac");
    assert_eq!(profile.os.family, OsFamily::MacOs);
    assert_eq!(profile.os.platform, "MacIntel");
    assert_eq!(profile.os.vendor, "Google Inc.");
    assert_eq!(profile.form_factor, FormFactor::Desktop);
    assert!([10, 12].contains(&profile.hardware.hardware_concurrency));
    assert_eq!(profile.hardware.device_memory, 8);
    assert_eq!(profile.display.width, 3456);
    assert_eq!(profile.display.color_depth, 30);
    assert_eq!(profile.display.pixel_depth, 30);
    assert!(profile.user_agent.contains("Macintosh"));
    assert!(!profile.user_agent.contains("{version}"));
}

#[test]
fn test_unreadable_catalog_falls_back() {
    let file = write_catalog(".json", "{ this is not json");
    let engine = IdentityEngine::from_loader(
        &FileCatalog::new(file.path()),
        &EngineSettings::default(),
    );

    assert!(engine.catalog().is_fallback());
    let profile = engine.get_profile("fallback");
    assert_eq!(profile.archetype_name, "Default Windows PC");
    assert_eq!(profile.os.name, "Windows 11");
    assert_eq!(profile.hardware.cpu, "Intel Core i5");
    assert_eq!(profile.hardware.ram_gb, 8);
    assert_eq!(profile.hardware.gpu.model, "Intel(R) UHD Graphics 630");
    assert_eq!(profile.display.resolution, "1920x1080");
    assert_eq!(profile.locale.languages, vec!["en-US", "en"]);
    assert_eq!(profile.display.color_depth, 24);
    assert_eq!(profile.display.max_touch_points, 0);
}

#[test]
fn test_bundled_catalog_loads() {
    let catalog = ArchetypeCatalog::bundled().unwrap();
    assert!(catalog.len() > 1);
    assert!(catalog.weights().iter().all(|w| *w >= 0.0));
}

// ============================================================================
// Coherence over many seeds
// ============================================================================

#[test]
fn test_windows_profiles_report_win32() {
    let catalog = ArchetypeCatalog::bundled().unwrap();
    for seed in seeds(400) {
        let profile = synthesize(&seed, &catalog);
        if profile.os.name.contains("Windows") {
            assert_eq!(profile.os.platform, "Win32", "seed {}", seed);
            assert_eq!(profile.navigator_block.platform, "Win32");
            assert!(profile.user_agent.contains("Windows NT"), "{}", profile.user_agent);
            assert!(profile.graphics_block.unmasked_renderer.contains("Direct3D11"));
        }
    }
}

#[test]
fn test_desktops_are_mains_powered() {
    let catalog = ArchetypeCatalog::bundled().unwrap();
    let mut desktops = 0;
    for seed in seeds(400) {
        let profile = synthesize(&seed, &catalog);
        let power = &profile.power_block;
        if profile.form_factor == FormFactor::Desktop {
            desktops += 1;
            assert!(!power.has_battery);
            assert!(power.charging);
            assert_eq!(power.level, 1.0);
            assert!(power.discharging_time.is_infinite());
        } else {
            assert!(power.has_battery, "{} has no battery", profile.archetype_name);
            assert!((0.05..=1.0).contains(&power.level));
            assert!(power.charging || power.charging_time.is_infinite());
            assert!(!power.charging || power.discharging_time.is_infinite());
        }
    }
    assert!(desktops > 0);
}

#[test]
fn test_navigator_echoes_profile() {
    let catalog = ArchetypeCatalog::bundled().unwrap();
    for seed in seeds(200) {
        let profile = synthesize(&seed, &catalog);
        let nav = &profile.navigator_block;
        assert_eq!(nav.user_agent, profile.user_agent);
        assert_eq!(nav.platform, profile.os.platform);
        assert_eq!(nav.vendor, profile.os.vendor);
        assert_eq!(nav.language, profile.locale.language);
        assert_eq!(nav.languages, profile.locale.languages);
        assert_eq!(nav.hardware_concurrency, profile.hardware.hardware_concurrency);
        assert_eq!(nav.device_memory, profile.hardware.device_memory);
        assert_eq!(nav.max_touch_points, profile.display.max_touch_points);
        assert!(!nav.webdriver);
        assert!(nav.device_memory.is_power_of_two() && nav.device_memory <= 8);
        assert!(profile.display.avail_height <= profile.display.height);
    }
}

#[test]
fn test_mobile_profiles_are_handheld() {
    let catalog = ArchetypeCatalog::bundled().unwrap();
    let mut phones = 0;
    for seed in seeds(400) {
        let profile = synthesize(&seed, &catalog);
        if profile.os.family == OsFamily::Android {
            phones += 1;
            assert_eq!(profile.audio_block.max_channel_count, 2);
            assert!(profile.display.max_touch_points > 0);
            assert!(profile.navigator_block.plugins.is_empty());
        }
    }
    assert!(phones > 0);
}

#[test]
fn test_bundled_chips_match_their_gpu() {
    let catalog = ArchetypeCatalog::bundled().unwrap();
    let (mut apple, mut android) = (0, 0);
    for seed in seeds(2000) {
        let hardware = synthesize(&seed, &catalog).hardware;
        let (cpu, gpu) = (hardware.cpu.as_str(), hardware.gpu.model.as_str());
        if cpu.starts_with("Apple") {
            apple += 1;
            assert_eq!(cpu, gpu, "seed {}", seed);
        }
        if cpu.contains("Tensor") {
            android += 1;
            assert!(gpu.starts_with("Mali"), "{} / {}", cpu, gpu);
        }
        if cpu.contains("Snapdragon") {
            android += 1;
            assert!(gpu.starts_with("Adreno"), "{} / {}", cpu, gpu);
        }
    }
    assert!(apple > 0 && android > 0);
}

#[test]
fn test_distinct_seeds_give_distinct_identities() {
    let catalog = ArchetypeCatalog::bundled().unwrap();
    let profiles: Vec<_> = seeds(50).map(|seed| synthesize(&seed, &catalog)).collect();
    let first = &profiles[0];
    assert!(profiles.iter().skip(1).any(|p| {
        p.archetype_name != first.archetype_name
            || p.hardware != first.hardware
            || p.display != first.display
    }));
}
