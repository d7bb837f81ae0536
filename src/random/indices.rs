//! Permanent draw indices.
//!
//! Each logical random decision owns exactly one index. The table is
//! append-only: a new attribute gets the next free number and existing numbers
//! are never reassigned, so adding features never changes the output for a
//! seed that already exists.

/// Archetype selection.
pub const ARCHETYPE: u64 = 0;
/// Operating system within the archetype.
pub const OS: u64 = 1;
/// CPU model.
pub const CPU: u64 = 2;
/// Installed RAM.
pub const RAM: u64 = 3;
/// GPU model.
pub const GPU: u64 = 4;
/// Display resolution.
pub const RESOLUTION: u64 = 5;
/// Browser version substituted into the user-agent template.
pub const UA_VERSION: u64 = 6;
/// Audio context sample rate.
pub const AUDIO_SAMPLE_RATE: u64 = 7;
/// Audio destination max channel count.
pub const AUDIO_CHANNELS: u64 = 8;
/// Battery charging flag.
pub const BATTERY_CHARGING: u64 = 9;
/// Battery level. Gaussian, so it reads field positions 20 and 21.
pub const BATTERY_LEVEL: u64 = 10;
/// Seconds until full.
pub const BATTERY_CHARGING_TIME: u64 = 11;
/// Seconds until empty.
pub const BATTERY_DISCHARGING_TIME: u64 = 12;
/// Logical core count inside the CPU tier's candidate set.
pub const CORE_COUNT: u64 = 13;
/// Timezone inside the locale's region.
pub const TIMEZONE: u64 = 14;
/// Do-Not-Track preference.
pub const DO_NOT_TRACK: u64 = 15;
