//! Liquid glass preference and device capability detection.
//!
//! The animation core only reads two booleans from here: whether the
//! refraction effect is on, and whether to run on the low-power frame budget.
//! Storage and device probing sit behind traits so the browser specifics stay
//! in the web crate.

use thiserror::Error;

pub const GLASS_PREF_KEY: &str = "liquid-glass-enabled";

const MOBILE_MAX_WIDTH: f32 = 768.0;
const MOBILE_UA_KEYWORDS: [&str; 8] = [
    "android",
    "webos",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "windows phone",
    "mobile",
];
const LOW_MEMORY_GB: f64 = 4.0;
const LOW_CORE_COUNT: u32 = 4;

#[derive(Debug, Error, PartialEq)]
pub enum SettingsError {
    #[error("preference `{key}` is not a boolean: {value:?}")]
    NotBoolean { key: String, value: String },
    #[error("preference storage unavailable: {0}")]
    Storage(String),
}

/// Key/value persistence, e.g. `localStorage`.
pub trait PreferenceStore {
    fn load(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn save(&mut self, key: &str, value: &str) -> anyhow::Result<()>;
}

/// Pluggable device classification. Thresholds are heuristics, not contracts.
pub trait CapabilityProbe {
    fn is_mobile(&self) -> bool;
    fn is_low_power(&self) -> bool {
        self.is_mobile()
    }
}

/// Raw signals a browser exposes about the device.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DeviceHints {
    pub has_touch: bool,
    pub viewport_width: f32,
    pub user_agent: String,
    pub device_memory_gb: Option<f64>,
    pub hardware_concurrency: Option<u32>,
    pub save_data: bool,
}

/// Touch AND (small screen OR mobile user agent) counts as mobile.
#[derive(Clone, Debug, Default)]
pub struct HeuristicProbe {
    pub hints: DeviceHints,
}

impl HeuristicProbe {
    pub fn new(hints: DeviceHints) -> Self {
        Self { hints }
    }
}

impl CapabilityProbe for HeuristicProbe {
    fn is_mobile(&self) -> bool {
        let h = &self.hints;
        if !h.has_touch {
            return false;
        }
        let small = h.viewport_width > 0.0 && h.viewport_width <= MOBILE_MAX_WIDTH;
        let ua = h.user_agent.to_lowercase();
        small || MOBILE_UA_KEYWORDS.iter().any(|k| ua.contains(k))
    }

    fn is_low_power(&self) -> bool {
        let h = &self.hints;
        self.is_mobile()
            || h.save_data
            || h.device_memory_gb.is_some_and(|gb| gb <= LOW_MEMORY_GB)
            || h.hardware_concurrency.is_some_and(|n| n <= LOW_CORE_COUNT)
    }
}

/// Parse a persisted JSON boolean.
pub fn parse_bool(key: &str, raw: &str) -> Result<bool, SettingsError> {
    match raw.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(SettingsError::NotBoolean {
            key: key.to_owned(),
            value: other.to_owned(),
        }),
    }
}

/// The "liquid glass enabled" flag plus the frame budget hint.
pub struct GlassSettings<S: PreferenceStore> {
    store: S,
    enabled: bool,
    low_power: bool,
}

impl<S: PreferenceStore> GlassSettings<S> {
    /// Read once at start-up: off on mobile, otherwise the stored preference
    /// (default on). Storage or parse failures fall back to on.
    pub fn load<P: CapabilityProbe + ?Sized>(store: S, probe: &P) -> Self {
        let low_power = probe.is_low_power();
        let enabled = if probe.is_mobile() {
            false
        } else {
            match store.load(GLASS_PREF_KEY) {
                Ok(Some(raw)) => parse_bool(GLASS_PREF_KEY, &raw).unwrap_or_else(|e| {
                    log::warn!("[settings] {e}");
                    true
                }),
                Ok(None) => true,
                Err(e) => {
                    log::debug!("[settings] {}", SettingsError::Storage(e.to_string()));
                    true
                }
            }
        };
        log::info!("[settings] liquid glass {}", if enabled { "on" } else { "off" });
        Self {
            store,
            enabled,
            low_power,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn low_power(&self) -> bool {
        self.low_power
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        let raw = if enabled { "true" } else { "false" };
        if let Err(e) = self.store.save(GLASS_PREF_KEY, raw) {
            log::debug!("[settings] save ignored: {e}");
        }
    }

    pub fn toggle(&mut self) -> bool {
        self.set_enabled(!self.enabled);
        self.enabled
    }

    pub fn enable(&mut self) {
        self.set_enabled(true);
    }

    pub fn disable(&mut self) {
        self.set_enabled(false);
    }
}

/// In-memory store; optionally failing, to exercise fallbacks.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub values: fnv::FnvHashMap<String, String>,
    pub fail: bool,
}

impl PreferenceStore for MemoryStore {
    fn load(&self, key: &str) -> anyhow::Result<Option<String>> {
        if self.fail {
            anyhow::bail!("storage disabled");
        }
        Ok(self.values.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("storage disabled");
        }
        self.values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bool_rejects_garbage() {
        assert_eq!(parse_bool("k", "true"), Ok(true));
        assert_eq!(parse_bool("k", " false "), Ok(false));
        assert!(matches!(
            parse_bool("k", "yes"),
            Err(SettingsError::NotBoolean { .. })
        ));
    }

    #[test]
    fn touch_alone_is_not_mobile() {
        let probe = HeuristicProbe::new(DeviceHints {
            has_touch: true,
            viewport_width: 1440.0,
            user_agent: "Mozilla/5.0 (X11; Linux x86_64)".into(),
            ..DeviceHints::default()
        });
        assert!(!probe.is_mobile());
    }
}
