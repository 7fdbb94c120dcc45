//! Probes for hosts without a browser: servers, CLIs, CI runners.
//!
//! Audio, canvas and DRM need a rendering stack and report `unsupported`.
//! Device and locale facts come from the operating system.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ProbeError;
use crate::source::{run_blocking, SignalSource};
use crate::types::{DeviceInfo, LocaleInfo, Probed};

/// A capability this host does not have.
#[derive(Debug, Clone, Copy)]
pub struct Unsupported {
    name: &'static str,
}

impl Unsupported {
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }

    pub const fn audio() -> Self {
        Self::new("audio")
    }

    pub const fn canvas() -> Self {
        Self::new("canvas")
    }

    pub const fn drm() -> Self {
        Self::new("drm")
    }
}

#[async_trait]
impl SignalSource for Unsupported {
    type Output = String;

    fn name(&self) -> &'static str {
        self.name
    }

    async fn probe(&self) -> Result<String, ProbeError> {
        Err(ProbeError::Unsupported)
    }
}

/// User agent string for non-browser hosts.
pub fn host_user_agent() -> String {
    format!(
        "devfp/{} ({}; {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

/// Parse `MemTotal` out of `/proc/meminfo` text, in bytes.
pub fn parse_meminfo_total(text: &str) -> Option<u64> {
    text.lines().find_map(|line| {
        let (key, rest) = line.split_once(':')?;
        if key.trim() != "MemTotal" {
            return None;
        }
        let mut parts = rest.split_whitespace();
        let amount: u64 = parts.next()?.parse().ok()?;
        let scale = match parts.next().map(|u| u.to_ascii_lowercase()) {
            Some(unit) if unit == "kb" => 1024,
            Some(unit) if unit == "mb" => 1024 * 1024,
            Some(unit) if unit == "gb" => 1024 * 1024 * 1024,
            None => 1,
            Some(_) => return None,
        };
        amount.checked_mul(scale)
    })
}

/// Round a byte count the way browsers round `navigator.deviceMemory`:
/// GiB, down to a power of two, clamped to `0.25..=8`.
pub fn device_memory_bucket(bytes: u64) -> f64 {
    let gib = bytes as f64 / (1u64 << 30) as f64;
    let mut bucket = 8.0;
    while bucket > 0.25 && bucket > gib {
        bucket /= 2.0;
    }
    bucket
}

/// Device facts from the operating system.
#[derive(Debug, Clone)]
pub struct SystemDeviceInfo {
    meminfo_path: PathBuf,
    screen_res: Option<String>,
}

impl SystemDeviceInfo {
    pub fn new() -> Self {
        Self {
            meminfo_path: PathBuf::from("/proc/meminfo"),
            screen_res: None,
        }
    }

    /// Read memory from a different meminfo-formatted file.
    pub fn with_meminfo_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.meminfo_path = path.into();
        self
    }

    /// Report a known display resolution, e.g. `"1920x1080"`.
    pub fn with_screen_res(mut self, res: impl Into<String>) -> Self {
        self.screen_res = Some(res.into());
        self
    }

    fn device_memory(&self) -> Probed<f64> {
        fs::read_to_string(&self.meminfo_path)
            .ok()
            .and_then(|text| parse_meminfo_total(&text))
            .map(device_memory_bucket)
            .into()
    }
}

impl Default for SystemDeviceInfo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SignalSource for SystemDeviceInfo {
    type Output = DeviceInfo;

    fn name(&self) -> &'static str {
        "device_info"
    }

    async fn probe(&self) -> Result<DeviceInfo, ProbeError> {
        let this = self.clone();
        run_blocking(move || {
            let hardware_concurrency = std::thread::available_parallelism()
                .ok()
                .and_then(|n| u32::try_from(n.get()).ok())
                .into();
            Ok(DeviceInfo {
                user_agent: Probed::Value(host_user_agent()),
                screen_res: this.screen_res.clone().into(),
                device_memory: this.device_memory(),
                hardware_concurrency,
            })
        })
        .await
    }
}

/// Turn a POSIX locale (`en_US.UTF-8@euro`) into a BCP-47 tag (`en-US`).
///
/// `C`, `POSIX` and empty values carry no language and yield `None`.
pub fn posix_locale_to_bcp47(raw: &str) -> Option<String> {
    let base = raw
        .split(['.', '@'])
        .next()
        .map(str::trim)
        .unwrap_or_default();
    if base.is_empty() || base == "C" || base == "POSIX" {
        return None;
    }
    Some(base.replace('_', "-"))
}

type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Locale facts from the process environment.
///
/// - timezone: `TZ` (leading `:` stripped), else the contents of the
///   timezone file (`/etc/timezone` by default)
/// - language: first of `LC_ALL`, `LC_MESSAGES`, `LANG` that names a language
/// - languages: `LANGUAGE` (colon separated), else just the language
#[derive(Clone)]
pub struct EnvLocale {
    lookup: EnvLookup,
    timezone_file: Option<PathBuf>,
}

impl EnvLocale {
    pub fn new() -> Self {
        Self {
            lookup: Arc::new(|key| std::env::var(key).ok()),
            timezone_file: Some(PathBuf::from("/etc/timezone")),
        }
    }

    /// Resolve variables through `lookup` instead of the process
    /// environment. No timezone file is consulted.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            lookup: Arc::new(lookup),
            timezone_file: None,
        }
    }

    fn var(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.trim().is_empty())
    }

    fn timezone(&self) -> Option<String> {
        if let Some(tz) = self.var("TZ") {
            let tz = tz.trim().trim_start_matches(':').to_string();
            if !tz.is_empty() {
                return Some(tz);
            }
        }
        let path = self.timezone_file.as_ref()?;
        let text = fs::read_to_string(path).ok()?;
        let tz = text.trim();
        (!tz.is_empty()).then(|| tz.to_string())
    }

    fn language(&self) -> Option<String> {
        ["LC_ALL", "LC_MESSAGES", "LANG"]
            .iter()
            .filter_map(|key| self.var(key))
            .find_map(|raw| posix_locale_to_bcp47(&raw))
    }

    fn languages(&self, primary: Option<&String>) -> Vec<String> {
        let listed: Vec<String> = self
            .var("LANGUAGE")
            .map(|raw| raw.split(':').filter_map(posix_locale_to_bcp47).collect())
            .unwrap_or_default();
        if !listed.is_empty() {
            return listed;
        }
        primary.cloned().into_iter().collect()
    }
}

impl Default for EnvLocale {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EnvLocale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvLocale")
            .field("timezone_file", &self.timezone_file)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SignalSource for EnvLocale {
    type Output = LocaleInfo;

    fn name(&self) -> &'static str {
        "locale_info"
    }

    async fn probe(&self) -> Result<LocaleInfo, ProbeError> {
        let this = self.clone();
        run_blocking(move || {
            let language = this.language();
            let languages = this.languages(language.as_ref());
            Ok(LocaleInfo {
                timezone: this.timezone().into(),
                language: language.into(),
                languages,
            })
        })
        .await
    }
}
