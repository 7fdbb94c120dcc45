//! Shared record shapes.
//!
//! [`ComponentRecord`] is the only thing the fingerprint builder and the
//! comparator have in common. Its key set and nesting never change with the
//! environment; only values vary or turn into sentinels.

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::ProbeError;

/// Sentinel text for a probe that ran but produced nothing.
pub const UNAVAILABLE: &str = "unavailable";
/// Sentinel text for a capability the environment does not have.
pub const UNSUPPORTED: &str = "unsupported";

/// A signal value or the sentinel that replaced it.
///
/// Serializes as the bare inner value, or as the literal sentinel strings
/// `"unavailable"` / `"unsupported"`. Sentinels compare equal to sentinels of
/// the same kind.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Probed<T> {
    Value(T),
    #[default]
    Unavailable,
    Unsupported,
}

impl<T> Probed<T> {
    pub fn is_sentinel(&self) -> bool {
        !matches!(self, Probed::Value(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Probed::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Probed<U> {
        match self {
            Probed::Value(v) => Probed::Value(f(v)),
            Probed::Unavailable => Probed::Unavailable,
            Probed::Unsupported => Probed::Unsupported,
        }
    }

    /// Sentinel text, if this is a sentinel.
    pub fn sentinel(&self) -> Option<&'static str> {
        match self {
            Probed::Value(_) => None,
            Probed::Unavailable => Some(UNAVAILABLE),
            Probed::Unsupported => Some(UNSUPPORTED),
        }
    }
}

impl<T> From<Option<T>> for Probed<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Probed::Unavailable, Probed::Value)
    }
}

impl<T> From<Result<T, ProbeError>> for Probed<T> {
    fn from(result: Result<T, ProbeError>) -> Self {
        match result {
            Ok(v) => Probed::Value(v),
            Err(ProbeError::Unavailable(_)) => Probed::Unavailable,
            Err(ProbeError::Unsupported) => Probed::Unsupported,
        }
    }
}

impl<T: Clone + Into<Value>> Probed<T> {
    pub fn to_value(&self) -> Value {
        match self {
            Probed::Value(v) => v.clone().into(),
            Probed::Unavailable => Value::from(UNAVAILABLE),
            Probed::Unsupported => Value::from(UNSUPPORTED),
        }
    }
}

impl<T: Serialize> Serialize for Probed<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Probed::Value(v) => v.serialize(serializer),
            Probed::Unavailable => serializer.serialize_str(UNAVAILABLE),
            Probed::Unsupported => serializer.serialize_str(UNSUPPORTED),
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Probed<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        match raw.as_str() {
            Some(UNAVAILABLE) => Ok(Probed::Unavailable),
            Some(UNSUPPORTED) => Ok(Probed::Unsupported),
            _ => T::deserialize(raw).map(Probed::Value).map_err(D::Error::custom),
        }
    }
}

/// Hardware and user-agent facts.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    pub user_agent: Probed<String>,
    /// `"<width>x<height>"`.
    pub screen_res: Probed<String>,
    /// Approximate memory in GiB, bucketed like `navigator.deviceMemory`.
    pub device_memory: Probed<f64>,
    pub hardware_concurrency: Probed<u32>,
}

impl DeviceInfo {
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("userAgent".into(), self.user_agent.to_value());
        map.insert("screenRes".into(), self.screen_res.to_value());
        map.insert("deviceMemory".into(), self.device_memory.to_value());
        map.insert(
            "hardwareConcurrency".into(),
            self.hardware_concurrency.to_value(),
        );
        Value::Object(map)
    }
}

/// Locale preferences, BCP-47 tags.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocaleInfo {
    pub timezone: Probed<String>,
    pub language: Probed<String>,
    /// Preference order matters; element 0 is the primary language.
    pub languages: Vec<String>,
}

impl LocaleInfo {
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("timezone".into(), self.timezone.to_value());
        map.insert("language".into(), self.language.to_value());
        map.insert("languages".into(), Value::from(self.languages.clone()));
        Value::Object(map)
    }
}

/// Every signal the collector gathers, under fixed keys.
///
/// `Default` is the fully degraded record: every probed field `unavailable`,
/// `privateFlag` false, no languages.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentRecord {
    pub audio_hash: Probed<String>,
    pub drm_hash: Probed<String>,
    pub canvas_hash: Probed<String>,
    pub storage_salt: Probed<String>,
    pub private_flag: bool,
    pub device_info: DeviceInfo,
    pub locale_info: LocaleInfo,
}

impl ComponentRecord {
    /// Top-level keys, in declaration order.
    pub const KEYS: [&'static str; 7] = [
        "audioHash",
        "drmHash",
        "canvasHash",
        "storageSalt",
        "privateFlag",
        "deviceInfo",
        "localeInfo",
    ];

    /// Structured form used for canonicalization and comparison.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("audioHash".into(), self.audio_hash.to_value());
        map.insert("drmHash".into(), self.drm_hash.to_value());
        map.insert("canvasHash".into(), self.canvas_hash.to_value());
        map.insert("storageSalt".into(), self.storage_salt.to_value());
        map.insert("privateFlag".into(), Value::Bool(self.private_flag));
        map.insert("deviceInfo".into(), self.device_info.to_value());
        map.insert("localeInfo".into(), self.locale_info.to_value());
        Value::Object(map)
    }

    /// Number of probed fields holding `unavailable` or `unsupported`.
    ///
    /// `languages` and the private flag have no sentinel form and are not
    /// counted.
    pub fn sentinel_count(&self) -> usize {
        let d = &self.device_info;
        let l = &self.locale_info;
        [
            self.audio_hash.is_sentinel(),
            self.drm_hash.is_sentinel(),
            self.canvas_hash.is_sentinel(),
            self.storage_salt.is_sentinel(),
            d.user_agent.is_sentinel(),
            d.screen_res.is_sentinel(),
            d.device_memory.is_sentinel(),
            d.hardware_concurrency.is_sentinel(),
            l.timezone.is_sentinel(),
            l.language.is_sentinel(),
        ]
        .into_iter()
        .filter(|s| *s)
        .count()
    }
}

/// Composite identifier plus the record it was computed from.
///
/// Built once per generation and never mutated afterwards; there are no
/// setters, and `identifier` is only meaningful together with `components`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fingerprint {
    pub identifier: String,
    pub components: ComponentRecord,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> ComponentRecord {
        ComponentRecord {
            audio_hash: Probed::Value("a1".into()),
            drm_hash: Probed::Unsupported,
            canvas_hash: Probed::Value("c3".into()),
            storage_salt: Probed::Value("salt".into()),
            private_flag: true,
            device_info: DeviceInfo {
                user_agent: Probed::Value("ua".into()),
                screen_res: Probed::Unavailable,
                device_memory: Probed::Value(8.0),
                hardware_concurrency: Probed::Value(16),
            },
            locale_info: LocaleInfo {
                timezone: Probed::Value("Europe/Berlin".into()),
                language: Probed::Value("de-DE".into()),
                languages: vec!["de-DE".into(), "en".into()],
            },
        }
    }

    #[test]
    fn to_value_matches_serde_output() {
        let record = sample();
        let via_serde = serde_json::to_value(&record).expect("serialize");
        assert_eq!(record.to_value(), via_serde);
    }

    #[test]
    fn sentinels_serialize_as_strings() {
        let value = sample().to_value();
        assert_eq!(value["drmHash"], json!("unsupported"));
        assert_eq!(value["deviceInfo"]["screenRes"], json!("unavailable"));
        assert_eq!(value["deviceInfo"]["hardwareConcurrency"], json!(16));
    }

    #[test]
    fn record_round_trips_through_json_text() {
        let record = sample();
        let text = serde_json::to_string(&record).expect("serialize");
        let back: ComponentRecord = serde_json::from_str(&text).expect("deserialize");
        assert_eq!(back, record);
    }

    #[test]
    fn degraded_record_has_every_key() {
        let value = ComponentRecord::default().to_value();
        let object = value.as_object().expect("object");
        for key in ComponentRecord::KEYS {
            assert!(object.contains_key(key), "missing {key}");
        }
        assert_eq!(object.len(), ComponentRecord::KEYS.len());
        assert_eq!(value["audioHash"], json!(UNAVAILABLE));
        assert_eq!(value["deviceInfo"]["userAgent"], json!(UNAVAILABLE));
        assert_eq!(value["localeInfo"]["languages"], json!([]));
    }

    #[test]
    fn sentinel_count_covers_probed_fields() {
        assert_eq!(ComponentRecord::default().sentinel_count(), 10);
        // drmHash and screenRes.
        assert_eq!(sample().sentinel_count(), 2);
    }

    #[test]
    fn probe_errors_map_to_sentinels() {
        let unavailable: Probed<u32> = Err(ProbeError::unavailable("x")).into();
        let unsupported: Probed<u32> = Err(ProbeError::Unsupported).into();
        let value: Probed<u32> = Ok(4).into();
        assert_eq!(unavailable, Probed::Unavailable);
        assert_eq!(unsupported, Probed::Unsupported);
        assert_eq!(value.value(), Some(&4));
        assert_eq!(unsupported.sentinel(), Some(UNSUPPORTED));
    }

    #[test]
    fn numeric_field_rejects_garbage() {
        let res: Result<Probed<u32>, _> = serde_json::from_value(json!("eight"));
        assert!(res.is_err());
    }
}
