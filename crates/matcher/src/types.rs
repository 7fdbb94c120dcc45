use serde::{Deserialize, Serialize};
use serde_json::Value;
use signals::{ComponentRecord, Fingerprint};
use thiserror::Error;

/// Anything the comparator accepts on one side.
///
/// Hosts rarely hold a typed [`Fingerprint`] for both sides: a baseline may
/// come back from a clipboard as JSON text, or only the identifier may have
/// been kept. Every shape is accepted and reduced by
/// [`normalize`](crate::normalize).
#[derive(Debug, Clone, PartialEq)]
pub enum CompareInput {
    Fingerprint(Fingerprint),
    Components(ComponentRecord),
    /// JSON text of a fingerprint or record, or a bare identifier.
    Text(String),
    /// Already-parsed, loosely typed JSON.
    Json(Value),
    /// Output of a previous normalization.
    Normalized(Normalized),
}

impl From<Fingerprint> for CompareInput {
    fn from(value: Fingerprint) -> Self {
        CompareInput::Fingerprint(value)
    }
}

impl From<&Fingerprint> for CompareInput {
    fn from(value: &Fingerprint) -> Self {
        CompareInput::Fingerprint(value.clone())
    }
}

impl From<ComponentRecord> for CompareInput {
    fn from(value: ComponentRecord) -> Self {
        CompareInput::Components(value)
    }
}

impl From<&ComponentRecord> for CompareInput {
    fn from(value: &ComponentRecord) -> Self {
        CompareInput::Components(value.clone())
    }
}

impl From<&str> for CompareInput {
    fn from(value: &str) -> Self {
        CompareInput::Text(value.to_string())
    }
}

impl From<String> for CompareInput {
    fn from(value: String) -> Self {
        CompareInput::Text(value)
    }
}

impl From<&String> for CompareInput {
    fn from(value: &String) -> Self {
        CompareInput::Text(value.clone())
    }
}

impl From<Value> for CompareInput {
    fn from(value: Value) -> Self {
        CompareInput::Json(value)
    }
}

impl From<Normalized> for CompareInput {
    fn from(value: Normalized) -> Self {
        CompareInput::Normalized(value)
    }
}

/// The two shapes the comparator works on.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    /// A component record, loosely typed so partial or foreign records still
    /// compare field by field. `identifier` is kept when the input carried
    /// one next to its components.
    Record {
        components: Value,
        identifier: Option<String>,
    },
    /// Nothing but an identifier.
    IdOnly(String),
}

impl Normalized {
    /// The degraded shape: a record with no fields.
    pub fn empty_record() -> Self {
        Normalized::Record {
            components: Value::Object(Default::default()),
            identifier: None,
        }
    }

    pub fn identifier(&self) -> Option<&str> {
        match self {
            Normalized::Record { identifier, .. } => identifier.as_deref(),
            Normalized::IdOnly(id) => Some(id.as_str()),
        }
    }

    pub fn is_id_only(&self) -> bool {
        matches!(self, Normalized::IdOnly(_))
    }
}

/// One row of the scoring table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    AudioHash,
    DrmHash,
    CanvasHash,
    UserAgent,
    ScreenRes,
    DeviceMemory,
    HardwareConcurrency,
    Timezone,
    Language,
    PrimaryLanguage,
}

/// A step in a field's source path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSegment {
    Key(&'static str),
    Index(usize),
}

impl Field {
    pub const ALL: [Field; 10] = [
        Field::AudioHash,
        Field::DrmHash,
        Field::CanvasHash,
        Field::UserAgent,
        Field::ScreenRes,
        Field::DeviceMemory,
        Field::HardwareConcurrency,
        Field::Timezone,
        Field::Language,
        Field::PrimaryLanguage,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Field::AudioHash => "audioHash",
            Field::DrmHash => "drmHash",
            Field::CanvasHash => "canvasHash",
            Field::UserAgent => "userAgent",
            Field::ScreenRes => "screenRes",
            Field::DeviceMemory => "deviceMemory",
            Field::HardwareConcurrency => "hardwareConcurrency",
            Field::Timezone => "timezone",
            Field::Language => "language",
            Field::PrimaryLanguage => "primaryLanguage",
        }
    }

    /// Location of the field inside a component record.
    pub const fn path(self) -> &'static [PathSegment] {
        use PathSegment::{Index, Key};
        match self {
            Field::AudioHash => &[Key("audioHash")],
            Field::DrmHash => &[Key("drmHash")],
            Field::CanvasHash => &[Key("canvasHash")],
            Field::UserAgent => &[Key("deviceInfo"), Key("userAgent")],
            Field::ScreenRes => &[Key("deviceInfo"), Key("screenRes")],
            Field::DeviceMemory => &[Key("deviceInfo"), Key("deviceMemory")],
            Field::HardwareConcurrency => &[Key("deviceInfo"), Key("hardwareConcurrency")],
            Field::Timezone => &[Key("localeInfo"), Key("timezone")],
            Field::Language => &[Key("localeInfo"), Key("language")],
            Field::PrimaryLanguage => &[Key("localeInfo"), Key("languages"), Index(0)],
        }
    }

    /// Resolve the field in `record`; `None` when any step is missing.
    pub fn lookup(self, record: &Value) -> Option<&Value> {
        self.path()
            .iter()
            .try_fold(record, |node, segment| match segment {
                PathSegment::Key(key) => node.get(*key),
                PathSegment::Index(i) => node.get(*i),
            })
    }
}

/// Per-field weight multipliers.
///
/// ```rust
/// use matcher::FieldWeights;
///
/// assert_eq!(FieldWeights::default().total(), 13);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FieldWeights {
    pub audio_hash: u32,
    pub drm_hash: u32,
    pub canvas_hash: u32,
    pub user_agent: u32,
    pub screen_res: u32,
    pub device_memory: u32,
    pub hardware_concurrency: u32,
    pub timezone: u32,
    pub language: u32,
    pub primary_language: u32,
}

impl FieldWeights {
    pub fn weight(&self, field: Field) -> u32 {
        match field {
            Field::AudioHash => self.audio_hash,
            Field::DrmHash => self.drm_hash,
            Field::CanvasHash => self.canvas_hash,
            Field::UserAgent => self.user_agent,
            Field::ScreenRes => self.screen_res,
            Field::DeviceMemory => self.device_memory,
            Field::HardwareConcurrency => self.hardware_concurrency,
            Field::Timezone => self.timezone,
            Field::Language => self.language,
            Field::PrimaryLanguage => self.primary_language,
        }
    }

    /// Sum of all weights. Widened so any table of `u32` weights fits.
    pub fn total(&self) -> u64 {
        Field::ALL.iter().map(|f| u64::from(self.weight(*f))).sum()
    }
}

impl Default for FieldWeights {
    fn default() -> Self {
        Self {
            audio_hash: 2,
            drm_hash: 2,
            canvas_hash: 1,
            user_agent: 2,
            screen_res: 1,
            device_memory: 1,
            hardware_concurrency: 1,
            timezone: 1,
            language: 1,
            primary_language: 1,
        }
    }
}

/// Comparator configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchConfig {
    #[serde(default)]
    pub weights: FieldWeights,
}

impl MatchConfig {
    pub fn validate(&self) -> Result<(), MatchError> {
        if self.weights.total() == 0 {
            return Err(MatchError::InvalidConfig(
                "weights must contain at least one non-zero entry".into(),
            ));
        }
        Ok(())
    }
}

/// Which scoring branch produced a result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// At least one side was identifier-only; only identifiers were compared.
    Identifier,
    /// Weighted field-by-field comparison.
    Weighted,
    /// A normalized record was not an object; scored 0.
    Invalid,
}

impl MatchMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            MatchMode::Identifier => "identifier",
            MatchMode::Weighted => "weighted",
            MatchMode::Invalid => "invalid",
        }
    }
}

/// Result of one field comparison.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldOutcome {
    pub field: Field,
    pub weight: u32,
    pub matched: bool,
    pub left: Option<Value>,
    pub right: Option<Value>,
}

/// Full account of a comparison.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompareReport {
    pub score: f64,
    pub mode: MatchMode,
    pub matched_weight: u64,
    pub total_weight: u64,
    /// Empty unless `mode` is [`MatchMode::Weighted`].
    pub fields: Vec<FieldOutcome>,
}

/// Errors produced by the matching layer.
///
/// Comparisons themselves never fail; only configuration is validated.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MatchError {
    #[error("invalid match config: {0}")]
    InvalidConfig(String),
}
