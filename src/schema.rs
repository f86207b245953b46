//! The fixed set of records the store knows about, their storage keys and
//! their defaults.

use crate::errors::StoreError;
use crate::models::{
    default_rules, default_supplements, default_workouts, ChecklistMap, DailyCheckins, Goal,
    PhotoEntry, Supplement, CHALLENGE_DAYS,
};
use crate::stats::{progress_summary, ProgressSummary};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecordName {
    Workouts,
    Nutrition,
    Supplements,
    Rules,
    Goals,
    DailyCheckin,
    Photos,
    ComputedProgress,
}

pub struct SchemaEntry {
    pub name: RecordName,
    /// `None` for derived records that are never persisted.
    pub key: Option<&'static str>,
    default: fn() -> Value,
    normalize: fn(Value) -> Result<Value, serde_json::Error>,
}

impl SchemaEntry {
    pub fn default_value(&self) -> Value {
        (self.default)()
    }

    /// Round-trips `value` through the record's shape, dropping anything the
    /// shape does not know about.
    pub fn normalize(&self, value: Value) -> Result<Value, serde_json::Error> {
        (self.normalize)(value)
    }
}

fn shaped<T: Serialize + DeserializeOwned>(value: Value) -> Result<Value, serde_json::Error> {
    serde_json::from_value::<T>(value).and_then(serde_json::to_value)
}

fn to_json(value: impl Serialize) -> Value {
    serde_json::to_value(value).unwrap_or_default()
}

/// Ordered like `RecordName` so a name indexes its own entry.
static REGISTRY: [SchemaEntry; 8] = [
    SchemaEntry {
        name: RecordName::Workouts,
        key: Some("fitness_workouts"),
        default: || to_json(default_workouts()),
        normalize: shaped::<ChecklistMap>,
    },
    SchemaEntry {
        name: RecordName::Nutrition,
        key: Some("fitness_nutrition"),
        default: || to_json(ChecklistMap::new()),
        normalize: shaped::<ChecklistMap>,
    },
    SchemaEntry {
        name: RecordName::Supplements,
        key: Some("fitness_supplements"),
        default: || to_json(default_supplements()),
        normalize: shaped::<Vec<Supplement>>,
    },
    SchemaEntry {
        name: RecordName::Rules,
        key: Some("fitness_rules"),
        default: || to_json(default_rules()),
        normalize: shaped::<ChecklistMap>,
    },
    SchemaEntry {
        name: RecordName::Goals,
        key: Some("fitness_goals"),
        default: || to_json(Goal::default()),
        normalize: shaped::<Goal>,
    },
    SchemaEntry {
        name: RecordName::DailyCheckin,
        key: Some("fitness_checkin"),
        default: || to_json(DailyCheckins::default()),
        normalize: shaped::<DailyCheckins>,
    },
    SchemaEntry {
        name: RecordName::Photos,
        key: Some("fitness_photos"),
        default: || to_json(Vec::<PhotoEntry>::new()),
        normalize: shaped::<Vec<PhotoEntry>>,
    },
    SchemaEntry {
        name: RecordName::ComputedProgress,
        key: None,
        default: || to_json(progress_summary(&DailyCheckins::default(), CHALLENGE_DAYS)),
        normalize: shaped::<ProgressSummary>,
    },
];

impl RecordName {
    pub const ALL: [RecordName; 8] = [
        RecordName::Workouts,
        RecordName::Nutrition,
        RecordName::Supplements,
        RecordName::Rules,
        RecordName::Goals,
        RecordName::DailyCheckin,
        RecordName::Photos,
        RecordName::ComputedProgress,
    ];

    pub fn entry(self) -> &'static SchemaEntry {
        &REGISTRY[self as usize]
    }

    pub fn key(self) -> Option<&'static str> {
        self.entry().key
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RecordName::Workouts => "workouts",
            RecordName::Nutrition => "nutrition",
            RecordName::Supplements => "supplements",
            RecordName::Rules => "rules",
            RecordName::Goals => "goals",
            RecordName::DailyCheckin => "daily-checkin",
            RecordName::Photos => "photos",
            RecordName::ComputedProgress => "computed-progress",
        }
    }

    /// Records shaped as a plain item checklist.
    pub fn is_checklist(self) -> bool {
        matches!(
            self,
            RecordName::Workouts | RecordName::Nutrition | RecordName::Rules
        )
    }
}

impl fmt::Display for RecordName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordName {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecordName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| StoreError::UnknownRecord(s.to_string()))
    }
}
