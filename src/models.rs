use crate::errors::StoreError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Length of the challenge; day numbers live in `1..=CHALLENGE_DAYS`.
pub const CHALLENGE_DAYS: u8 = 28;

/// Item id to done flag. Backs the workouts, nutrition and rules records.
pub type ChecklistMap = BTreeMap<String, bool>;

pub fn is_challenge_day(day: u32) -> bool {
    (1..=u32::from(CHALLENGE_DAYS)).contains(&day)
}

/// The seven things checked off for a single day. Unknown fields in stored
/// data are dropped and never counted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct DayChecklist {
    pub morning_workout: bool,
    pub afternoon_workout: bool,
    pub evening_workout: bool,
    pub clean_nutrition: bool,
    pub hydration_goal: bool,
    pub photo_taken: bool,
    pub sleep_goal: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CheckinField {
    MorningWorkout,
    AfternoonWorkout,
    EveningWorkout,
    CleanNutrition,
    HydrationGoal,
    PhotoTaken,
    SleepGoal,
}

impl DayChecklist {
    pub fn items(&self) -> [bool; 7] {
        [
            self.morning_workout,
            self.afternoon_workout,
            self.evening_workout,
            self.clean_nutrition,
            self.hydration_goal,
            self.photo_taken,
            self.sleep_goal,
        ]
    }

    pub fn toggled(mut self, field: CheckinField) -> Self {
        let slot = match field {
            CheckinField::MorningWorkout => &mut self.morning_workout,
            CheckinField::AfternoonWorkout => &mut self.afternoon_workout,
            CheckinField::EveningWorkout => &mut self.evening_workout,
            CheckinField::CleanNutrition => &mut self.clean_nutrition,
            CheckinField::HydrationGoal => &mut self.hydration_goal,
            CheckinField::PhotoTaken => &mut self.photo_taken,
            CheckinField::SleepGoal => &mut self.sleep_goal,
        };
        *slot = !*slot;
        self
    }
}

/// Day number to checklist. Keys that are not a challenge day, numeric or
/// not, are dropped when read so one bad key cannot invalidate the record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, DayChecklist>", into = "BTreeMap<u8, DayChecklist>")]
pub struct DailyCheckins {
    days: BTreeMap<u8, DayChecklist>,
}

impl From<BTreeMap<String, DayChecklist>> for DailyCheckins {
    fn from(raw: BTreeMap<String, DayChecklist>) -> Self {
        let days = raw
            .into_iter()
            .filter_map(|(key, checklist)| {
                let day = key.trim().parse::<u8>().ok()?;
                is_challenge_day(u32::from(day)).then_some((day, checklist))
            })
            .collect();
        Self { days }
    }
}

impl From<DailyCheckins> for BTreeMap<u8, DayChecklist> {
    fn from(checkins: DailyCheckins) -> Self {
        checkins.days
    }
}

impl DailyCheckins {
    /// Missing days read as all-false.
    pub fn day(&self, day: u8) -> DayChecklist {
        self.days.get(&day).copied().unwrap_or_default()
    }

    pub fn has_entry(&self, day: u8) -> bool {
        self.days.contains_key(&day)
    }

    pub fn with_day(mut self, day: u8, checklist: DayChecklist) -> Result<Self, StoreError> {
        if !is_challenge_day(u32::from(day)) {
            return Err(StoreError::DayOutOfRange(u32::from(day)));
        }
        self.days.insert(day, checklist);
        Ok(self)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Supplement {
    pub id: String,
    pub name: String,
    pub ingredients: Vec<String>,
    pub preparation: Vec<String>,
    #[serde(default)]
    pub prepared_dates: BTreeSet<NaiveDate>,
}

impl Supplement {
    pub fn prepared_on(&self, date: NaiveDate) -> bool {
        self.prepared_dates.contains(&date)
    }
}

/// Flips whether supplement `id` was prepared on `date`. Unknown ids leave the
/// log unchanged.
pub fn toggle_prepared(mut log: Vec<Supplement>, id: &str, date: NaiveDate) -> Vec<Supplement> {
    if let Some(supplement) = log.iter_mut().find(|supplement| supplement.id == id) {
        if !supplement.prepared_dates.remove(&date) {
            supplement.prepared_dates.insert(date);
        }
    }
    log
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Goal {
    pub title: String,
    pub description: String,
    pub personal_goal: String,
}

impl Default for Goal {
    fn default() -> Self {
        Self {
            title: "Insane Shape in 28 Days".to_string(),
            description: "Complete transformation through absolute discipline: fat loss, \
                          muscle definition and an unbeatable mindset."
                .to_string(),
            personal_goal: String::new(),
        }
    }
}

impl Goal {
    pub fn with_personal_goal(self, personal_goal: impl Into<String>) -> Self {
        Self {
            personal_goal: personal_goal.into(),
            ..self
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PhotoEntry {
    pub id: String,
    pub date: NaiveDate,
    pub time: String,
    pub image: String,
    pub day: u8,
}

pub fn default_workouts() -> ChecklistMap {
    numbered_checklist(6)
}

pub fn default_rules() -> ChecklistMap {
    numbered_checklist(5)
}

fn numbered_checklist(count: u8) -> ChecklistMap {
    (1..=count).map(|id| (id.to_string(), false)).collect()
}

pub fn default_supplements() -> Vec<Supplement> {
    let recipe = |id: &str, name: &str, ingredients: &[&str], preparation: &[&str]| Supplement {
        id: id.to_string(),
        name: name.to_string(),
        ingredients: ingredients.iter().map(|s| s.to_string()).collect(),
        preparation: preparation.iter().map(|s| s.to_string()).collect(),
        prepared_dates: BTreeSet::new(),
    };

    vec![
        recipe(
            "1",
            "Natural Burner",
            &["1 squeezed lemon", "1 spoon grated ginger", "1 cucumber", "500ml cold water", "Mint leaves"],
            &["Blend everything", "Strain if preferred", "Drink on an empty stomach"],
        ),
        recipe(
            "2",
            "Homemade Pre-Workout",
            &["1 banana", "1 spoon oats", "1 spoon honey", "200ml coconut water", "Ground cinnamon"],
            &["Mix all ingredients", "Blend", "Drink 30 minutes before training"],
        ),
        recipe(
            "3",
            "Post-Workout Recovery",
            &["1 glass of milk", "1 banana", "1 spoon oats", "1 spoon cocoa powder", "Ice"],
            &["Blend everything", "Add ice to taste", "Drink within 30 minutes after training"],
        ),
        recipe(
            "4",
            "Night Detox",
            &["1 apple", "1 carrot", "1 piece of ginger", "200ml water", "Kale leaves"],
            &["Blend everything", "Strain if needed", "Drink 2 hours before sleeping"],
        ),
        recipe(
            "5",
            "Natural Energy",
            &["1 beetroot", "1 apple", "1 carrot", "1 orange", "Ginger to taste"],
            &["Juice every ingredient", "Stir well", "Drink in the morning"],
        ),
    ]
}

#[derive(Debug, Deserialize)]
pub struct ToggleItemRequest {
    pub item: String,
}

#[derive(Debug, Deserialize)]
pub struct ToggleFieldRequest {
    pub field: CheckinField,
}

#[derive(Debug, Deserialize)]
pub struct PersonalGoalRequest {
    pub personal_goal: String,
}

#[derive(Debug, Deserialize)]
pub struct PhotoUploadRequest {
    pub image: String,
}

/// Result of a mutation. `persisted` is false when the backend rejected the
/// write; `value` is still what the session sees from now on.
#[derive(Debug, Serialize)]
pub struct Mutation<T> {
    pub value: T,
    pub persisted: bool,
    pub notice: Option<String>,
}

impl<T> Mutation<T> {
    pub fn new(value: T, notice: Option<String>) -> Self {
        Self {
            value,
            persisted: notice.is_none(),
            notice,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChecklistView {
    pub items: ChecklistMap,
    pub percent: u8,
    pub bucket: crate::stats::Bucket,
}

#[derive(Debug, Serialize)]
pub struct DayToggleResponse {
    pub day: u8,
    pub checklist: DayChecklist,
    pub percent: u8,
    pub bucket: crate::stats::Bucket,
    pub completed_now: bool,
}

#[derive(Debug, Serialize)]
pub struct NavigateResponse {
    pub index: usize,
    pub photo: Option<PhotoEntry>,
}
