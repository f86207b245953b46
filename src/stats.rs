use crate::models::{ChecklistMap, DailyCheckins, DayChecklist};
use serde::{Deserialize, Serialize};

/// Anything that can report how many of its items are done.
pub trait Checklist {
    fn total_items(&self) -> usize;
    fn done_items(&self) -> usize;
}

impl Checklist for ChecklistMap {
    fn total_items(&self) -> usize {
        self.len()
    }

    fn done_items(&self) -> usize {
        self.values().filter(|done| **done).count()
    }
}

impl Checklist for DayChecklist {
    fn total_items(&self) -> usize {
        self.items().len()
    }

    fn done_items(&self) -> usize {
        self.items().iter().filter(|done| **done).count()
    }
}

/// `round(100 * done / total)`, or 0 for an empty checklist.
pub fn completion_percent(checklist: &impl Checklist) -> u8 {
    ratio_percent(checklist.done_items(), checklist.total_items())
}

fn ratio_percent(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    (part as f64 / whole as f64 * 100.0).round() as u8
}

/// Color class for a percentage. A value on a boundary belongs to the lower
/// bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Bucket {
    #[serde(rename = "progress-0")]
    P0,
    #[serde(rename = "progress-15")]
    P15,
    #[serde(rename = "progress-30")]
    P30,
    #[serde(rename = "progress-50")]
    P50,
    #[serde(rename = "progress-75")]
    P75,
    #[serde(rename = "progress-85")]
    P85,
    #[serde(rename = "progress-90")]
    P90,
    #[serde(rename = "progress-100")]
    P100,
}

pub fn color_bucket(percent: u8) -> Bucket {
    match percent {
        0 => Bucket::P0,
        1..=15 => Bucket::P15,
        16..=30 => Bucket::P30,
        31..=50 => Bucket::P50,
        51..=75 => Bucket::P75,
        76..=85 => Bucket::P85,
        86..=90 => Bucket::P90,
        _ => Bucket::P100,
    }
}

fn day_complete(checkins: &DailyCheckins, day: u8) -> bool {
    completion_percent(&checkins.day(day)) == 100
}

/// Longest run of fully completed days in `1..=total_days`. Any other day,
/// including one never checked in, ends a run.
pub fn streak(checkins: &DailyCheckins, total_days: u8) -> u32 {
    let mut longest = 0u32;
    let mut current = 0u32;
    for day in 1..=total_days {
        if day_complete(checkins, day) {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

pub fn completed_days(checkins: &DailyCheckins, total_days: u8) -> u32 {
    (1..=total_days)
        .filter(|day| day_complete(checkins, *day))
        .count() as u32
}

/// True when a toggle moved a day to 100%.
pub fn day_just_completed(before: &DayChecklist, after: &DayChecklist) -> bool {
    completion_percent(before) < 100 && completion_percent(after) == 100
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tier {
    GetStarted,
    KeepFighting,
    OnTrack,
    FullFocus,
    Insane,
    Complete,
}

pub fn tier(percent: u8) -> Tier {
    match percent {
        100..=u8::MAX => Tier::Complete,
        90..=99 => Tier::Insane,
        75..=89 => Tier::FullFocus,
        50..=74 => Tier::OnTrack,
        25..=49 => Tier::KeepFighting,
        _ => Tier::GetStarted,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub total_days: u8,
    pub completed_days: u32,
    /// Checklist items over days that have a check-in entry.
    pub total_items: u32,
    pub completed_items: u32,
    pub average_percent: u8,
    pub streak: u32,
    pub overall_percent: u8,
    pub bucket: Bucket,
    pub tier: Tier,
}

pub fn progress_summary(checkins: &DailyCheckins, total_days: u8) -> ProgressSummary {
    let mut total_items = 0;
    let mut completed_items = 0;
    for day in (1..=total_days).filter(|day| checkins.has_entry(*day)) {
        let checklist = checkins.day(day);
        total_items += checklist.total_items();
        completed_items += checklist.done_items();
    }

    let completed = completed_days(checkins, total_days);
    let overall_percent = ratio_percent(completed as usize, usize::from(total_days));

    ProgressSummary {
        total_days,
        completed_days: completed,
        total_items: total_items as u32,
        completed_items: completed_items as u32,
        average_percent: ratio_percent(completed_items, total_items),
        streak: streak(checkins, total_days),
        overall_percent,
        bucket: color_bucket(overall_percent),
        tier: tier(overall_percent),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DayStatus {
    pub day: u8,
    pub checklist: DayChecklist,
    pub percent: u8,
    pub bucket: Bucket,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckinOverview {
    pub days: Vec<DayStatus>,
    pub completed_days: u32,
    pub streak: u32,
}

pub fn checkin_overview(checkins: &DailyCheckins, total_days: u8) -> CheckinOverview {
    let days = (1..=total_days)
        .map(|day| {
            let checklist = checkins.day(day);
            let percent = completion_percent(&checklist);
            DayStatus {
                day,
                checklist,
                percent,
                bucket: color_bucket(percent),
            }
        })
        .collect();

    CheckinOverview {
        days,
        completed_days: completed_days(checkins, total_days),
        streak: streak(checkins, total_days),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CHALLENGE_DAYS;

    fn full_day() -> DayChecklist {
        DayChecklist {
            morning_workout: true,
            afternoon_workout: true,
            evening_workout: true,
            clean_nutrition: true,
            hydration_goal: true,
            photo_taken: true,
            sleep_goal: true,
        }
    }

    fn checkins_with(complete: &[u8], partial: &[u8]) -> DailyCheckins {
        let mut checkins = DailyCheckins::default();
        for day in complete {
            checkins = checkins.with_day(*day, full_day()).unwrap();
        }
        for day in partial {
            let almost = DayChecklist {
                sleep_goal: false,
                ..full_day()
            };
            checkins = checkins.with_day(*day, almost).unwrap();
        }
        checkins
    }

    #[test]
    fn percent_of_empty_checklist_is_zero() {
        assert_eq!(completion_percent(&ChecklistMap::new()), 0);
    }

    #[test]
    fn percent_rounds_to_nearest() {
        let mut map = ChecklistMap::new();
        map.insert("a".into(), true);
        map.insert("b".into(), false);
        map.insert("c".into(), false);
        assert_eq!(completion_percent(&map), 33);

        map.insert("b".into(), true);
        assert_eq!(completion_percent(&map), 67);

        map.insert("c".into(), true);
        assert_eq!(completion_percent(&map), 100);

        let all_false: ChecklistMap = [("x".to_string(), false)].into_iter().collect();
        assert_eq!(completion_percent(&all_false), 0);
    }

    #[test]
    fn day_percent_uses_seven_fields() {
        let day = DayChecklist {
            morning_workout: true,
            ..DayChecklist::default()
        };
        assert_eq!(completion_percent(&day), 14);
        assert_eq!(completion_percent(&full_day()), 100);
    }

    #[test]
    fn bucket_boundaries_fall_low() {
        assert_eq!(color_bucket(0), Bucket::P0);
        assert_eq!(color_bucket(1), Bucket::P15);
        assert_eq!(color_bucket(15), Bucket::P15);
        assert_eq!(color_bucket(16), Bucket::P30);
        assert_eq!(color_bucket(30), Bucket::P30);
        assert_eq!(color_bucket(50), Bucket::P50);
        assert_eq!(color_bucket(75), Bucket::P75);
        assert_eq!(color_bucket(85), Bucket::P85);
        assert_eq!(color_bucket(90), Bucket::P90);
        assert_eq!(color_bucket(91), Bucket::P100);
        assert_eq!(color_bucket(100), Bucket::P100);
    }

    #[test]
    fn buckets_are_ordered_by_percent() {
        let buckets: Vec<_> = (0..=100).map(color_bucket).collect();
        assert!(buckets.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn bucket_serializes_as_class_name() {
        assert_eq!(
            serde_json::to_value(Bucket::P15).unwrap(),
            serde_json::json!("progress-15")
        );
    }

    #[test]
    fn streak_is_longest_run_not_last() {
        let checkins = checkins_with(&[3, 4, 5, 10], &[6, 11]);
        assert_eq!(streak(&checkins, 14), 3);
        assert_eq!(completed_days(&checkins, 14), 4);
    }

    #[test]
    fn missing_day_breaks_streak() {
        let checkins = checkins_with(&[1, 2, 4], &[]);
        assert_eq!(streak(&checkins, CHALLENGE_DAYS), 2);
    }

    #[test]
    fn range_limits_counted_days() {
        let checkins = checkins_with(&[1, 2, 20], &[]);
        assert_eq!(completed_days(&checkins, 10), 2);
        assert_eq!(completed_days(&checkins, CHALLENGE_DAYS), 3);
    }

    #[test]
    fn empty_checkins_have_no_progress() {
        let checkins = DailyCheckins::default();
        assert_eq!(completed_days(&checkins, CHALLENGE_DAYS), 0);
        assert_eq!(streak(&checkins, CHALLENGE_DAYS), 0);

        let summary = progress_summary(&checkins, CHALLENGE_DAYS);
        assert_eq!(summary.total_items, 0);
        assert_eq!(summary.average_percent, 0);
        assert_eq!(summary.bucket, Bucket::P0);
        assert_eq!(summary.tier, Tier::GetStarted);
    }

    #[test]
    fn day_completion_is_detected_once() {
        let almost = DayChecklist {
            photo_taken: false,
            ..full_day()
        };
        assert!(day_just_completed(&almost, &full_day()));
        assert!(!day_just_completed(&full_day(), &full_day()));
        assert!(!day_just_completed(&DayChecklist::default(), &almost));
    }

    #[test]
    fn summary_counts_items_on_recorded_days() {
        let complete: Vec<u8> = (1..=14).collect();
        let checkins = checkins_with(&complete, &[15]);
        let summary = progress_summary(&checkins, CHALLENGE_DAYS);

        assert_eq!(summary.completed_days, 14);
        assert_eq!(summary.streak, 14);
        assert_eq!(summary.total_items, 15 * 7);
        assert_eq!(summary.completed_items, 15 * 7 - 1);
        assert_eq!(summary.average_percent, 99);
        assert_eq!(summary.overall_percent, 50);
        assert_eq!(summary.bucket, Bucket::P50);
        assert_eq!(summary.tier, Tier::OnTrack);
    }

    #[test]
    fn tiers_follow_overall_percent() {
        assert_eq!(tier(24), Tier::GetStarted);
        assert_eq!(tier(25), Tier::KeepFighting);
        assert_eq!(tier(75), Tier::FullFocus);
        assert_eq!(tier(90), Tier::Insane);
        assert_eq!(tier(100), Tier::Complete);
    }

    #[test]
    fn overview_covers_every_day() {
        let checkins = checkins_with(&[2], &[]);
        let overview = checkin_overview(&checkins, CHALLENGE_DAYS);
        assert_eq!(overview.days.len(), 28);
        assert_eq!(overview.days[1].percent, 100);
        assert_eq!(overview.days[1].bucket, Bucket::P100);
        assert_eq!(overview.days[0].bucket, Bucket::P0);
        assert_eq!(overview.completed_days, 1);
    }
}
