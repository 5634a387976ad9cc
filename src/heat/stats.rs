use super::Heatmap;
use crate::translate::Language;
use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;
use std::collections::HashSet;

pub const DEFAULT_PEAK_HOUR: u8 = 12;

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapStats {
    pub total_commits: u64,
    pub unique_days: usize,
    pub peak_hour: u8,
    pub current_streak: u32,
    pub busiest_day: String,
    pub avg_commits_per_day: f64,
}

impl HeatmapStats {
    pub fn compute(heatmap: &Heatmap, today: NaiveDate, lang: Language) -> Self {
        let total_commits = heatmap.total();
        let unique_days = heatmap.dates().len();
        Self {
            total_commits,
            unique_days,
            peak_hour: peak_hour(heatmap),
            current_streak: current_streak(heatmap, today),
            busiest_day: weekday_name(busiest_weekday(heatmap), lang).to_string(),
            avg_commits_per_day: average_per_day(total_commits, unique_days),
        }
    }
}

/// Hour with the most commits over all dates, lowest hour on ties.
pub fn peak_hour(heatmap: &Heatmap) -> u8 {
    if heatmap.is_empty() {
        return DEFAULT_PEAK_HOUR;
    }
    first_max(&heatmap.hour_totals()) as u8
}

/// Index of the largest value; the earliest one wins a tie.
fn first_max(totals: &[u64]) -> usize {
    totals
        .iter()
        .enumerate()
        .fold(0, |best, (i, &total)| if total > totals[best] { i } else { best })
}

/// Consecutive active days ending today, or ending yesterday when today has
/// no commits yet.
pub fn current_streak(heatmap: &Heatmap, today: NaiveDate) -> u32 {
    let active: HashSet<NaiveDate> = heatmap
        .dates()
        .into_iter()
        .filter_map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .collect();

    let mut day = if active.contains(&today) {
        today
    } else {
        match today.pred_opt() {
            Some(yesterday) => yesterday,
            None => return 0,
        }
    };

    let mut streak = 0;
    while active.contains(&day) {
        streak += 1;
        day = match day.pred_opt() {
            Some(previous) => previous,
            None => break,
        };
    }
    streak
}

/// Weekday with the most commits, Monday first on ties and when empty.
/// Dates that are not real calendar days are ignored here.
pub fn busiest_weekday(heatmap: &Heatmap) -> Weekday {
    let mut totals = [0u64; 7];
    for (date, _, count) in heatmap.iter() {
        if let Ok(day) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
            totals[day.weekday().num_days_from_monday() as usize] += count as u64;
        }
    }
    WEEK[first_max(&totals)]
}

/// Commits per active day, one decimal place with halves going to the even
/// digit; 0 without active days.
pub fn average_per_day(total: u64, days: usize) -> f64 {
    if days == 0 {
        return 0.0;
    }
    (total as f64 / days as f64 * 10.0).round_ties_even() / 10.0
}

pub fn weekday_name(day: Weekday, lang: Language) -> &'static str {
    match lang {
        Language::En => match day {
            Weekday::Mon => "Monday",
            Weekday::Tue => "Tuesday",
            Weekday::Wed => "Wednesday",
            Weekday::Thu => "Thursday",
            Weekday::Fri => "Friday",
            Weekday::Sat => "Saturday",
            Weekday::Sun => "Sunday",
        },
        Language::Fr => match day {
            Weekday::Mon => "Lundi",
            Weekday::Tue => "Mardi",
            Weekday::Wed => "Mercredi",
            Weekday::Thu => "Jeudi",
            Weekday::Fri => "Vendredi",
            Weekday::Sat => "Samedi",
            Weekday::Sun => "Dimanche",
        },
    }
}
