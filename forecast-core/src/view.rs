//! Forecast view model: current sample, hourly window and day buckets.
//!
//! Day buckets are keyed by calendar date in a caller-supplied time zone.
//! Production callers pass [`chrono::Local`]; tests pin a fixed zone.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Serialize;

use crate::{ForecastSample, Units, WeatherError};

/// Number of samples shown after the current one.
pub const HOURLY_WINDOW: usize = 3;

/// First sample of the series; it represents "now".
pub fn select_current(samples: &[ForecastSample]) -> Result<&ForecastSample, WeatherError> {
    samples.first().ok_or(WeatherError::EmptyForecast)
}

/// The samples immediately following the current one, at most [`HOURLY_WINDOW`].
pub fn select_hourly_window(samples: &[ForecastSample]) -> &[ForecastSample] {
    let end = samples.len().min(HOURLY_WINDOW + 1);
    samples.get(1..end).unwrap_or(&[])
}

/// Display symbol for a unit key: `"metric"`, `"imperial"` or `""` (Kelvin).
pub fn unit_symbol(unit: &str) -> Result<&'static str, WeatherError> {
    Ok(unit.parse::<Units>()?.symbol())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconSize {
    /// Current-conditions card.
    Large,
    /// Hourly and day cards.
    Small,
}

/// OpenWeather icon image for a sample's icon code.
pub fn icon_url(icon: &str, size: IconSize) -> String {
    let scale = match size {
        IconSize::Large => 4,
        IconSize::Small => 2,
    };
    format!("https://openweathermap.org/img/wn/{icon}@{scale}x.png")
}

/// Calendar date of `time` in `tz`.
pub fn day_key<Tz: TimeZone>(time: &DateTime<Utc>, tz: &Tz) -> NaiveDate {
    time.with_timezone(tz).date_naive()
}

/// Weekday label derived from a bucket key, e.g. "Monday".
pub fn weekday_label(day: NaiveDate) -> String {
    day.format("%A").to_string()
}

/// Samples of one calendar day, in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayBucket {
    pub day: NaiveDate,
    pub samples: Vec<ForecastSample>,
}

/// Day buckets in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DailyForecast {
    buckets: Vec<DayBucket>,
}

impl DailyForecast {
    pub fn buckets(&self) -> &[DayBucket] {
        &self.buckets
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.buckets.iter().map(|b| b.day)
    }

    pub fn get(&self, day: NaiveDate) -> Option<&[ForecastSample]> {
        self.buckets.iter().find(|b| b.day == day).map(|b| b.samples.as_slice())
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total number of samples across all buckets.
    pub fn sample_count(&self) -> usize {
        self.buckets.iter().map(|b| b.samples.len()).sum()
    }

    /// Resolve a day selector given as an ISO date (`2024-05-01`) or a weekday
    /// name (`friday`). A weekday name picks the first bucket falling on it.
    pub fn find(&self, selector: &str) -> Option<NaiveDate> {
        let selector = selector.trim();

        if let Ok(day) = NaiveDate::parse_from_str(selector, "%Y-%m-%d") {
            return self.get(day).map(|_| day);
        }

        self.days().find(|day| {
            let label = weekday_label(*day);
            label.eq_ignore_ascii_case(selector)
                || day.format("%a").to_string().eq_ignore_ascii_case(selector)
        })
    }

    fn push<Tz: TimeZone>(&mut self, sample: ForecastSample, tz: &Tz) {
        let day = day_key(&sample.time, tz);

        // Chronological input usually matches the last bucket.
        match self.buckets.iter_mut().rev().find(|b| b.day == day) {
            Some(bucket) => bucket.samples.push(sample),
            None => self.buckets.push(DayBucket { day, samples: vec![sample] }),
        }
    }
}

/// Partition the series by calendar day in `tz`.
pub fn group_by_day<Tz: TimeZone>(samples: &[ForecastSample], tz: &Tz) -> DailyForecast {
    let mut daily = DailyForecast::default();
    for sample in samples {
        daily.push(sample.clone(), tz);
    }
    daily
}

/// One entry of the day selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayOption {
    pub day: NaiveDate,
    pub label: String,
}

pub fn day_options(daily: &DailyForecast) -> Vec<DayOption> {
    daily.days().map(|day| DayOption { day, label: weekday_label(day) }).collect()
}

/// Render-ready result of one forecast fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewModel {
    pub current: ForecastSample,
    pub hourly: Vec<ForecastSample>,
    pub daily: DailyForecast,
}

impl ViewModel {
    pub fn build<Tz: TimeZone>(samples: &[ForecastSample], tz: &Tz) -> Result<Self, WeatherError> {
        let current = select_current(samples)?.clone();
        let hourly = select_hourly_window(samples).to_vec();
        let daily = group_by_day(samples, tz);

        Ok(Self { current, hourly, daily })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn sample(ts: i64) -> ForecastSample {
        ForecastSample {
            time: DateTime::from_timestamp(ts, 0).unwrap(),
            temperature: ts as f64 / 1000.0,
            feels_like: 0.0,
            condition: "Clear".into(),
            icon: "01d".into(),
        }
    }

    /// 3-hourly series starting at 2024-05-01T00:00:00Z.
    fn series(n: usize) -> Vec<ForecastSample> {
        const START: i64 = 1_714_521_600;
        (0..n).map(|i| sample(START + i as i64 * 3 * 3600)).collect()
    }

    #[test]
    fn current_is_first_sample() {
        let samples = series(5);
        assert_eq!(select_current(&samples).unwrap(), &samples[0]);
    }

    #[test]
    fn current_of_empty_series_fails() {
        assert_eq!(select_current(&[]).unwrap_err(), WeatherError::EmptyForecast);
        assert_eq!(ViewModel::build(&[], &Utc).unwrap_err(), WeatherError::EmptyForecast);
    }

    #[test]
    fn hourly_window_length_and_exclusion() {
        for n in 0..8 {
            let samples = series(n);
            let window = select_hourly_window(&samples);

            assert_eq!(window.len(), HOURLY_WINDOW.min(n.saturating_sub(1)), "len for n={n}");
            if let Ok(current) = select_current(&samples) {
                assert!(!window.contains(current));
            }
        }
    }

    #[test]
    fn hourly_window_preserves_order() {
        let samples = series(10);
        assert_eq!(select_hourly_window(&samples), &samples[1..4]);
    }

    #[test]
    fn unit_symbols() {
        assert_eq!(unit_symbol("metric").unwrap(), "°C");
        assert_eq!(unit_symbol("imperial").unwrap(), "°F");
        assert_eq!(unit_symbol("").unwrap(), "K");
        assert!(matches!(unit_symbol("rankine"), Err(WeatherError::InvalidRequest(_))));
    }

    #[test]
    fn icon_urls() {
        assert_eq!(icon_url("04d", IconSize::Large), "https://openweathermap.org/img/wn/04d@4x.png");
        assert_eq!(icon_url("10n", IconSize::Small), "https://openweathermap.org/img/wn/10n@2x.png");
    }

    #[test]
    fn group_by_day_partitions_input() {
        let samples = series(40);
        let daily = group_by_day(&samples, &Utc);

        assert_eq!(daily.sample_count(), samples.len());
        let flattened: Vec<_> = daily.buckets().iter().flat_map(|b| b.samples.iter()).collect();
        assert_eq!(flattened, samples.iter().collect::<Vec<_>>());
        assert_eq!(daily.len(), 5);
    }

    #[test]
    fn two_utc_days_make_two_sorted_buckets() {
        // 2024-05-01 18:00, 21:00 and 2024-05-02 00:00, 03:00 UTC.
        let samples: Vec<_> = [1_714_586_400, 1_714_597_200, 1_714_608_000, 1_714_618_800]
            .into_iter()
            .map(sample)
            .collect();

        let daily = group_by_day(&samples, &Utc);

        assert_eq!(daily.len(), 2);
        for bucket in daily.buckets() {
            assert!(bucket.samples.windows(2).all(|w| w[0].time < w[1].time));
        }
        let days: Vec<_> = daily.days().map(|d| d.to_string()).collect();
        assert_eq!(days, ["2024-05-01", "2024-05-02"]);
    }

    #[test]
    fn revisited_day_joins_its_first_bucket() {
        // May 1st 09:00, May 2nd 09:00, then May 1st 12:00 UTC.
        let samples: Vec<_> = [1_714_554_000, 1_714_640_400, 1_714_564_800]
            .into_iter()
            .map(sample)
            .collect();

        let daily = group_by_day(&samples, &Utc);

        let days: Vec<_> = daily.days().map(|d| d.to_string()).collect();
        assert_eq!(days, ["2024-05-01", "2024-05-02"]);
        assert_eq!(daily.buckets()[0].samples, [samples[0].clone(), samples[2].clone()]);
        assert_eq!(daily.buckets()[1].samples, [samples[1].clone()]);
        assert_eq!(daily.sample_count(), 3);
    }

    #[test]
    fn bucket_keys_follow_the_time_zone() {
        // 2024-05-01 23:00 UTC is already May 2nd at UTC+2.
        let samples = vec![sample(1_714_604_400)];
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();

        let utc_day = group_by_day(&samples, &Utc).days().next().unwrap();
        let local_day = group_by_day(&samples, &plus_two).days().next().unwrap();

        assert_eq!(utc_day.to_string(), "2024-05-01");
        assert_eq!(local_day.to_string(), "2024-05-02");
    }

    #[test]
    fn same_weekday_in_different_weeks_stays_apart() {
        let week = 7 * 24 * 3600;
        let samples = vec![sample(1_714_521_600), sample(1_714_521_600 + week)];

        let daily = group_by_day(&samples, &Utc);
        assert_eq!(daily.len(), 2);
        assert_eq!(weekday_label(daily.buckets()[0].day), weekday_label(daily.buckets()[1].day));
    }

    #[test]
    fn find_accepts_iso_date_or_weekday() {
        let daily = group_by_day(&series(16), &Utc);

        let may_2 = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        assert_eq!(daily.find("2024-05-02"), Some(may_2));
        assert_eq!(daily.find("thursday"), Some(may_2));
        assert_eq!(daily.find("Thu"), Some(may_2));
        assert_eq!(daily.find("2024-06-01"), None);
        assert_eq!(daily.find("someday"), None);
    }

    #[test]
    fn day_options_use_weekday_labels() {
        let daily = group_by_day(&series(17), &Utc);
        let labels: Vec<_> = day_options(&daily).into_iter().map(|o| o.label).collect();
        assert_eq!(labels, ["Wednesday", "Thursday", "Friday"]);
    }

    #[test]
    fn build_composes_selectors() {
        let samples = series(12);
        let view = ViewModel::build(&samples, &Utc).unwrap();

        assert_eq!(view.current, samples[0]);
        assert_eq!(view.hourly, samples[1..4].to_vec());
        assert_eq!(view.daily.sample_count(), 12);
    }
}
