use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    #[error("work calendar requires at least one working day")]
    NoWorkingDays,
    #[error("{days} working days from {from} falls outside the supported date range")]
    DateOutOfRange { from: NaiveDate, days: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Holiday {
    pub date: NaiveDate,
    pub name: String,
}

impl Holiday {
    pub fn new(date: NaiveDate, name: impl Into<String>) -> Self {
        Self {
            date,
            name: name.into(),
        }
    }
}

/// Working weekdays plus named holidays; used to turn day offsets into dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkCalendar {
    holidays: BTreeMap<NaiveDate, String>,
    non_working_days: HashSet<Weekday>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkCalendarConfig {
    working_days: Vec<Weekday>,
    holidays: Vec<Holiday>,
}

impl Default for WorkCalendar {
    fn default() -> Self {
        Self::with_year_range(2025, 2025)
    }
}

impl WorkCalendar {
    const ALL_WEEKDAYS: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    /// Monday to Friday with US federal holidays for every year in the range.
    pub fn with_year_range(start_year: i32, end_year: i32) -> Self {
        let (start, end) = if start_year <= end_year {
            (start_year, end_year)
        } else {
            (end_year, start_year)
        };

        let mut calendar = Self {
            holidays: BTreeMap::new(),
            non_working_days: HashSet::from([Weekday::Sat, Weekday::Sun]),
        };
        for year in start..=end {
            calendar.add_us_holidays(year);
        }
        calendar
    }

    /// Every day is a working day; offsets map one-to-one onto dates.
    pub fn continuous() -> Self {
        Self {
            holidays: BTreeMap::new(),
            non_working_days: HashSet::new(),
        }
    }

    pub fn custom<I, J>(working_days: I, holidays: J) -> Result<Self, CalendarError>
    where
        I: IntoIterator<Item = Weekday>,
        J: IntoIterator<Item = Holiday>,
    {
        let config = WorkCalendarConfig::new(working_days, holidays)?;
        Self::from_config(&config)
    }

    pub fn from_config(config: &WorkCalendarConfig) -> Result<Self, CalendarError> {
        let working_set: HashSet<Weekday> = config.working_days.iter().copied().collect();
        if working_set.is_empty() {
            return Err(CalendarError::NoWorkingDays);
        }
        let non_working_days = Self::ALL_WEEKDAYS
            .into_iter()
            .filter(|day| !working_set.contains(day))
            .collect();
        let holidays = config
            .holidays
            .iter()
            .map(|holiday| (holiday.date, holiday.name.clone()))
            .collect();
        Ok(Self {
            holidays,
            non_working_days,
        })
    }

    pub fn to_config(&self) -> WorkCalendarConfig {
        WorkCalendarConfig::from(self)
    }

    fn add_us_holidays(&mut self, year: i32) {
        let fixed = [
            (1, 1, "New Year's Day"),
            (7, 4, "Independence Day"),
            (11, 11, "Veterans Day"),
            (12, 25, "Christmas Day"),
        ];
        for (month, day, name) in fixed {
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                self.holidays.insert(date, name.to_string());
            }
        }

        let floating = [
            (1, Weekday::Mon, 3, "Martin Luther King Jr. Day"),
            (2, Weekday::Mon, 3, "Presidents' Day"),
            (9, Weekday::Mon, 1, "Labor Day"),
            (10, Weekday::Mon, 2, "Columbus Day"),
            (11, Weekday::Thu, 4, "Thanksgiving Day"),
        ];
        for (month, weekday, n, name) in floating {
            if let Some(date) = NaiveDate::from_weekday_of_month_opt(year, month, weekday, n) {
                self.holidays.insert(date, name.to_string());
            }
        }

        if let Some(date) = Self::last_weekday(year, 5, Weekday::Mon) {
            self.holidays.insert(date, "Memorial Day".to_string());
        }
    }

    fn last_weekday(year: i32, month: u32, weekday: Weekday) -> Option<NaiveDate> {
        let first_of_next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };
        let mut date = first_of_next.pred_opt()?;
        while date.weekday() != weekday {
            date = date.pred_opt()?;
        }
        Some(date)
    }

    pub fn add_holiday(&mut self, date: NaiveDate, name: impl Into<String>) {
        self.holidays.insert(date, name.into());
    }

    pub fn remove_holiday(&mut self, date: NaiveDate) -> bool {
        self.holidays.remove(&date).is_some()
    }

    /// Same month/day every year in the range, e.g. Dec 24 for 2025-2030.
    pub fn add_recurring_holiday(
        &mut self,
        month: u32,
        day: u32,
        name: &str,
        start_year: i32,
        end_year: i32,
    ) {
        for year in start_year..=end_year {
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                self.holidays.insert(date, name.to_string());
            }
        }
    }

    pub fn holiday_name(&self, date: NaiveDate) -> Option<&str> {
        self.holidays.get(&date).map(String::as_str)
    }

    pub fn holidays_in_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<Holiday> {
        if end < start {
            return Vec::new();
        }
        self.holidays
            .range(start..=end)
            .map(|(date, name)| Holiday::new(*date, name.clone()))
            .collect()
    }

    /// e.g. Mon-Sat for six-day crews.
    pub fn set_working_days(&mut self, days: &[Weekday]) -> Result<(), CalendarError> {
        if days.is_empty() {
            return Err(CalendarError::NoWorkingDays);
        }
        self.non_working_days = Self::ALL_WEEKDAYS
            .into_iter()
            .filter(|day| !days.contains(day))
            .collect();
        Ok(())
    }

    pub fn is_available(&self, date: NaiveDate) -> bool {
        !self.holidays.contains_key(&date) && !self.non_working_days.contains(&date.weekday())
    }

    pub fn first_available_on_or_after(&self, from: NaiveDate) -> Option<NaiveDate> {
        if self.is_available(from) {
            Some(from)
        } else {
            self.next_available(from)
        }
    }

    /// Next available date strictly after `from`; `None` past the last
    /// representable date.
    pub fn next_available(&self, from: NaiveDate) -> Option<NaiveDate> {
        let mut current = from.checked_add_days(Days::new(1))?;
        while !self.is_available(current) {
            current = current.checked_add_days(Days::new(1))?;
        }
        Some(current)
    }

    /// The date `days_ahead` available days after `from`.
    pub fn find_next_available(
        &self,
        from: NaiveDate,
        days_ahead: i64,
    ) -> Result<NaiveDate, CalendarError> {
        let out_of_range = CalendarError::DateOutOfRange {
            from,
            days: days_ahead,
        };
        // Every available day uses up at least one calendar day.
        if (NaiveDate::MAX - from).num_days() < days_ahead {
            return Err(out_of_range);
        }
        let mut current = from;
        let mut count = 0;
        while count < days_ahead {
            current = current
                .checked_add_days(Days::new(1))
                .ok_or_else(|| out_of_range.clone())?;
            if self.is_available(current) {
                count += 1;
            }
        }
        Ok(current)
    }

    pub fn prev_available(&self, from: NaiveDate) -> Option<NaiveDate> {
        let mut current = from.checked_sub_days(Days::new(1))?;
        while !self.is_available(current) {
            current = current.checked_sub_days(Days::new(1))?;
        }
        Some(current)
    }

    pub fn find_prev_available(
        &self,
        from: NaiveDate,
        days_back: i64,
    ) -> Result<NaiveDate, CalendarError> {
        let out_of_range = CalendarError::DateOutOfRange {
            from,
            days: -days_back,
        };
        if (from - NaiveDate::MIN).num_days() < days_back {
            return Err(out_of_range);
        }
        let mut current = from;
        let mut count = 0;
        while count < days_back {
            current = current
                .checked_sub_days(Days::new(1))
                .ok_or_else(|| out_of_range.clone())?;
            if self.is_available(current) {
                count += 1;
            }
        }
        Ok(current)
    }

    /// Inclusive count of available days in `start..=end`.
    pub fn count_available_days(&self, start: NaiveDate, end: NaiveDate) -> i64 {
        start
            .iter_days()
            .take_while(|date| *date <= end)
            .filter(|date| self.is_available(*date))
            .count() as i64
    }
}

impl WorkCalendarConfig {
    pub fn new<I, J>(working_days: I, holidays: J) -> Result<Self, CalendarError>
    where
        I: IntoIterator<Item = Weekday>,
        J: IntoIterator<Item = Holiday>,
    {
        let mut working: Vec<Weekday> = working_days.into_iter().collect();
        if working.is_empty() {
            return Err(CalendarError::NoWorkingDays);
        }
        working.sort_by_key(|wd| wd.num_days_from_monday());
        working.dedup();

        let mut holidays: Vec<Holiday> = holidays.into_iter().collect();
        holidays.sort();
        holidays.dedup_by_key(|holiday| holiday.date);

        Ok(Self {
            working_days: working,
            holidays,
        })
    }

    pub fn working_days(&self) -> &[Weekday] {
        &self.working_days
    }

    pub fn holidays(&self) -> &[Holiday] {
        &self.holidays
    }
}

impl Default for WorkCalendarConfig {
    fn default() -> Self {
        WorkCalendarConfig::from(&WorkCalendar::default())
    }
}

impl From<&WorkCalendar> for WorkCalendarConfig {
    fn from(calendar: &WorkCalendar) -> Self {
        let working_days = WorkCalendar::ALL_WEEKDAYS
            .into_iter()
            .filter(|day| !calendar.non_working_days.contains(day))
            .collect();
        let holidays = calendar
            .holidays
            .iter()
            .map(|(date, name)| Holiday::new(*date, name.clone()))
            .collect();
        Self {
            working_days,
            holidays,
        }
    }
}
