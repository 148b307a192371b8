use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Controls what scale the timeline displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimelineScale {
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

/// The visible span of the timeline and the calendar days composing it.
///
/// All downstream pixel math treats one day as one column of a
/// caller-supplied width, so the window itself carries no zoom state.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeWindow {
    /// The leftmost visible date.
    pub start: NaiveDate,
    /// The rightmost visible date (inclusive).
    pub end: NaiveDate,
    pub scale: TimelineScale,
    /// Every calendar day in `[start, end]`, in order.
    pub units: Vec<NaiveDate>,
}

impl TimeWindow {
    /// Resolve the visible window around `anchor` for the given scale.
    ///
    /// Coarser scales align their edges to the unit boundary (week, month,
    /// quarter, year) so header cells never start mid-unit. Always returns
    /// a non-empty window.
    pub fn resolve(anchor: NaiveDate, scale: TimelineScale) -> Self {
        let (start, end) = match scale {
            TimelineScale::Day => (anchor - Duration::days(10), anchor + Duration::days(20)),
            TimelineScale::Week => (
                week_start(anchor - Duration::days(30)),
                week_end(anchor + Duration::days(60)),
            ),
            TimelineScale::Month => (
                month_start(sub_months(anchor, 2)),
                month_end(add_months(anchor, 4)),
            ),
            TimelineScale::Quarter => (
                quarter_start(sub_months(anchor, 6)),
                quarter_end(add_months(anchor, 12)),
            ),
            TimelineScale::Year => (
                year_start(sub_months(anchor, 12)),
                year_end(add_months(anchor, 24)),
            ),
        };

        let mut units = Vec::with_capacity(((end - start).num_days() + 1) as usize);
        let mut day = start;
        while day <= end {
            units.push(day);
            day += Duration::days(1);
        }

        Self {
            start,
            end,
            scale,
            units,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Convert a date to an x-pixel offset from the window start.
    pub fn date_to_x(&self, date: NaiveDate, column_width: f32) -> f32 {
        let days = (date - self.start).num_days() as f32;
        days * column_width
    }

    /// Convert an x-pixel offset back to a date.
    pub fn x_to_date(&self, x: f32, column_width: f32) -> NaiveDate {
        let days = (x / column_width).round() as i64;
        self.start + Duration::days(days)
    }

    /// Total width in pixels, including the last day's column.
    pub fn total_width(&self, column_width: f32) -> f32 {
        self.units.len() as f32 * column_width
    }
}

fn week_start(date: NaiveDate) -> NaiveDate {
    let weekday = date.weekday().num_days_from_monday();
    date - Duration::days(weekday as i64)
}

fn week_end(date: NaiveDate) -> NaiveDate {
    week_start(date) + Duration::days(6)
}

fn month_start(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

fn month_end(date: NaiveDate) -> NaiveDate {
    add_months(month_start(date), 1) - Duration::days(1)
}

fn quarter_start(date: NaiveDate) -> NaiveDate {
    let month = ((date.month() - 1) / 3) * 3 + 1;
    NaiveDate::from_ymd_opt(date.year(), month, 1).unwrap_or(date)
}

fn quarter_end(date: NaiveDate) -> NaiveDate {
    add_months(quarter_start(date), 3) - Duration::days(1)
}

fn year_start(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date)
}

fn year_end(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap_or(date)
}

fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months))
        .unwrap_or(date + Duration::days(30 * months as i64))
}

fn sub_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(months))
        .unwrap_or(date - Duration::days(30 * months as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_day_window_spans_anchor() {
        let anchor = date(2026, 6, 15);
        let w = TimeWindow::resolve(anchor, TimelineScale::Day);
        assert_eq!(w.start, date(2026, 6, 5));
        assert_eq!(w.end, date(2026, 7, 5));
        assert_eq!(w.units.len(), 31);
        assert_eq!(w.units.first(), Some(&w.start));
        assert_eq!(w.units.last(), Some(&w.end));
    }

    #[test]
    fn test_week_window_is_week_aligned() {
        let w = TimeWindow::resolve(date(2026, 6, 15), TimelineScale::Week);
        assert_eq!(w.start.weekday(), Weekday::Mon);
        assert_eq!(w.end.weekday(), Weekday::Sun);
        assert!(w.start <= date(2026, 6, 15) - Duration::days(30));
        assert!(w.end >= date(2026, 6, 15) + Duration::days(60));
    }

    #[test]
    fn test_month_window_is_month_aligned() {
        let w = TimeWindow::resolve(date(2026, 6, 15), TimelineScale::Month);
        assert_eq!(w.start, date(2026, 4, 1));
        assert_eq!(w.end, date(2026, 10, 31));
    }

    #[test]
    fn test_quarter_window_is_quarter_aligned() {
        let w = TimeWindow::resolve(date(2026, 6, 15), TimelineScale::Quarter);
        // 6 months back lands in 2025-12-15, whose quarter starts in October
        assert_eq!(w.start, date(2025, 10, 1));
        // 12 months forward lands in 2027-06, Q2 ending in June
        assert_eq!(w.end, date(2027, 6, 30));
    }

    #[test]
    fn test_year_window_is_year_aligned() {
        let w = TimeWindow::resolve(date(2026, 6, 15), TimelineScale::Year);
        assert_eq!(w.start, date(2025, 1, 1));
        assert_eq!(w.end, date(2028, 12, 31));
    }

    #[test]
    fn test_pixel_roundtrip() {
        let w = TimeWindow::resolve(date(2026, 6, 15), TimelineScale::Day);
        let cw = 24.0;
        let d = date(2026, 6, 20);
        assert_eq!(w.date_to_x(d, cw), 15.0 * 24.0);
        assert_eq!(w.x_to_date(w.date_to_x(d, cw), cw), d);
        assert_eq!(w.total_width(cw), 31.0 * 24.0);
    }

    #[test]
    fn test_month_rollover_across_year_end() {
        let w = TimeWindow::resolve(date(2026, 1, 10), TimelineScale::Month);
        assert_eq!(w.start, date(2025, 11, 1));
        assert_eq!(w.end, date(2026, 5, 31));
    }
}
