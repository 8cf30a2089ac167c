// src/services/calendar.rs

use std::{fmt, str::FromStr};

use chrono::{Datelike, Days, NaiveDate, Weekday};

use crate::models::dashboard::WeekRange;

/// Como as semanas de um mês são recortadas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WeekConvention {
    /// Blocos de 7 dias a partir do dia 1; só o último pode ser menor.
    #[default]
    Rolling,
    /// Semanas de calendário que começam no dia informado, cortadas no mês.
    StartsOn(Weekday),
}

impl FromStr for WeekConvention {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("rolling") {
            return Ok(WeekConvention::Rolling);
        }
        value
            .parse::<Weekday>()
            .map(WeekConvention::StartsOn)
            .map_err(|_| format!("convenção de semana desconhecida: '{value}'"))
    }
}

impl fmt::Display for WeekConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeekConvention::Rolling => write!(f, "rolling"),
            WeekConvention::StartsOn(day) => write!(f, "starts on {day}"),
        }
    }
}

/// "April 2024" para uma data qualquer.
pub fn month_label(date: NaiveDate) -> String {
    date.format("%B %Y").to_string()
}

/// Primeiro dia do mês de um rótulo "Month Year".
pub fn first_day_of_month(label: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("1 {}", label.trim()), "%d %B %Y").ok()
}

pub fn last_day_of_month(first: NaiveDate) -> NaiveDate {
    let (year, month) = if first.month() == 12 {
        (first.year() + 1, 1)
    } else {
        (first.year(), first.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|next| next.pred_opt())
        .unwrap_or(first)
}

/// Chave de ordenação cronológica para um rótulo "Month Year".
pub fn month_sort_key(label: &str) -> Option<(i32, u32)> {
    first_day_of_month(label).map(|d| (d.year(), d.month()))
}

/// Recorta o mês em semanas contíguas, sem buracos nem sobreposição.
/// Rótulos inválidos produzem uma lista vazia.
pub fn week_ranges(label: &str, convention: WeekConvention) -> Vec<WeekRange> {
    let Some(first) = first_day_of_month(label) else {
        return Vec::new();
    };
    let last = last_day_of_month(first);

    let mut ranges = Vec::new();
    let mut start = first;
    loop {
        let span = match convention {
            WeekConvention::Rolling => 6,
            WeekConvention::StartsOn(week_start) => days_until_week_end(start.weekday(), week_start),
        };
        let end = start
            .checked_add_days(Days::new(span))
            .map_or(last, |end| end.min(last));

        ranges.push(WeekRange { start, end });

        match end.succ_opt() {
            Some(next) if next <= last => start = next,
            _ => break,
        }
    }
    ranges
}

// Quantos dias faltam, a partir de `day`, até o último dia da semana.
fn days_until_week_end(day: Weekday, week_start: Weekday) -> u64 {
    let week_end = week_start.pred();
    let diff = week_end.num_days_from_monday() as i64 - day.num_days_from_monday() as i64;
    diff.rem_euclid(7) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn assert_covers_month(ranges: &[WeekRange], first: NaiveDate, last: NaiveDate) {
        assert!(!ranges.is_empty());
        assert_eq!(ranges[0].start, first);
        assert_eq!(ranges.last().unwrap().end, last);
        for pair in ranges.windows(2) {
            assert_eq!(pair[0].end.succ_opt().unwrap(), pair[1].start);
        }
        for range in ranges {
            assert!(range.start <= range.end);
            assert!(range.end <= last);
        }
    }

    #[test]
    fn rolling_weeks_for_april_2024() {
        let ranges = week_ranges("April 2024", WeekConvention::Rolling);
        assert_eq!(ranges.len(), 5);
        assert_eq!(ranges[0], WeekRange { start: date(2024, 4, 1), end: date(2024, 4, 7) });
        assert_eq!(ranges[4], WeekRange { start: date(2024, 4, 29), end: date(2024, 4, 30) });
        assert_covers_month(&ranges, date(2024, 4, 1), date(2024, 4, 30));
    }

    #[test]
    fn rolling_february_in_a_common_year_is_exactly_four_weeks() {
        let ranges = week_ranges("February 2023", WeekConvention::Rolling);
        assert_eq!(ranges.len(), 4);
        assert!(ranges.iter().all(|r| (r.end - r.start).num_days() == 6));
    }

    #[test]
    fn sunday_aligned_weeks_clamp_to_month() {
        // 1 de setembro de 2024 é domingo; 30 é segunda.
        let ranges = week_ranges("September 2024", WeekConvention::StartsOn(Weekday::Sun));
        assert_eq!(ranges[0], WeekRange { start: date(2024, 9, 1), end: date(2024, 9, 7) });
        assert_eq!(ranges.last().unwrap(), &WeekRange { start: date(2024, 9, 29), end: date(2024, 9, 30) });
        assert_covers_month(&ranges, date(2024, 9, 1), date(2024, 9, 30));
    }

    #[test]
    fn monday_aligned_weeks_start_short_when_month_starts_midweek() {
        // 1 de maio de 2024 é quarta.
        let ranges = week_ranges("May 2024", WeekConvention::StartsOn(Weekday::Mon));
        assert_eq!(ranges[0], WeekRange { start: date(2024, 5, 1), end: date(2024, 5, 5) });
        assert_eq!(ranges[1].start.weekday(), Weekday::Mon);
        assert_covers_month(&ranges, date(2024, 5, 1), date(2024, 5, 31));
    }

    #[test]
    fn every_month_of_a_year_is_covered() {
        for convention in [
            WeekConvention::Rolling,
            WeekConvention::StartsOn(Weekday::Mon),
            WeekConvention::StartsOn(Weekday::Sun),
        ] {
            for month in 1..=12 {
                let first = date(2024, month, 1);
                let ranges = week_ranges(&month_label(first), convention);
                assert_covers_month(&ranges, first, last_day_of_month(first));
            }
        }
    }

    #[test]
    fn invalid_label_yields_no_weeks() {
        assert!(week_ranges("Unknown Unknown", WeekConvention::Rolling).is_empty());
        assert!(week_ranges("", WeekConvention::Rolling).is_empty());
    }

    #[test]
    fn parses_conventions() {
        assert_eq!("rolling".parse::<WeekConvention>().unwrap(), WeekConvention::Rolling);
        assert_eq!("Monday".parse::<WeekConvention>().unwrap(), WeekConvention::StartsOn(Weekday::Mon));
        assert_eq!("sun".parse::<WeekConvention>().unwrap(), WeekConvention::StartsOn(Weekday::Sun));
        assert!("fortnight".parse::<WeekConvention>().is_err());
    }

    #[test]
    fn month_keys_sort_chronologically() {
        assert!(month_sort_key("December 2023") < month_sort_key("January 2024"));
        assert!(month_sort_key("February 2024") < month_sort_key("April 2024"));
        assert_eq!(month_sort_key("Unknown Unknown"), None);
    }
}
