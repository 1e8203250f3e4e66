// libs/provider-cell/src/services/availability.rs
use chrono::{Local, NaiveDate, NaiveTime};
use tracing::debug;

use shared_config::AppConfig;

use crate::models::{BookedSlot, Provider, ProviderError, SlotGrid, SuggestedSlot};

/// Computes bookable dates and times for a provider from its weekly schedule.
///
/// Everything here is a pure function of the provider, the slot grid and the
/// held slots passed in; the resolver keeps no state between calls.
#[derive(Debug, Clone)]
pub struct AvailabilityResolver {
    grid: SlotGrid,
}

impl AvailabilityResolver {
    pub fn new(grid: SlotGrid) -> Self {
        Self { grid }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ProviderError> {
        Ok(Self::new(SlotGrid::from_config(config)?))
    }

    pub fn grid(&self) -> &SlotGrid {
        &self.grid
    }

    /// Operating days in `[today, today + window_days)`, in calendar order.
    pub fn available_dates(
        &self,
        provider: &Provider,
        today: NaiveDate,
        window_days: u32,
    ) -> Vec<NaiveDate> {
        let dates: Vec<NaiveDate> = today
            .iter_days()
            .take(window_days as usize)
            .filter(|date| provider.operates_on(*date))
            .collect();

        debug!(
            "Provider {} has {} operating days in the next {} days from {}",
            provider.id,
            dates.len(),
            window_days,
            today
        );

        dates
    }

    pub fn available_dates_from_today(&self, provider: &Provider, window_days: u32) -> Vec<NaiveDate> {
        self.available_dates(provider, Local::now().date_naive(), window_days)
    }

    /// Free grid times on `date` that fall inside the provider's hours.
    ///
    /// `held` may contain slots of other providers and other dates; only the
    /// ones matching this provider and date are considered.
    pub fn available_time_slots(
        &self,
        provider: &Provider,
        date: NaiveDate,
        held: &[BookedSlot],
    ) -> Vec<NaiveTime> {
        if !provider.operates_on(date) {
            debug!("Provider {} does not operate on {}", provider.id, date);
            return vec![];
        }

        let taken: Vec<NaiveTime> = held
            .iter()
            .filter(|slot| slot.provider_id == provider.id && slot.date == date)
            .map(|slot| slot.time)
            .collect();

        if let Some(limit) = provider.max_daily_bookings {
            if taken.len() >= limit as usize {
                debug!(
                    "Provider {} reached its daily limit of {} on {}",
                    provider.id, limit, date
                );
                return vec![];
            }
        }

        let slots: Vec<NaiveTime> = self
            .grid
            .slots()
            .iter()
            .copied()
            .filter(|time| provider.available_hours.contains(*time))
            .filter(|time| !taken.contains(time))
            .collect();

        debug!("Found {} available slots for provider {} on {}", slots.len(), provider.id, date);
        slots
    }

    /// Whether `time` on `date` is a slot the provider could ever offer,
    /// ignoring existing bookings.
    pub fn is_bookable(&self, provider: &Provider, date: NaiveDate, time: NaiveTime) -> bool {
        provider.operates_on(date)
            && self.grid.contains(time)
            && provider.available_hours.contains(time)
    }

    /// Earliest free slot at or after `from` (and after `after` on that first day).
    pub fn next_available(
        &self,
        provider: &Provider,
        from: NaiveDate,
        after: Option<NaiveTime>,
        window_days: u32,
        held: &[BookedSlot],
    ) -> Option<SuggestedSlot> {
        self.available_dates(provider, from, window_days)
            .into_iter()
            .find_map(|date| {
                self.available_time_slots(provider, date, held)
                    .into_iter()
                    .find(|time| date != from || after.map_or(true, |a| *time > a))
                    .map(|time| SuggestedSlot { date, time })
            })
    }

    /// Free slots to offer instead of `(date, time)`: same-day slots closest
    /// to the requested time first, then the earliest slots of later days.
    pub fn suggest_alternatives(
        &self,
        provider: &Provider,
        date: NaiveDate,
        time: NaiveTime,
        window_days: u32,
        held: &[BookedSlot],
        limit: usize,
    ) -> Vec<SuggestedSlot> {
        let mut same_day: Vec<NaiveTime> = self
            .available_time_slots(provider, date, held)
            .into_iter()
            .filter(|slot| *slot != time)
            .collect();
        same_day.sort_by_key(|slot| ((*slot - time).num_minutes().abs(), *slot));

        let mut suggestions: Vec<SuggestedSlot> = same_day
            .into_iter()
            .map(|slot| SuggestedSlot { date, time: slot })
            .take(limit)
            .collect();

        if suggestions.len() < limit {
            let later_days = self
                .available_dates(provider, date, window_days)
                .into_iter()
                .filter(|d| *d > date);

            for day in later_days {
                for slot in self.available_time_slots(provider, day, held) {
                    if suggestions.len() >= limit {
                        return suggestions;
                    }
                    suggestions.push(SuggestedSlot { date: day, time: slot });
                }
            }
        }

        suggestions
    }
}

impl Default for AvailabilityResolver {
    fn default() -> Self {
        Self::new(SlotGrid::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OperatingHours;
    use chrono::{Datelike, Weekday};
    use uuid::Uuid;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    // 2024-01-01 is a Monday.
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn mwf_doctor() -> Provider {
        Provider::doctor(
            "Dr. Herrera",
            "glaucoma",
            vec![Weekday::Mon, Weekday::Wed, Weekday::Fri],
            OperatingHours::new(t(8, 0), t(17, 0)).unwrap(),
        )
    }

    #[test]
    fn test_available_dates_for_one_week() {
        let resolver = AvailabilityResolver::default();
        let dates = resolver.available_dates(&mwf_doctor(), monday(), 7);

        let weekdays: Vec<Weekday> = dates.iter().map(|d| d.weekday()).collect();
        assert_eq!(weekdays, vec![Weekday::Mon, Weekday::Wed, Weekday::Fri]);
        assert_eq!(dates[0], monday());
    }

    #[test]
    fn test_available_dates_zero_window() {
        let resolver = AvailabilityResolver::default();
        assert!(resolver.available_dates(&mwf_doctor(), monday(), 0).is_empty());
    }

    #[test]
    fn test_booked_slot_is_removed() {
        let grid = SlotGrid::from_slots(vec![t(9, 0), t(9, 30), t(10, 0)]).unwrap();
        let resolver = AvailabilityResolver::new(grid);
        let doctor = mwf_doctor();
        let held = vec![BookedSlot::new(doctor.id, monday(), t(9, 30))];

        let slots = resolver.available_time_slots(&doctor, monday(), &held);
        assert_eq!(slots, vec![t(9, 0), t(10, 0)]);
    }

    #[test]
    fn test_bookings_elsewhere_do_not_block() {
        let grid = SlotGrid::from_slots(vec![t(9, 0), t(9, 30)]).unwrap();
        let resolver = AvailabilityResolver::new(grid);
        let doctor = mwf_doctor();
        let tuesday = monday().succ_opt().unwrap();
        let held = vec![
            BookedSlot::new(Uuid::new_v4(), monday(), t(9, 0)),
            BookedSlot::new(doctor.id, tuesday, t(9, 30)),
        ];

        assert_eq!(
            resolver.available_time_slots(&doctor, monday(), &held),
            vec![t(9, 0), t(9, 30)]
        );
    }

    #[test]
    fn test_slots_respect_hours_structurally() {
        let doctor = Provider::doctor(
            "Dra. Vidal",
            "cornea",
            vec![Weekday::Mon],
            OperatingHours::new(t(9, 0), t(10, 0)).unwrap(),
        );
        let resolver = AvailabilityResolver::default();

        let slots = resolver.available_time_slots(&doctor, monday(), &[]);
        assert_eq!(slots, vec![t(9, 0), t(9, 30), t(10, 0)]);
    }

    #[test]
    fn test_non_operating_day_is_empty() {
        let resolver = AvailabilityResolver::default();
        let tuesday = monday().succ_opt().unwrap();
        assert!(resolver.available_time_slots(&mwf_doctor(), tuesday, &[]).is_empty());
    }

    #[test]
    fn test_daily_limit_closes_the_day() {
        let doctor = mwf_doctor().with_max_daily_bookings(2);
        let resolver = AvailabilityResolver::default();
        let held = vec![
            BookedSlot::new(doctor.id, monday(), t(8, 0)),
            BookedSlot::new(doctor.id, monday(), t(8, 30)),
        ];

        assert!(resolver.available_time_slots(&doctor, monday(), &held).is_empty());
        assert!(!resolver.available_time_slots(&doctor, monday(), &held[..1]).is_empty());
    }

    #[test]
    fn test_is_bookable() {
        let resolver = AvailabilityResolver::default();
        let doctor = mwf_doctor();
        assert!(resolver.is_bookable(&doctor, monday(), t(9, 30)));
        assert!(!resolver.is_bookable(&doctor, monday(), t(9, 15)));
        assert!(!resolver.is_bookable(&doctor, monday(), t(18, 0)));
        assert!(!resolver.is_bookable(&doctor, monday().succ_opt().unwrap(), t(9, 30)));
    }

    #[test]
    fn test_next_available_skips_to_next_operating_day() {
        let doctor = Provider::doctor(
            "Dr. Soler",
            "retina",
            vec![Weekday::Mon, Weekday::Wed],
            OperatingHours::new(t(9, 0), t(9, 30)).unwrap(),
        );
        let resolver = AvailabilityResolver::default();
        let held = vec![
            BookedSlot::new(doctor.id, monday(), t(9, 0)),
            BookedSlot::new(doctor.id, monday(), t(9, 30)),
        ];

        let next = resolver.next_available(&doctor, monday(), None, 7, &held).unwrap();
        assert_eq!(next.date.weekday(), Weekday::Wed);
        assert_eq!(next.time, t(9, 0));
    }

    #[test]
    fn test_next_available_after_time() {
        let resolver = AvailabilityResolver::default();
        let next = resolver
            .next_available(&mwf_doctor(), monday(), Some(t(16, 30)), 7, &[])
            .unwrap();
        assert_eq!(next.date, monday());
        assert_eq!(next.time, t(17, 0));
    }

    #[test]
    fn test_alternatives_prefer_nearest_same_day() {
        let grid = SlotGrid::from_slots(vec![t(9, 0), t(9, 30), t(10, 0), t(11, 0)]).unwrap();
        let resolver = AvailabilityResolver::new(grid);
        let doctor = mwf_doctor();
        let held = vec![BookedSlot::new(doctor.id, monday(), t(9, 30))];

        let suggestions = resolver.suggest_alternatives(&doctor, monday(), t(9, 30), 7, &held, 3);
        let times: Vec<NaiveTime> = suggestions.iter().map(|s| s.time).collect();
        assert_eq!(times, vec![t(9, 0), t(10, 0), t(11, 0)]);
        assert!(suggestions.iter().all(|s| s.date == monday()));
    }

    #[test]
    fn test_alternatives_spill_into_later_days() {
        let grid = SlotGrid::from_slots(vec![t(9, 0), t(9, 30)]).unwrap();
        let resolver = AvailabilityResolver::new(grid);
        let doctor = mwf_doctor();
        let held = vec![
            BookedSlot::new(doctor.id, monday(), t(9, 0)),
            BookedSlot::new(doctor.id, monday(), t(9, 30)),
        ];

        let suggestions = resolver.suggest_alternatives(&doctor, monday(), t(9, 0), 7, &held, 3);
        assert_eq!(suggestions.len(), 3);
        assert_eq!(suggestions[0].date.weekday(), Weekday::Wed);
        assert_eq!(suggestions[1].date.weekday(), Weekday::Wed);
        assert_eq!(suggestions[2].date.weekday(), Weekday::Fri);
    }
}
