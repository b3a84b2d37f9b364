#[cfg(test)]
mod tests {
    use crate::Error;
    use crate::cluster::{DateRange, DayPeriod, Fix, Point, Trail};
    use quickcheck::quickcheck;

    const T0: i64 = 1_338_508_800;

    fn ids(trail: &Trail) -> Vec<&str> {
        trail.fixes.iter().map(|f| f.id.as_str()).collect()
    }

    fn sample() -> Trail {
        Trail::new(vec![
            Fix::at("1", "F1", T0 + 300, 0.0, 0.0),
            Fix::at("2", "M2", T0 + 100, 100.0, 0.0),
            Fix::at("3", "F1", T0 + 100, 0.0, 50.0),
            Fix::at("4", "F1", T0 + 300, 10.0, 10.0),
            Fix::at("5", "M2", T0 + 200, 500.0, 500.0),
        ])
    }

    #[test]
    fn test_order_by_time_is_stable() {
        let mut trail = sample();
        trail.order_by_time();
        assert_eq!(ids(&trail), vec!["2", "3", "5", "1", "4"]);
    }

    #[test]
    fn test_remove_duplicates_keeps_first() {
        let mut trail = sample();
        trail.order_by_time();
        assert_eq!(trail.remove_duplicates(), 1);
        assert_eq!(ids(&trail), vec!["2", "3", "5", "1"]);

        // Same time, different animals are not duplicates
        assert_eq!(trail.remove_duplicates(), 0);
    }

    #[test]
    fn test_filter_by_date_is_inclusive() {
        let mut trail = sample();
        let removed = trail.filter_by_date(&DateRange::new(Some(T0 + 100), Some(T0 + 200)));
        assert_eq!(removed, 2);
        assert_eq!(ids(&trail), vec!["2", "3", "5"]);

        let mut trail = sample();
        trail.filter_by_date(&DateRange::new(None, Some(T0 + 100)));
        assert_eq!(ids(&trail), vec!["2", "3"]);

        let mut trail = sample();
        assert_eq!(trail.filter_by_date(&DateRange::default()), 0);
    }

    #[test]
    fn test_filter_by_location_is_inclusive() {
        let mut trail = sample();
        trail.filter_by_location(&Point::new(0.0, 0.0), 100.0);
        assert_eq!(ids(&trail), vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn test_select_animals() {
        let mut trail = sample();
        trail.select_animals(&[]);
        assert_eq!(trail.len(), 5);

        trail.select_animals(&["M2".to_string()]);
        assert_eq!(ids(&trail), vec!["2", "5"]);
        assert_eq!(trail.animal_ids(), vec!["M2"]);
    }

    #[test]
    fn test_prepare() {
        let mut trail = sample();
        trail.prepare(&DateRange::default()).unwrap();
        assert_eq!(ids(&trail), vec!["2", "3", "5", "1"]);

        let mut trail = sample();
        let result = trail.prepare(&DateRange::new(Some(T0 + 1000), None));
        assert!(matches!(result, Err(Error::NoData(_))));
    }

    #[test]
    fn test_split_by_animal() {
        let trails = sample().split_by_animal();
        assert_eq!(trails.keys().collect::<Vec<_>>(), vec!["F1", "M2"]);
        assert_eq!(ids(&trails["F1"]), vec!["3", "1"]);
        assert_eq!(ids(&trails["M2"]), vec!["2", "5"]);
    }

    #[test]
    fn test_bounds_and_animal_ids() {
        let trail = sample();
        let bounds = trail.bounds().unwrap();
        assert_eq!(bounds.min, Point::new(0.0, 0.0));
        assert_eq!(bounds.max, Point::new(500.0, 500.0));
        assert_eq!(trail.animal_ids(), vec!["F1", "M2"]);
        assert!(Trail::default().bounds().is_none());
    }

    #[test]
    fn test_tag_day_periods() {
        let mut trail = sample();
        trail.tag_day_periods(|fix| {
            if fix.time < T0 + 250 {
                DayPeriod::Night
            } else {
                DayPeriod::Day
            }
        });
        let periods: Vec<DayPeriod> = trail.fixes.iter().map(|f| f.day_period).collect();
        assert_eq!(
            periods,
            vec![
                DayPeriod::Day,
                DayPeriod::Night,
                DayPeriod::Night,
                DayPeriod::Day,
                DayPeriod::Night
            ]
        );
    }

    fn trail_from(raw: &[(u8, u8)]) -> Trail {
        Trail::new(
            raw.iter()
                .enumerate()
                .map(|(i, &(time, animal))| {
                    let animal = format!("A{}", animal % 3);
                    Fix::at(i.to_string(), animal, T0 + time as i64, i as f64, 0.0)
                })
                .collect(),
        )
    }

    quickcheck! {
        fn prop_order_twice_is_noop(raw: Vec<(u8, u8)>) -> bool {
            let mut once = trail_from(&raw);
            once.order_by_time();
            let mut twice = once.clone();
            twice.order_by_time();
            once == twice
        }

        fn prop_dedupe_is_idempotent(raw: Vec<(u8, u8)>) -> bool {
            let mut once = trail_from(&raw);
            once.order_by_time();
            once.remove_duplicates();
            let mut twice = once.clone();
            twice.remove_duplicates() == 0 && once == twice
        }
    }
}
