#[cfg(test)]
mod tests {
    use crate::Error;
    use crate::cluster::{Fix, Point, SweepParams, Trail};
    use crate::whodunit::{MatchStatus, Query, find_matches, prefilter};
    use chrono::DateTime;

    const T0: i64 = 1_338_508_800;
    const HOUR: i64 = 3600;

    fn query() -> Query {
        Query {
            datetime: DateTime::from_timestamp(T0, 0).unwrap().naive_utc(),
            location: Point::new(500_000.0, 4_000_000.0),
            params: SweepParams {
                radius: 100.0,
                time_cutoff: 2 * HOUR,
            },
        }
    }

    fn pool() -> Trail {
        Trail::new(vec![
            // Match: 50 m and 1 hour off
            Fix::at("1", "F1", T0 + HOUR, 500_050.0, 4_000_000.0),
            // Match: 10 m and 30 minutes off, closest
            Fix::at("2", "M2", T0 - HOUR / 2, 500_000.0, 4_000_010.0),
            // Close: too late
            Fix::at("3", "F3", T0 + 5 * HOUR, 500_000.0, 4_000_000.0),
            // Close: too far
            Fix::at("4", "M4", T0, 500_300.0, 4_000_000.0),
            // Outside the 5 x radius prefilter
            Fix::at("5", "F1", T0, 501_000.0, 4_000_000.0),
            // Outside the 5 x time cutoff prefilter
            Fix::at("6", "M2", T0 - 11 * HOUR, 500_000.0, 4_000_000.0),
            // Duplicate of fix 1
            Fix::at("7", "F1", T0 + HOUR, 500_050.0, 4_000_000.0),
        ])
    }

    #[test]
    fn test_prefilter() {
        let mut trail = pool();
        prefilter(&mut trail, &query()).unwrap();
        let ids: Vec<&str> = trail.fixes.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "4", "1", "3"]);
    }

    #[test]
    fn test_prefilter_empty_pool() {
        let mut far_off = query();
        far_off.location = Point::new(600_000.0, 4_000_000.0);
        assert!(matches!(
            prefilter(&mut pool(), &far_off),
            Err(Error::NoData(_))
        ));

        let mut too_early = query();
        too_early.datetime = DateTime::from_timestamp(T0 - 1000 * HOUR, 0)
            .unwrap()
            .naive_utc();
        assert!(matches!(
            prefilter(&mut pool(), &too_early),
            Err(Error::NoData(_))
        ));
    }

    #[test]
    fn test_find_matches_sorted_by_closeness() {
        let mut trail = pool();
        let query = query();
        prefilter(&mut trail, &query).unwrap();
        let found = find_matches(&trail.fixes, &query);

        let matches: Vec<&str> = found.matches.iter().map(|c| c.fix.id.as_str()).collect();
        assert_eq!(matches, vec!["2", "1"]);
        assert!(found.matches.iter().all(|c| c.status == MatchStatus::Match));
        assert_eq!(found.matches[0].delay, HOUR / 2);
        assert!((found.matches[0].closeness - 0.35).abs() < 1e-9);
        assert!((found.matches[1].closeness - 1.0).abs() < 1e-9);

        // M4: 3.0 + 0.0, F3: 0.0 + 2.5
        let close: Vec<&str> = found.close.iter().map(|c| c.fix.id.as_str()).collect();
        assert_eq!(close, vec!["3", "4"]);
        assert!(found.close.iter().all(|c| c.status == MatchStatus::Close));
    }
}
