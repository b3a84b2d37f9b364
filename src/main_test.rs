#[cfg(test)]
mod tests {
    use crate::{
        Args, ClustersArgs, Command, CrossingsArgs, TerritoriesArgs, WhodunitArgs, run_clusters,
        run_crossings, run_territories, run_whodunit,
    };
    use catamount::Error;
    use catamount::config::Settings;
    use catamount::report::TextStyle;
    use clap::Parser;
    use std::io::Write;
    use tempfile::NamedTempFile;

    // id, animal, collar, fix type, timestamp, dop, northing, easting
    const DATA: &str = "\
ID,CatID,Collar,Type,Date,DOP,North,East
1,F1,101,3D,2012-06-01 00:00:00,1.2,4000000,500000
2,F1,101,3D,2012-06-01 04:00:00,1.2,4000010,500010
3,F1,101,3D,2012-06-01 08:00:00,1.2,4005000,505000
4,F1,101,3D,2012-06-01 12:00:00,1.2,4000020,500000
5,M2,102,3D,2012-06-01 02:00:00,1.4,4000015,500005
6,M2,102,3D,2012-06-01 06:00:00,1.4,4000005,500015
7,F1,101,3D,2012-06-01 12:00:00,1.2,4000020,500000
";

    fn data_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(DATA.as_bytes()).expect("Failed to write data");
        file
    }

    fn settings_for(file: &NamedTempFile) -> Settings {
        let mut settings = Settings::default();
        settings.global.datafile_path = file.path().to_path_buf();
        settings
    }

    fn clusters_args(animal: &str) -> ClustersArgs {
        ClustersArgs {
            animal: animal.to_string(),
            radius: Some(100),
            time_cutoff: Some(24),
            minimum_count: None,
            minimum_stay: None,
            start_date: None,
            end_date: None,
            cluster_id: None,
            style: TextStyle::Csv,
        }
    }

    #[test]
    fn test_parse_clusters_command() {
        let args = Args::try_parse_from([
            "catamount",
            "-vv",
            "--datafile",
            "fixes.csv",
            "clusters",
            "--animal",
            "F1",
            "--radius",
            "150",
            "--style",
            "csv-all",
        ])
        .expect("Failed to parse args");

        assert_eq!(args.verbose, 2);
        assert_eq!(args.datafile.as_deref(), Some(std::path::Path::new("fixes.csv")));
        match args.command {
            Command::Clusters(cmd) => {
                assert_eq!(cmd.animal, "F1");
                assert_eq!(cmd.radius, Some(150));
                assert_eq!(cmd.time_cutoff, None);
                assert_eq!(cmd.style, TextStyle::CsvAll);
            }
            _ => panic!("expected the clusters command"),
        }
    }

    #[test]
    fn test_parse_animal_list() {
        let args = Args::try_parse_from(["catamount", "crossings", "--animals", "F1,M2,M3"])
            .expect("Failed to parse args");
        match args.command {
            Command::Crossings(cmd) => assert_eq!(cmd.animals, vec!["F1", "M2", "M3"]),
            _ => panic!("expected the crossings command"),
        }
    }

    #[test]
    fn test_clusters_require_animal() {
        assert!(Args::try_parse_from(["catamount", "clusters"]).is_err());
    }

    #[test]
    fn test_run_clusters() {
        let file = data_file();
        let settings = settings_for(&file);

        let mut out = Vec::new();
        run_clusters(&settings, clusters_args("F1"), &mut out).expect("clusters failed");
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].starts_with("Cluster_ID,Start_Date,End_Date"));
        assert_eq!(lines.len(), 2, "one cluster expected:\n{text}");
        // Fixes 1, 2 and 4 are home, fix 3 is away, duplicate fix 7 is dropped
        assert!(lines[1].starts_with("20120601-0000,2012-06-01 00:00:00,2012-06-01 12:00:00"));
        assert!(lines[1].contains(",3,1,4,"));
    }

    #[test]
    fn test_run_clusters_unknown_id() {
        let file = data_file();
        let settings = settings_for(&file);
        let mut cmd = clusters_args("F1");
        cmd.cluster_id = Some("19990101-0000".to_string());

        let result = run_clusters(&settings, cmd, Vec::new());
        assert!(matches!(result, Err(Error::UnknownId { kind: "cluster", .. })));
    }

    #[test]
    fn test_run_clusters_nothing_found() {
        let file = data_file();
        let settings = settings_for(&file);
        // F1 fixes are at least 14 m apart
        let mut cmd = clusters_args("F1");
        cmd.radius = Some(5);

        let result = run_clusters(&settings, cmd, Vec::new());
        assert!(matches!(result, Err(Error::NothingFound(_))));
    }

    #[test]
    fn test_run_clusters_count_filter() {
        let file = data_file();
        let settings = settings_for(&file);
        let mut cmd = clusters_args("F1");
        cmd.minimum_count = Some(4);

        let result = run_clusters(&settings, cmd, Vec::new());
        assert!(matches!(result, Err(Error::NothingFound(_))));
    }

    #[test]
    fn test_run_clusters_by_id_ignores_filters() {
        let file = data_file();
        let settings = settings_for(&file);
        // The only cluster has 3 home fixes
        let mut cmd = clusters_args("F1");
        cmd.minimum_count = Some(4);
        cmd.minimum_stay = Some(48);
        cmd.cluster_id = Some("20120601-0000".to_string());

        let mut out = Vec::new();
        run_clusters(&settings, cmd, &mut out).expect("cluster lookup failed");
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2, "{text}");
        assert!(lines[1].starts_with("20120601-0000,"));
        assert!(lines[1].contains(",3,1,4,"));
    }

    #[test]
    fn test_run_clusters_unknown_animal() {
        let file = data_file();
        let settings = settings_for(&file);

        let result = run_clusters(&settings, clusters_args("X9"), Vec::new());
        assert!(matches!(result, Err(Error::NoData(_))));
    }

    #[test]
    fn test_run_crossings() {
        let file = data_file();
        let settings = settings_for(&file);
        let cmd = CrossingsArgs {
            animals: Vec::new(),
            radius: Some(100),
            time_cutoff: Some(24),
            start_date: None,
            end_date: None,
            crossing_id: None,
            style: TextStyle::Csv,
        };

        let mut out = Vec::new();
        run_crossings(&settings, cmd, &mut out).expect("crossings failed");
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].starts_with("Cross_ID,"));
        assert_eq!(lines.len(), 2, "one crossing expected:\n{text}");
        assert!(lines[1].starts_with("20120601-0000-F1_M2,"));
    }

    #[test]
    fn test_run_crossings_single_animal() {
        let file = data_file();
        let settings = settings_for(&file);
        let cmd = CrossingsArgs {
            animals: vec!["F1".to_string()],
            radius: Some(100),
            time_cutoff: Some(24),
            start_date: None,
            end_date: None,
            crossing_id: None,
            style: TextStyle::Csv,
        };

        let result = run_crossings(&settings, cmd, Vec::new());
        assert!(matches!(result, Err(Error::NothingFound(_))));
    }

    #[test]
    fn test_run_whodunit() {
        let file = data_file();
        let settings = settings_for(&file);
        let cmd = WhodunitArgs {
            date: "2012-06-01 03:00".to_string(),
            x: 500000.0,
            y: 4000000.0,
            radius: Some(50),
            time_cutoff: Some(2),
            style: TextStyle::Csv,
        };

        let mut out = Vec::new();
        run_whodunit(&settings, cmd, &mut out).expect("whodunit failed");
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[1].starts_with("Request,"));
        // F1 at 04:00 and M2 at 02:00 are both an hour off; F1 is nearer
        assert!(lines[2].starts_with("Match,F1,2012-06-01 04:00:00"), "{text}");
        assert!(lines[3].starts_with("Match,M2,2012-06-01 02:00:00"), "{text}");
    }

    #[test]
    fn test_run_whodunit_far_away() {
        let file = data_file();
        let settings = settings_for(&file);
        let cmd = WhodunitArgs {
            date: "2012-06-01 03:00".to_string(),
            x: 600000.0,
            y: 5000000.0,
            radius: Some(50),
            time_cutoff: Some(2),
            style: TextStyle::Csv,
        };

        let result = run_whodunit(&settings, cmd, Vec::new());
        assert!(matches!(result, Err(Error::NoData(_))));
    }

    #[test]
    fn test_run_territories() {
        let file = data_file();
        let settings = settings_for(&file);
        let cmd = TerritoriesArgs {
            animals: vec!["F1".to_string()],
            resolution: Some(90),
            start_date: None,
            end_date: None,
        };

        let mut out = Vec::new();
        run_territories(&settings, cmd, &mut out).expect("territories failed");
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Cat_ID,Bin,X,Y,Distance");
        assert!(lines[1..].iter().all(|line| line.starts_with("F1,")));
    }
}
