//! Text reports: CSV and descriptive
//!
//! Reports go to any writer, normally stdout; logging goes to stderr.

use crate::cluster::{Cluster, Crossing, DATE_FMT_ISO, Fix, SweepParams};
use crate::error::Result;
use crate::survey::Survey;
use crate::territory::Territory;
use crate::whodunit::{CLOSE_REPORTED, Candidate, Matches, Query};
use chrono::NaiveDateTime;
use clap::ValueEnum;
use csv::{Writer, WriterBuilder};
use std::io::Write;

/// Text output style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TextStyle {
    #[default]
    Csv,
    /// CSV, followed by every fix of every cluster
    CsvAll,
    Descriptive,
    /// Descriptive, listing every fix of every cluster
    DescriptiveAll,
}

impl TextStyle {
    pub fn is_csv(self) -> bool {
        matches!(self, TextStyle::Csv | TextStyle::CsvAll)
    }

    pub fn all_points(self) -> bool {
        matches!(self, TextStyle::CsvAll | TextStyle::DescriptiveAll)
    }
}

/// Settings echoed at the top of descriptive reports
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Legend {
    pub entries: Vec<(String, String)>,
}

impl Legend {
    pub fn with(mut self, name: &str, value: impl ToString) -> Self {
        self.entries.push((name.to_string(), value.to_string()));
        self
    }

    /// Radius and time cutoff, in meters and hours
    pub fn with_params(self, params: &SweepParams) -> Self {
        self.with("Radius", format!("{} meters", params.radius))
            .with("Time Cutoff", format!("{} hours", params.time_cutoff / 3600))
    }

    fn write<W: Write>(&self, out: &mut W, title: &str) -> Result<()> {
        writeln!(out, "\n{title} Settings Are As Follows:")?;
        for (name, value) in &self.entries {
            writeln!(out, "  * {name}: {value}")?;
        }
        Ok(())
    }
}

fn iso(datetime: &NaiveDateTime) -> String {
    datetime.format(DATE_FMT_ISO).to_string()
}

fn hours(seconds: i64) -> f64 {
    seconds as f64 / 3600.0
}

fn csv_writer<W: Write>(out: W) -> Writer<W> {
    WriterBuilder::new().flexible(true).from_writer(out)
}

fn fix_date(cluster: &Cluster, fixes: &[Fix], first: bool) -> String {
    let index = if first {
        cluster.home.first()
    } else {
        cluster.home.last()
    };
    index.map(|&i| iso(&fixes[i].datetime)).unwrap_or_default()
}

fn fix_record(parent_id: &str, fix: &Fix, with_animal: bool) -> Vec<String> {
    let mut record = vec![
        parent_id.to_string(),
        fix.id.clone(),
        iso(&fix.datetime),
        format!("{:.1}", fix.x),
        format!("{:.1}", fix.y),
        fix.membership.as_str().to_string(),
        fix.day_period.as_str().to_string(),
    ];
    if with_animal {
        record.insert(1, fix.animal_id.clone());
    }
    record
}

fn write_fix_listing<W: Write>(
    writer: &mut Writer<W>,
    groups: &[(&str, &Cluster)],
    fixes: &[Fix],
    with_animal: bool,
) -> Result<()> {
    let mut header = vec!["Cluster_ID", "Fix_ID", "Date", "X", "Y", "Status", "Day_Pd"];
    if with_animal {
        header[0] = "Cross_ID";
        header.insert(1, "Cat_ID");
    }
    let separator = vec![""; header.len()];

    writer.write_record(&separator)?;
    writer.write_record(&header)?;
    for (id, cluster) in groups {
        for fix in cluster.all_fixes(fixes) {
            writer.write_record(fix_record(id, fix, with_animal))?;
        }
        writer.write_record(&separator)?;
    }
    Ok(())
}

/// One summary row per cluster, optionally followed by every fix
pub fn write_clusters_csv<W: Write>(
    out: W,
    clusters: &[Cluster],
    fixes: &[Fix],
    all_points: bool,
) -> Result<()> {
    let mut writer = csv_writer(out);
    writer.write_record([
        "Cluster_ID", "Start_Date", "End_Date", "Elapsed", "Center_X", "Center_Y", "Home", "Away",
        "All", "Avg_Dist", "Max_Excurs", "Fidelity",
    ])?;

    for cluster in clusters {
        writer.write_record([
            cluster.id.clone(),
            fix_date(cluster, fixes, true),
            fix_date(cluster, fixes, false),
            format!("{:.2}", hours(cluster.elapsed())),
            format!("{:.1}", cluster.centroid.x),
            format!("{:.1}", cluster.centroid.y),
            cluster.home.len().to_string(),
            cluster.away.len().to_string(),
            cluster.all.len().to_string(),
            format!("{:.1}", cluster.stats.avg_distance),
            format!("{:.1}", cluster.stats.max_excursion),
            format!("{:.1}", cluster.stats.fidelity),
        ])?;
    }

    if all_points {
        let groups: Vec<(&str, &Cluster)> = clusters.iter().map(|c| (c.id.as_str(), c)).collect();
        write_fix_listing(&mut writer, &groups, fixes, false)?;
    }

    writer.flush()?;
    Ok(())
}

fn describe_cluster<W: Write>(
    out: &mut W,
    title: &str,
    cluster: &Cluster,
    fixes: &[Fix],
    all_points: bool,
) -> Result<()> {
    let stats = &cluster.stats;
    writeln!(out, "{title} {}", cluster.id)?;
    writeln!(
        out,
        "  Dates: From {} to {} (utc)",
        fix_date(cluster, fixes, true),
        fix_date(cluster, fixes, false)
    )?;
    writeln!(out, "  Elapsed Time: {:.2} hours", hours(cluster.elapsed()))?;
    writeln!(
        out,
        "  Center Location: {:.2} east, {:.2} north",
        cluster.centroid.x, cluster.centroid.y
    )?;
    writeln!(
        out,
        "  Points: {} in cluster, {} away from cluster, {} total",
        cluster.home.len(),
        cluster.away.len(),
        cluster.all.len()
    )?;
    writeln!(out, "  Home/Away Pattern (O = home, . = away): \"{}\"", stats.pattern)?;
    writeln!(
        out,
        "  Average Distance From Center (Inside Cluster): {:.1} meters",
        stats.avg_distance
    )?;
    if cluster.away.is_empty() {
        writeln!(out, "  Max Excursion From Center (Outside Cluster): None")?;
    } else {
        writeln!(
            out,
            "  Max Excursion From Center (Outside Cluster): {:.1} meters",
            stats.max_excursion
        )?;
    }
    writeln!(
        out,
        "  Site Fidelity ((No. Inside / Total No.) * 100): {:.2}%",
        stats.fidelity
    )?;
    if let Some(interval) = cluster.average_interval() {
        writeln!(out, "  Average Time Between Points: {:.1} hours", interval / 3600.0)?;
    }

    if all_points {
        writeln!(out, "  All Points In This Cluster:")?;
        let with_animal = cluster.animal_ids.len() > 1;
        for fix in cluster.all_fixes(fixes) {
            let animal = if with_animal {
                format!("{}, ", fix.animal_id)
            } else {
                String::new()
            };
            writeln!(
                out,
                "    {animal}{}, {}, {:.1}, {:.1}, {}",
                fix.id,
                iso(&fix.datetime),
                fix.x,
                fix.y,
                fix.membership.symbol()
            )?;
        }
    }
    writeln!(out)?;
    Ok(())
}

pub fn write_clusters_descriptive<W: Write>(
    mut out: W,
    legend: &Legend,
    clusters: &[Cluster],
    fixes: &[Fix],
    all_points: bool,
) -> Result<()> {
    legend.write(&mut out, "Cluster")?;
    writeln!(out, "\nClusters Found:\n")?;
    for cluster in clusters {
        describe_cluster(&mut out, "Cluster", cluster, fixes, all_points)?;
    }
    Ok(())
}

/// One summary row per crossing with its three closest meetings
pub fn write_crossings_csv<W: Write>(
    out: W,
    crossings: &[Crossing],
    fixes: &[Fix],
    all_points: bool,
) -> Result<()> {
    let mut writer = csv_writer(out);
    writer.write_record([
        "Cross_ID", "Start_Date", "End_Date", "Elapsed", "Center_X", "Center_Y", "No._Cats",
        "A_Time", "A_Dist", "B_Time", "B_Dist", "C_Time", "C_Dist",
    ])?;

    for crossing in crossings {
        let cluster = &crossing.cluster;
        let mut record = vec![
            crossing.id.clone(),
            fix_date(cluster, fixes, true),
            fix_date(cluster, fixes, false),
            format!("{:.2}", hours(cluster.elapsed())),
            format!("{:.1}", cluster.centroid.x),
            format!("{:.1}", cluster.centroid.y),
            crossing.animal_ids().len().to_string(),
        ];
        for slot in 0..crate::cluster::MEETINGS_KEPT {
            match crossing.closest_meetings.get(slot) {
                Some(meeting) => {
                    record.push(format!("{:.2}", hours(meeting.delay)));
                    record.push(format!("{:.2}", meeting.distance));
                }
                None => record.extend(["----".to_string(), "----".to_string()]),
            }
        }
        writer.write_record(&record)?;
    }

    if all_points {
        let groups: Vec<(&str, &Cluster)> = crossings
            .iter()
            .map(|c| (c.id.as_str(), &c.cluster))
            .collect();
        write_fix_listing(&mut writer, &groups, fixes, true)?;
    }

    writer.flush()?;
    Ok(())
}

pub fn write_crossings_descriptive<W: Write>(
    mut out: W,
    legend: &Legend,
    crossings: &[Crossing],
    fixes: &[Fix],
    all_points: bool,
) -> Result<()> {
    legend.write(&mut out, "Crossing")?;
    writeln!(out, "\nCrossings Found:\n")?;
    for crossing in crossings {
        writeln!(out, "Animals: {}", crossing.animal_ids().join(", "))?;
        for meeting in &crossing.closest_meetings {
            let (a, b) = (&fixes[meeting.first], &fixes[meeting.second]);
            writeln!(
                out,
                "  Closest Meeting: {} and {}, {:.2} hours and {:.1} meters apart",
                a.animal_id,
                b.animal_id,
                hours(meeting.delay),
                meeting.distance
            )?;
        }
        describe_cluster(&mut out, "Crossing", &crossing.cluster, fixes, all_points)?;
    }
    Ok(())
}

fn candidate_record(candidate: &Candidate<'_>) -> [String; 8] {
    [
        candidate.status.as_str().to_string(),
        candidate.fix.animal_id.clone(),
        iso(&candidate.fix.datetime),
        format!("{:.1}", candidate.fix.x),
        format!("{:.1}", candidate.fix.y),
        format!("{:.3}", candidate.closeness),
        format!("{:.1}", candidate.distance),
        format!("{:.1}", hours(candidate.delay)),
    ]
}

/// The request, every match, then the nearest misses
pub fn write_whodunit_csv<W: Write>(out: W, query: &Query, found: &Matches<'_>) -> Result<()> {
    let mut writer = csv_writer(out);
    writer.write_record([
        "Status", "Cat_ID", "Date", "East_N27", "North_N27", "Closeness", "Distance", "Delay",
    ])?;
    writer.write_record([
        "Request".to_string(),
        "----".to_string(),
        iso(&query.datetime),
        format!("{:.1}", query.location.x),
        format!("{:.1}", query.location.y),
        "----".to_string(),
        "----".to_string(),
        "----".to_string(),
    ])?;
    for candidate in found.matches.iter().chain(found.close.iter().take(CLOSE_REPORTED)) {
        writer.write_record(candidate_record(candidate))?;
    }
    writer.flush()?;
    Ok(())
}

fn describe_candidate<W: Write>(out: &mut W, candidate: &Candidate<'_>) -> Result<()> {
    writeln!(
        out,
        "    {}, {}, {:.1} east, {:.1} north, {:6.3}, {:6.1} m, {:6.1} h",
        candidate.fix.animal_id,
        iso(&candidate.fix.datetime),
        candidate.fix.x,
        candidate.fix.y,
        candidate.closeness,
        candidate.distance,
        hours(candidate.delay)
    )?;
    Ok(())
}

pub fn write_whodunit_descriptive<W: Write>(
    mut out: W,
    legend: &Legend,
    found: &Matches<'_>,
) -> Result<()> {
    legend.write(&mut out, "Whodunit")?;

    writeln!(out, "\nMatches Found:")?;
    for candidate in &found.matches {
        describe_candidate(&mut out, candidate)?;
    }
    writeln!(out, "\nNext Closest Points:")?;
    for candidate in found.close.iter().take(CLOSE_REPORTED) {
        describe_candidate(&mut out, candidate)?;
    }
    Ok(())
}

/// Perimeter vertices of every territory
pub fn write_territories_csv<W: Write>(out: W, territories: &[Territory]) -> Result<()> {
    let mut writer = csv_writer(out);
    writer.write_record(["Cat_ID", "Bin", "X", "Y", "Distance"])?;
    for territory in territories {
        for vertex in &territory.perimeter {
            writer.write_record([
                territory.animal_id.clone(),
                vertex.bin.to_string(),
                format!("{:.1}", vertex.location.x),
                format!("{:.1}", vertex.location.y),
                format!("{:.1}", vertex.distance),
            ])?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// One row per survey with its problems and best three matches
pub fn write_surveys_csv<W: Write>(out: W, surveys: &[Survey]) -> Result<()> {
    let mut writer = csv_writer(out);
    writer.write_record([
        "ID", "Avg_UTM_E", "Avg_UTM_N", "Avg_Date", "Major_Prob", "Minor_Prob", "Best_Match",
        "Secd_Match", "Thrd_Match",
    ])?;

    for survey in surveys {
        let (x, y) = survey
            .location
            .map(|p| (format!("{:.1}", p.x), format!("{:.1}", p.y)))
            .unwrap_or_default();
        let mut record = vec![
            survey.id.clone(),
            x,
            y,
            survey.datetime.as_ref().map(iso).unwrap_or_default(),
            survey.major_problems.join(" "),
            survey.minor_problems.join(" "),
        ];
        if survey.major_problems.is_empty() {
            for slot in 0..3 {
                record.push(
                    survey
                        .matches
                        .get(slot)
                        .map(|m| {
                            format!(
                                "{}|{}|{:.1}|{:.1}",
                                m.animal_id, m.cluster_id, m.centroid.x, m.centroid.y
                            )
                        })
                        .unwrap_or_default(),
                );
            }
        } else {
            record.push("Survey has major problems; matching is not possible.".to_string());
            record.extend([String::new(), String::new()]);
        }
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}
