//! Catamount command line tool
//!
//! Reads GPS collar fixes from CSV and reports clusters, crossings,
//! whodunit matches, territories or survey matches on stdout. Logging goes
//! to stderr.

use catamount::cluster::{
    Cluster, Crossing, Trail, cluster_by_id, crossing_by_id, filter_by_count, filter_by_stay,
};
use catamount::config::{
    ClusterConfig, CrossingConfig, MatchSurveyConfig, Settings, TerritoryConfig, WhodunitConfig,
};
use catamount::ingest::{parse_date_argument, read_fixes};
use catamount::report::{self, Legend, TextStyle};
use catamount::survey::{self, SurveyColumns};
use catamount::territory::territories;
use catamount::whodunit::{self, Query};
use catamount::{Error, Result, cluster::Point};
use clap::{ArgAction, Args as ClapArgs, Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[cfg(test)]
mod main_test;

#[derive(Parser)]
#[command(name = "catamount")]
#[command(about = "Find time/space relationships in GPS collar data", long_about = None)]
struct Args {
    /// Config file (default: catamount.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Fix data CSV file
    #[arg(short, long, global = true)]
    datafile: Option<PathBuf>,

    /// More logging on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Places one animal kept returning to
    Clusters(ClustersArgs),
    /// Places two or more animals shared
    Crossings(CrossingsArgs),
    /// Animals near a place at a time
    Whodunit(WhodunitArgs),
    /// Outline of the area each animal ranges over
    Territories(TerritoriesArgs),
    /// Match field surveys against every animal's clusters
    MatchSurvey(MatchSurveyArgs),
}

#[derive(ClapArgs)]
struct ClustersArgs {
    /// Animal to cluster
    #[arg(short, long)]
    animal: String,

    /// Cluster radius in meters
    #[arg(short, long)]
    radius: Option<i64>,

    /// Time cutoff in hours
    #[arg(short, long)]
    time_cutoff: Option<i64>,

    /// Minimum number of home fixes
    #[arg(long)]
    minimum_count: Option<i64>,

    /// Minimum stay in hours
    #[arg(long)]
    minimum_stay: Option<i64>,

    /// Start date, "0" for none
    #[arg(long)]
    start_date: Option<String>,

    /// End date, "0" for none
    #[arg(long)]
    end_date: Option<String>,

    /// Report only this cluster
    #[arg(long)]
    cluster_id: Option<String>,

    #[arg(short, long, value_enum, default_value_t)]
    style: TextStyle,
}

#[derive(ClapArgs)]
struct CrossingsArgs {
    /// Animals to pool, comma separated (default: all)
    #[arg(short, long, value_delimiter = ',')]
    animals: Vec<String>,

    #[arg(short, long)]
    radius: Option<i64>,

    #[arg(short, long)]
    time_cutoff: Option<i64>,

    #[arg(long)]
    start_date: Option<String>,

    #[arg(long)]
    end_date: Option<String>,

    /// Report only this crossing
    #[arg(long)]
    crossing_id: Option<String>,

    #[arg(short, long, value_enum, default_value_t)]
    style: TextStyle,
}

#[derive(ClapArgs)]
struct WhodunitArgs {
    /// Date and time of the event
    #[arg(long)]
    date: String,

    /// Easting of the event
    #[arg(short, long, allow_negative_numbers = true)]
    x: f64,

    /// Northing of the event
    #[arg(short, long, allow_negative_numbers = true)]
    y: f64,

    #[arg(short, long)]
    radius: Option<i64>,

    #[arg(short, long)]
    time_cutoff: Option<i64>,

    #[arg(short, long, value_enum, default_value_t)]
    style: TextStyle,
}

#[derive(ClapArgs)]
struct TerritoriesArgs {
    #[arg(short, long, value_delimiter = ',')]
    animals: Vec<String>,

    /// Width of each perimeter bin in degrees
    #[arg(short, long)]
    resolution: Option<i64>,

    #[arg(long)]
    start_date: Option<String>,

    #[arg(long)]
    end_date: Option<String>,
}

#[derive(ClapArgs)]
struct MatchSurveyArgs {
    /// Survey CSV file
    #[arg(long)]
    survey_file: Option<PathBuf>,

    #[arg(short, long)]
    radius: Option<i64>,

    #[arg(short, long)]
    time_cutoff: Option<i64>,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut settings = match Settings::load(args.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(datafile) = args.datafile {
        settings.global.datafile_path = datafile;
    }

    let stdout = std::io::stdout();
    let out = stdout.lock();
    let result = match args.command {
        Command::Clusters(cmd) => run_clusters(&settings, cmd, out),
        Command::Crossings(cmd) => run_crossings(&settings, cmd, out),
        Command::Whodunit(cmd) => run_whodunit(&settings, cmd, out),
        Command::Territories(cmd) => run_territories(&settings, cmd, out),
        Command::MatchSurvey(cmd) => run_match_survey(&settings, cmd, out),
    };

    match result {
        Ok(()) => {}
        Err(e @ (Error::NoData(_) | Error::NothingFound(_))) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Sets up stderr logging; `RUST_LOG` wins over `-v`
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Reads the data file into a trail of the selected animals
///
/// An empty selection keeps every animal. Nothing left is [`Error::NoData`].
fn load_trail(settings: &Settings, animals: &[String]) -> Result<Trail> {
    let ingested = read_fixes(&settings.global.datafile_path, &settings.data)?;
    info!(
        fixes = ingested.fixes.len(),
        rejected = ingested.rejected,
        "data file read"
    );

    let mut trail = Trail::new(ingested.fixes);
    trail.select_animals(animals);
    if trail.is_empty() {
        return Err(Error::NoData(format!(
            "no fixes found for animals {:?}",
            animals
        )));
    }
    Ok(trail)
}

fn date_legend(legend: Legend, start: &Option<String>, end: &Option<String>) -> Legend {
    let show = |date: &Option<String>| date.clone().unwrap_or_else(|| "None".to_string());
    legend.with("Start Date", show(start)).with("End Date", show(end))
}

fn run_clusters<W: Write>(settings: &Settings, cmd: ClustersArgs, out: W) -> Result<()> {
    let config = ClusterConfig {
        radius: cmd.radius.unwrap_or(settings.clusters.radius),
        time_cutoff_hours: cmd.time_cutoff.unwrap_or(settings.clusters.time_cutoff_hours),
        minimum_count: cmd.minimum_count.unwrap_or(settings.clusters.minimum_count),
        minimum_stay_hours: cmd.minimum_stay.unwrap_or(settings.clusters.minimum_stay_hours),
        start_date: cmd.start_date.or_else(|| settings.clusters.start_date.clone()),
        end_date: cmd.end_date.or_else(|| settings.clusters.end_date.clone()),
    };
    let params = config.sweep_params();

    let mut trail = load_trail(settings, std::slice::from_ref(&cmd.animal))?;
    trail.prepare(&config.date_range()?)?;

    let mut clusters = trail.find_clusters(params);
    // A cluster asked for by id is reported even if the filters would drop it
    match &cmd.cluster_id {
        Some(id) => clusters = vec![select_cluster(&clusters, id)?],
        None => {
            filter_by_count(&mut clusters, config.minimum_count());
            filter_by_stay(&mut clusters, config.minimum_stay());
        }
    }
    if clusters.is_empty() {
        return Err(Error::NothingFound(
            "no clusters found, try adjusting the parameters".into(),
        ));
    }
    info!(animal = %cmd.animal, clusters = clusters.len(), "clusters found");

    if cmd.style.is_csv() {
        report::write_clusters_csv(out, &clusters, &trail.fixes, cmd.style.all_points())
    } else {
        let legend = Legend::default()
            .with("Animal", &cmd.animal)
            .with_params(&params)
            .with("Minimum Count", config.minimum_count())
            .with("Minimum Stay", format!("{} hours", config.minimum_stay() / 3600));
        let legend = date_legend(legend, &config.start_date, &config.end_date);
        report::write_clusters_descriptive(
            out,
            &legend,
            &clusters,
            &trail.fixes,
            cmd.style.all_points(),
        )
    }
}

fn select_cluster(clusters: &[Cluster], id: &str) -> Result<Cluster> {
    cluster_by_id(clusters, id)
        .cloned()
        .ok_or_else(|| Error::UnknownId {
            kind: "cluster",
            id: id.to_string(),
        })
}

fn run_crossings<W: Write>(settings: &Settings, cmd: CrossingsArgs, out: W) -> Result<()> {
    let config = CrossingConfig {
        radius: cmd.radius.unwrap_or(settings.crossings.radius),
        time_cutoff_hours: cmd.time_cutoff.unwrap_or(settings.crossings.time_cutoff_hours),
        start_date: cmd.start_date.or_else(|| settings.crossings.start_date.clone()),
        end_date: cmd.end_date.or_else(|| settings.crossings.end_date.clone()),
    };
    let params = config.sweep_params();

    let mut trail = load_trail(settings, &cmd.animals)?;
    trail.prepare(&config.date_range()?)?;

    let mut crossings = trail.find_crossings(params);
    if let Some(id) = &cmd.crossing_id {
        crossings = vec![select_crossing(&crossings, id)?];
    }
    if crossings.is_empty() {
        return Err(Error::NothingFound(
            "no crossings found, try adjusting the parameters".into(),
        ));
    }
    info!(crossings = crossings.len(), "crossings found");

    if cmd.style.is_csv() {
        report::write_crossings_csv(out, &crossings, &trail.fixes, cmd.style.all_points())
    } else {
        let animals = trail.animal_ids().join(", ");
        let legend = Legend::default()
            .with("Animals", animals)
            .with_params(&params);
        let legend = date_legend(legend, &config.start_date, &config.end_date);
        report::write_crossings_descriptive(
            out,
            &legend,
            &crossings,
            &trail.fixes,
            cmd.style.all_points(),
        )
    }
}

fn select_crossing(crossings: &[Crossing], id: &str) -> Result<Crossing> {
    crossing_by_id(crossings, id)
        .cloned()
        .ok_or_else(|| Error::UnknownId {
            kind: "crossing",
            id: id.to_string(),
        })
}

fn run_whodunit<W: Write>(settings: &Settings, cmd: WhodunitArgs, out: W) -> Result<()> {
    let config = WhodunitConfig {
        radius: cmd.radius.unwrap_or(settings.whodunit.radius),
        time_cutoff_hours: cmd.time_cutoff.unwrap_or(settings.whodunit.time_cutoff_hours),
    };
    let datetime =
        parse_date_argument(&cmd.date)?.ok_or_else(|| Error::BadDate(cmd.date.clone()))?;
    let query = Query {
        datetime,
        location: Point::new(cmd.x, cmd.y),
        params: config.sweep_params(),
    };

    let mut trail = load_trail(settings, &[])?;
    whodunit::prefilter(&mut trail, &query)?;
    let found = whodunit::find_matches(&trail.fixes, &query);
    info!(
        matches = found.matches.len(),
        close = found.close.len(),
        "whodunit search done"
    );

    if cmd.style.is_csv() {
        report::write_whodunit_csv(out, &query, &found)
    } else {
        let legend = Legend::default()
            .with("Date", &cmd.date)
            .with("Location", format!("{} east, {} north", cmd.x, cmd.y))
            .with_params(&query.params);
        report::write_whodunit_descriptive(out, &legend, &found)
    }
}

fn run_territories<W: Write>(settings: &Settings, cmd: TerritoriesArgs, out: W) -> Result<()> {
    let config = TerritoryConfig {
        perimeter_resolution: cmd
            .resolution
            .unwrap_or(settings.territories.perimeter_resolution),
        start_date: cmd.start_date.or_else(|| settings.territories.start_date.clone()),
        end_date: cmd.end_date.or_else(|| settings.territories.end_date.clone()),
    };

    let mut trail = load_trail(settings, &cmd.animals)?;
    trail.prepare(&config.date_range()?)?;

    let found = territories(trail, config.perimeter_resolution());
    if found.is_empty() {
        return Err(Error::NothingFound("no territories found".into()));
    }
    info!(territories = found.len(), "territories outlined");
    report::write_territories_csv(out, &found)
}

fn run_match_survey<W: Write>(settings: &Settings, cmd: MatchSurveyArgs, out: W) -> Result<()> {
    let config = MatchSurveyConfig {
        survey_file_path: cmd
            .survey_file
            .unwrap_or_else(|| settings.match_survey.survey_file_path.clone()),
        radius: cmd.radius.unwrap_or(settings.match_survey.radius),
        time_cutoff_hours: cmd
            .time_cutoff
            .unwrap_or(settings.match_survey.time_cutoff_hours),
        ..settings.match_survey.clone()
    };
    let params = config.sweep_params();

    let trail = load_trail(settings, &[])?;
    let fix_count = trail.len();
    let animal_count = trail.animal_ids().len();
    let clusters = survey::find_all_clusters(trail, params);

    let mut surveys =
        survey::read_surveys(&config.survey_file_path, &SurveyColumns::from(&config))?;
    survey::search(&mut surveys, &clusters, params);
    survey::log_summary(fix_count, &clusters, animal_count, &surveys);

    report::write_surveys_csv(out, &surveys)
}
