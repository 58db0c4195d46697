use anyhow::Result;
use std::path::PathBuf;
use structopt::StructOpt;

mod chart;
mod counts;
mod daily;
mod distribution;
mod export;
mod fetch;
mod map;
mod projection;
mod provinces;
mod shapes;

use projection::ProjectionKind;

const FONT_FILE: &str = "simsun.ttf";

#[derive(Debug, StructOpt)]
#[structopt(
    name = "ncovreport",
    about = "Plot 2019-nCoV daily counts and the per-province case map"
)]
struct Opt {
    #[structopt(long, default_value = "https://view.inews.qq.com", help = "Host serving the statistics feeds")]
    base_url: String,
    #[structopt(long, default_value = "2020", help = "Year of the M/D dates in the daily feed")]
    year: i32,
    #[structopt(long, default_value = "30")]
    timeout_secs: u64,
    #[structopt(long, parse(from_os_str), default_value = "china-shapefiles", help = "Directory holding the province shapefiles and simsun.ttf")]
    shapefile_dir: PathBuf,
    #[structopt(long, parse(from_os_str), help = "Font file (defaults to simsun.ttf in the shapefile directory)")]
    font: Option<PathBuf>,
    #[structopt(long, parse(from_os_str), default_value = "2019-nCoV疫情曲线.png")]
    daily_output: PathBuf,
    #[structopt(long, parse(from_os_str), default_value = "2019-nCoV疫情地图.png")]
    map_output: PathBuf,
    #[structopt(long, default_value = "ortho", help = "Map projection: ortho or cyl")]
    projection: ProjectionKind,
    #[structopt(long, parse(from_os_str), help = "Extra coastline shapefile drawn on the map")]
    coastlines: Option<PathBuf>,
    #[structopt(long, parse(from_os_str), help = "Extra country border shapefile drawn on the map")]
    countries: Option<PathBuf>,
    #[structopt(long, parse(from_os_str), help = "Also write daily.csv and cities.csv here")]
    csv_dir: Option<PathBuf>,
    #[structopt(long, conflicts_with = "map-only")]
    daily_only: bool,
    #[structopt(long)]
    map_only: bool,
}

fn plot_daily(opt: &Opt, fetcher: &fetch::Fetcher) -> Result<()> {
    let recs = daily::catch_daily(fetcher, opt.year)?;
    if let Some(dir) = &opt.csv_dir {
        export::write_csv(&dir.join(export::DAILY_CSV), &recs)?;
    }
    let series = daily::DailySeries::from(recs.as_slice());
    chart::plot_daily(&series, &opt.daily_output)
}

fn plot_distribution(opt: &Opt, fetcher: &fetch::Fetcher) -> Result<()> {
    let recs = distribution::catch_distribution(fetcher)?;
    if let Some(dir) = &opt.csv_dir {
        export::write_csv(&dir.join(export::CITIES_CSV), &recs)?;
    }
    let aggregate = distribution::aggregate_by_province(&recs);
    tracing::info!(provinces = aggregate.len(), "aggregated confirmed cases");

    let overlays: Vec<PathBuf> = opt
        .coastlines
        .iter()
        .chain(opt.countries.iter())
        .cloned()
        .collect();
    let layers = map::MapLayers::load(&opt.shapefile_dir, &overlays)?;
    let projection = opt.projection.build();
    map::plot_distribution(&layers, &aggregate, projection.as_ref(), &opt.map_output)
}

fn setup(opt: &Opt) -> Result<fetch::Fetcher> {
    let font = opt
        .font
        .clone()
        .unwrap_or_else(|| opt.shapefile_dir.join(FONT_FILE));
    chart::register_font(&font)?;
    fetch::Fetcher::new(
        &opt.base_url,
        std::time::Duration::from_secs(opt.timeout_secs),
    )
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let opt = Opt::from_args();
    let fetcher = match setup(&opt) {
        Ok(f) => f,
        Err(e) => {
            tracing::error!("Error starting up: {:#}", e);
            std::process::exit(1);
        }
    };

    let mut failed = false;
    if !opt.map_only {
        if let Err(e) = plot_daily(&opt, &fetcher) {
            tracing::error!("Error creating daily chart: {:#}", e);
            failed = true;
        }
    }
    if !opt.daily_only {
        if let Err(e) = plot_distribution(&opt, &fetcher) {
            tracing::error!("Error creating distribution map: {:#}", e);
            failed = true;
        }
    }
    if failed {
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_run_both_pipelines() {
        let opt = Opt::from_iter_safe(["ncovreport"]).unwrap();
        assert!(!opt.daily_only && !opt.map_only);
        assert_eq!(opt.year, 2020);
        assert_eq!(opt.projection, ProjectionKind::Ortho);
        assert_eq!(opt.shapefile_dir, PathBuf::from("china-shapefiles"));
        assert_eq!(opt.map_output, PathBuf::from("2019-nCoV疫情地图.png"));
    }

    #[test]
    fn pipeline_selection_is_exclusive() {
        assert!(Opt::from_iter_safe(["ncovreport", "--daily-only", "--map-only"]).is_err());
        let opt = Opt::from_iter_safe(["ncovreport", "--map-only", "--projection", "cyl"]).unwrap();
        assert!(opt.map_only);
        assert_eq!(opt.projection, ProjectionKind::Cyl);
    }

    #[test]
    fn unknown_projection_is_rejected() {
        assert!(Opt::from_iter_safe(["ncovreport", "--projection", "lcc"]).is_err());
    }
}
