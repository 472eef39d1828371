//! Cave Sketch 主程序入口
//!
//! `cave-sketch --config job.toml`：读取 DXF，生成节点表、A4 测绘图和地图。

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use cave_config::JobConfig;
use cave_core::geo::{project, GeoMap};
use cave_core::node::NodeTable;
use cave_core::style::StyleTable;
use cave_file::{parse_dxf, table_io, MapExporter, SvgExporter};
use cave_renderer::compose::compose;

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let mut config_path: Option<PathBuf> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let Some(path) = args.next() else {
                    anyhow::bail!("`--config` requires a path to a job file");
                };
                config_path = Some(PathBuf::from(path));
            }
            other => anyhow::bail!("unknown argument: {other}"),
        }
    }

    let Some(config_path) = config_path else {
        anyhow::bail!("usage: cave-sketch --config <job.toml>");
    };
    let config = JobConfig::from_file(&config_path)?;
    init_logging(&config.logging.level)?;
    info!(config = %config_path.display(), "Starting Cave Sketch");

    run(&config)
}

fn init_logging(level: &str) -> Result<()> {
    let level: Level = level
        .parse()
        .with_context(|| format!("invalid log level '{level}'"))?;
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).context("setting default subscriber failed")?;
    Ok(())
}

fn run(config: &JobConfig) -> Result<()> {
    let survey = &config.survey;
    let options = config.build_options();
    std::fs::create_dir_all(&survey.output_dir)
        .with_context(|| format!("creating {}", survey.output_dir.display()))?;

    let load = |dxf: &Path, csv: PathBuf| -> Result<NodeTable> {
        let table = parse_dxf(dxf, &config.layers, &options)
            .with_context(|| format!("parsing {}", dxf.display()))?;
        table_io::write_table(&table, &csv)?;
        Ok(table)
    };
    let plan = survey
        .plan_dxf
        .as_deref()
        .map(|dxf| load(dxf, survey.plan_table_path()))
        .transpose()?;
    let section = survey
        .section_dxf
        .as_deref()
        .map(|dxf| load(dxf, survey.section_table_path()))
        .transpose()?;

    let styles = StyleTable::default();
    let page = compose(
        &survey.title,
        plan.as_ref(),
        section.as_ref(),
        &config.drawing,
        &config.exclusions(),
        &styles,
    )?;
    SvgExporter::new().export_to_file(&page, &survey.page_path())?;

    match (&plan, config.reference_points.is_empty()) {
        (Some(plan), false) => {
            let geo = project(plan, &config.reference_points)?;
            let map = GeoMap::from_table(&geo, &styles);
            MapExporter.export_to_file(&survey.title, &map, &survey.map_path())?;
        }
        (None, _) => warn!("no plan drawing; map skipped"),
        (_, true) => warn!("no reference points; map skipped"),
    }

    info!(output = %survey.output_dir.display(), "Cave Sketch finished");
    Ok(())
}
