//! Load → build → query → write, as one call per run configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use log::{info, warn};

use iso_core::TravelMode;
use iso_network::{DelayRecord, Topology};
use iso_session::{Isochrone, IsochroneConfig, Session, SessionBuilder};
use iso_io::{IsochroneRow, Origin, VolumeTable};

/// Counts reported at the end of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub nodes:          usize,
    pub edges:          usize,
    pub site_nodes:     usize,
    pub origins:        usize,
    pub rows:           usize,
    pub empty_polygons: usize,
}

// ── Config ────────────────────────────────────────────────────────────────────

/// Parse and validate a TOML run configuration.  Relative paths are made
/// relative to the file's directory.
pub fn load_config(path: &Path) -> Result<IsochroneConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let mut config: IsochroneConfig = toml::from_str(&text)
        .with_context(|| format!("parsing config {}", path.display()))?;
    if let Some(base) = path.parent() {
        resolve_paths(&mut config, base);
    }
    config.validate()?;
    Ok(config)
}

/// Apply command-line overrides and validate the result again.  An empty
/// `cutoffs` keeps the configured ones.
pub fn apply_overrides(
    config: &mut IsochroneConfig,
    mode: Option<TravelMode>,
    cutoffs: Vec<f64>,
    output: Option<PathBuf>,
) -> Result<()> {
    if let Some(mode) = mode {
        config.mode = mode;
    }
    if !cutoffs.is_empty() {
        config.cutoffs_secs = cutoffs;
    }
    if let Some(output) = output {
        config.outputs.isochrones = output;
    }
    config.validate().context("invalid command-line override")?;
    Ok(())
}

fn resolve_paths(config: &mut IsochroneConfig, base: &Path) {
    let resolve = |p: &mut PathBuf| {
        if p.is_relative() {
            *p = base.join(&*p);
        }
    };
    let inputs = &mut config.inputs;
    for p in [
        &mut inputs.nodes,
        &mut inputs.edges,
        &mut inputs.pbf,
        &mut inputs.traffic_lights,
        &mut inputs.volumes,
    ]
    .into_iter()
    .flatten()
    {
        resolve(p);
    }
    resolve(&mut inputs.origins);
    resolve(&mut config.outputs.isochrones);
    if let Some(p) = &mut config.outputs.site_mapping {
        resolve(p);
    }
}

// ── Inputs ────────────────────────────────────────────────────────────────────

fn load_topology(config: &IsochroneConfig) -> Result<Topology> {
    let inputs = &config.inputs;
    if let (Some(nodes), Some(edges)) = (&inputs.nodes, &inputs.edges) {
        if inputs.pbf.is_some() {
            warn!("both CSV and PBF networks configured; using the CSV files");
        }
        return iso_io::load_topology_csv(nodes, edges)
            .with_context(|| format!("loading network {} / {}", nodes.display(), edges.display()));
    }
    let Some(pbf) = &inputs.pbf else {
        bail!("no network input configured");
    };

    #[cfg(feature = "osm")]
    {
        iso_io::osm::load_topology_from_pbf(pbf, config.mode)
            .with_context(|| format!("loading network {}", pbf.display()))
    }

    #[cfg(not(feature = "osm"))]
    {
        bail!("{} is a PBF extract; rebuild with `--features osm` to load it", pbf.display())
    }
}

fn load_delay_records(config: &IsochroneConfig) -> Result<Vec<DelayRecord>> {
    let Some(lights_path) = &config.inputs.traffic_lights else {
        return Ok(Vec::new());
    };
    let lights = iso_io::load_traffic_lights(lights_path)
        .with_context(|| format!("loading traffic lights {}", lights_path.display()))?;
    let volumes = match &config.inputs.volumes {
        Some(path) => iso_io::load_volumes_csv(path)
            .with_context(|| format!("loading volumes {}", path.display()))?,
        None => VolumeTable::default(),
    };
    Ok(iso_io::join_volumes(&lights, &volumes))
}

// ── Run ───────────────────────────────────────────────────────────────────────

/// Execute one configured run and write its outputs.
pub fn run(config: &IsochroneConfig) -> Result<RunSummary> {
    let topology = load_topology(config)?;
    let records = load_delay_records(config)?;
    let session = SessionBuilder::new(topology, config.profile())
        .delay_records(records)
        .build()?;

    let origins = iso_io::load_origins(&config.inputs.origins)
        .with_context(|| format!("loading origins {}", config.inputs.origins.display()))?;
    let cutoffs = config.cutoffs();
    info!("{} origins × {} cutoffs {:?}", origins.len(), cutoffs.len(), cutoffs);

    let rows = isochrone_rows(&session, &origins, &cutoffs)?;

    write_output(&config.outputs.isochrones, |p| iso_io::write_isochrones_geojson(p, &rows))?;
    if let Some(path) = &config.outputs.site_mapping {
        write_output(path, |p| iso_io::write_site_mapping_csv(p, session.site_mappings()))?;
    }

    Ok(RunSummary {
        nodes:          session.network().node_count(),
        edges:          session.network().edge_count(),
        site_nodes:     session.injection_report().site_nodes,
        origins:        origins.len(),
        rows:           rows.len(),
        empty_polygons: rows.iter().filter(|r| r.polygon.is_none()).count(),
    })
}

/// Rows grouped by origin (input order), then by ascending cutoff.
pub fn isochrone_rows(session: &Session, origins: &[Origin], cutoffs: &[f64]) -> Result<Vec<IsochroneRow>> {
    let per_origin = |origin: &Origin| -> Result<Vec<IsochroneRow>> {
        let rings = session
            .query_rings(origin.point, cutoffs)
            .with_context(|| format!("querying origin {:?}", origin.name))?;
        Ok(rings.into_iter().map(|iso| to_row(session, origin, iso)).collect())
    };

    #[cfg(not(feature = "parallel"))]
    let grouped: Vec<Vec<IsochroneRow>> = origins.iter().map(per_origin).collect::<Result<_>>()?;

    #[cfg(feature = "parallel")]
    let grouped: Vec<Vec<IsochroneRow>> = {
        use rayon::prelude::*;
        origins.par_iter().map(per_origin).collect::<Result<_>>()?
    };

    Ok(grouped.into_iter().flatten().collect())
}

fn to_row(session: &Session, origin: &Origin, iso: Isochrone) -> IsochroneRow {
    IsochroneRow {
        name:            origin.name.clone(),
        node_id:         session.network().node_key[iso.origin.index()],
        mode:            session.profile().mode,
        cutoff_secs:     iso.cutoff(),
        reachable_nodes: iso.reachable_nodes(),
        polygon:         iso.polygon,
    }
}

fn write_output<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&Path) -> iso_io::IoResult<()>,
{
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    write(path).with_context(|| format!("writing {}", path.display()))
}
