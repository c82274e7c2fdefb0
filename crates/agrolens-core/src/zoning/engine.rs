use std::collections::HashMap;

use geo::{Area, Winding};
use geo_types::{Coord, LineString, MultiPolygon, Polygon};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::consts::{ALLOWED_ZONE_COUNTS, M2_PER_HECTARE, MIN_ZONING_PIXELS};
use crate::error::{AgroError, Result};
use crate::indices::VegetationIndex;
use crate::raster::{GeoBounds, IndexRaster};

use super::components::label_components;
use super::config::ZoningConfig;
use super::kmeans::kmeans_1d;
use super::trace::{trace_components, Vertex};

/// One management zone.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Zone {
    /// 1 = lowest mean index, k = highest.
    pub zone_id: u8,
    pub label: String,
    pub mean_index: f64,
    pub min_index: f64,
    pub max_index: f64,
    pub std_index: f64,
    /// Authoritative zone size.
    pub pixel_count: usize,
    pub area_ha: f64,
    /// Share of the field's valid pixels in this zone.
    pub percent_of_field: f64,
    /// Traced outlines in lon/lat. Islands stay separate polygons.
    #[serde(skip, default = "empty_multipolygon")]
    pub polygons: MultiPolygon<f64>,
}

fn empty_multipolygon() -> MultiPolygon<f64> {
    MultiPolygon::new(Vec::new())
}

/// The zones of a field as a polygon feature set, one feature per zone.
#[derive(Clone, Debug, Default)]
pub struct ZoneFeatureCollection {
    pub index: Option<VegetationIndex>,
    pub zones: Vec<Zone>,
}

impl ZoneFeatureCollection {
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Total polygon count across all zones.
    pub fn polygon_count(&self) -> usize {
        self.zones.iter().map(|z| z.polygons.0.len()).sum()
    }

    /// GeoJSON `FeatureCollection` with a `MultiPolygon` per zone.
    pub fn to_geojson(&self) -> Value {
        let features: Vec<Value> = self
            .zones
            .iter()
            .map(|zone| {
                json!({
                    "type": "Feature",
                    "properties": {
                        "zone_id": zone.zone_id,
                        "zone_label": zone.label,
                        "mean_index": zone.mean_index,
                        "pixel_count": zone.pixel_count,
                        "area_ha": zone.area_ha,
                        "index": self.index.map(|i| i.code()),
                    },
                    "geometry": {
                        "type": "MultiPolygon",
                        "coordinates": multipolygon_coords(&zone.polygons),
                    },
                })
            })
            .collect();
        json!({ "type": "FeatureCollection", "features": features })
    }
}

fn ring_coords(ring: &LineString<f64>) -> Vec<[f64; 2]> {
    ring.coords().map(|c| [c.x, c.y]).collect()
}

fn multipolygon_coords(mp: &MultiPolygon<f64>) -> Vec<Vec<Vec<[f64; 2]>>> {
    mp.0.iter()
        .map(|poly| {
            std::iter::once(poly.exterior())
                .chain(poly.interiors().iter())
                .map(ring_coords)
                .collect()
        })
        .collect()
}

/// Output of a zoning request.
#[derive(Clone, Debug)]
pub struct ZoningResult {
    pub index: VegetationIndex,
    pub zones: Vec<Zone>,
    pub features: ZoneFeatureCollection,
    /// Zone id per pixel; 0 where the pixel is not valid.
    pub zone_map: Array2<u8>,
}

/// Descriptive label for a zone.
pub fn zone_label(zone_id: u8, num_zones: usize) -> String {
    let labels: &[&str] = match num_zones {
        3 => &["Low", "Medium", "High"],
        4 => &["Very low", "Low", "Medium", "High"],
        5 => &["Very low", "Low", "Medium", "High", "Very high"],
        _ => &[],
    };
    (zone_id as usize)
        .checked_sub(1)
        .and_then(|i| labels.get(i))
        .map(|s| s.to_string())
        .unwrap_or_else(|| format!("Zone {zone_id}"))
}

/// Reject zone counts other than 3, 4 or 5.
pub fn check_zone_count(num_zones: usize) -> Result<()> {
    if ALLOWED_ZONE_COUNTS.contains(&num_zones) {
        Ok(())
    } else {
        Err(AgroError::InvalidParameter(format!(
            "zone count must be one of {ALLOWED_ZONE_COUNTS:?}, got {num_zones}"
        )))
    }
}

/// Partition the valid pixels of an index raster into `num_zones` ordered
/// management zones.
pub fn create_zones(
    raster: &IndexRaster,
    bounds: &GeoBounds,
    pixel_area_m2: f64,
    num_zones: usize,
    config: &ZoningConfig,
) -> Result<ZoningResult> {
    check_zone_count(num_zones)?;

    let (h, w) = raster.dim();
    let mut positions = Vec::new();
    let mut values = Vec::new();
    for row in 0..h {
        for col in 0..w {
            if raster.valid[[row, col]] {
                positions.push((row, col));
                values.push(raster.values[[row, col]] as f64);
            }
        }
    }
    if values.len() < MIN_ZONING_PIXELS {
        return Err(AgroError::InsufficientData(format!(
            "{} valid pixels, zoning needs at least {MIN_ZONING_PIXELS}",
            values.len()
        )));
    }

    info!(
        index = %raster.index,
        valid_pixels = values.len(),
        num_zones,
        "Clustering field into zones"
    );
    let clusters = kmeans_1d(&values, num_zones, config.max_iterations, config.tolerance)?;
    debug!(iterations = clusters.iterations, centroids = ?clusters.centroids, "k-means converged");

    // Relabel by ascending cluster mean; ties keep seed order.
    let mut sums = vec![0.0f64; num_zones];
    let mut counts = vec![0usize; num_zones];
    for (&label, &v) in clusters.labels.iter().zip(&values) {
        sums[label] += v;
        counts[label] += 1;
    }
    let means: Vec<f64> = (0..num_zones)
        .map(|c| {
            if counts[c] > 0 {
                sums[c] / counts[c] as f64
            } else {
                clusters.centroids[c]
            }
        })
        .collect();
    let mut order: Vec<usize> = (0..num_zones).collect();
    order.sort_by(|&a, &b| means[a].total_cmp(&means[b]));
    let mut zone_of_cluster = vec![0u8; num_zones];
    for (rank, &cluster) in order.iter().enumerate() {
        zone_of_cluster[cluster] = rank as u8 + 1;
    }

    let mut zone_map = Array2::<u8>::zeros((h, w));
    for (&(row, col), &label) in positions.iter().zip(&clusters.labels) {
        zone_map[[row, col]] = zone_of_cluster[label];
    }

    let polygons = vectorize(&zone_map, bounds, config.min_polygon_pixels);
    let total_valid = values.len();
    let zones: Vec<Zone> = (1..=num_zones as u8)
        .map(|zone_id| {
            let zone_values: Vec<f64> = positions
                .iter()
                .zip(&values)
                .filter(|(&(r, c), _)| zone_map[[r, c]] == zone_id)
                .map(|(_, &v)| v)
                .collect();
            build_zone(
                zone_id,
                num_zones,
                &zone_values,
                means[order[zone_id as usize - 1]],
                total_valid,
                pixel_area_m2,
                polygons.get(&zone_id).cloned().unwrap_or_default(),
            )
        })
        .collect();

    info!(
        zones = zones.len(),
        polygons = zones.iter().map(|z| z.polygons.0.len()).sum::<usize>(),
        "Zoning complete"
    );

    Ok(ZoningResult {
        index: raster.index,
        features: ZoneFeatureCollection {
            index: Some(raster.index),
            zones: zones.clone(),
        },
        zones,
        zone_map,
    })
}

fn build_zone(
    zone_id: u8,
    num_zones: usize,
    values: &[f64],
    fallback_mean: f64,
    total_valid: usize,
    pixel_area_m2: f64,
    polygons: Vec<Polygon<f64>>,
) -> Zone {
    let n = values.len();
    let (mean, min, max, std) = if n == 0 {
        (fallback_mean, fallback_mean, fallback_mean, 0.0)
    } else {
        let mean = values.iter().sum::<f64>() / n as f64;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
        (mean, min, max, var.sqrt())
    };
    Zone {
        zone_id,
        label: zone_label(zone_id, num_zones),
        mean_index: mean,
        min_index: min,
        max_index: max,
        std_index: std,
        pixel_count: n,
        area_ha: n as f64 * pixel_area_m2 / M2_PER_HECTARE,
        percent_of_field: n as f64 / total_valid as f64 * 100.0,
        polygons: MultiPolygon(polygons),
    }
}

/// Trace every zone's connected pixel islands into lon/lat polygons.
fn vectorize(
    zone_map: &Array2<u8>,
    bounds: &GeoBounds,
    min_polygon_pixels: usize,
) -> HashMap<u8, Vec<Polygon<f64>>> {
    let (labels, components) = label_components(zone_map);
    let mut rings = trace_components(&labels);
    let mut polygons: HashMap<u8, Vec<Polygon<f64>>> = HashMap::new();

    for component in &components {
        if component.area < min_polygon_pixels {
            continue;
        }
        let Some(component_rings) = rings.remove(&component.label) else {
            continue;
        };
        let geo_rings: Vec<LineString<f64>> = component_rings
            .iter()
            .map(|ring| to_geo_ring(ring, bounds))
            .collect();
        polygons
            .entry(component.zone)
            .or_default()
            .extend(assemble_polygons(geo_rings));
    }
    polygons
}

fn to_geo_ring(ring: &[Vertex], bounds: &GeoBounds) -> LineString<f64> {
    let coords: Vec<Coord<f64>> = ring
        .iter()
        .map(|v| {
            let (x, y) = bounds.corner_to_geo(v.row, v.col);
            Coord { x, y }
        })
        .collect();
    let mut ring = LineString::from(coords);
    ring.close();
    ring
}

/// Counter-clockwise rings are exteriors; clockwise rings are holes of the
/// largest exterior.
fn assemble_polygons(rings: Vec<LineString<f64>>) -> Vec<Polygon<f64>> {
    let (mut exteriors, mut holes): (Vec<(f64, LineString<f64>)>, Vec<LineString<f64>>) =
        (Vec::new(), Vec::new());
    for ring in rings {
        if ring.is_ccw() {
            let area = Polygon::new(ring.clone(), vec![]).unsigned_area();
            exteriors.push((area, ring));
        } else if ring.is_cw() {
            holes.push(ring);
        }
    }
    exteriors.sort_by(|a, b| b.0.total_cmp(&a.0));
    let mut out: Vec<Polygon<f64>> = Vec::with_capacity(exteriors.len());
    for (i, (_, exterior)) in exteriors.into_iter().enumerate() {
        let interiors = if i == 0 {
            std::mem::take(&mut holes)
        } else {
            Vec::new()
        };
        out.push(Polygon::new(exterior, interiors));
    }
    out
}
