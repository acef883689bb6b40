//! Survival binned by normalised radius across the nozzle.

use std::collections::{BTreeMap, HashMap};

use ff_core::{ensure_finite, round_to, unique_sorted, Deadline, FfError};
use ff_folder::{FolderGeometry, PointCloud, PointRecord, PointSet, SimulationFolder, Table};
use serde::Serialize;

use crate::law::SurvivalConfig;
use crate::track::SurvivalTrack;
use crate::SurvivalResult;

/// Mean of the points of one bin in one plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneSample {
    pub x: f64,
    /// Height relative to the nozzle tip (positive below it), mm.
    pub z: f64,
    pub velocity: f64,
    pub stress: f64,
}

/// Survival tracks that passed the coverage filter, keyed by bin index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurvivalProfile {
    pub bin_width: f64,
    /// Distinct planes in the selected points.
    pub planes: usize,
    pub tracks: BTreeMap<usize, SurvivalTrack>,
    /// Normalised radii of bins dropped for poor coverage.
    pub dropped: Vec<f64>,
}

impl SurvivalProfile {
    /// Ring area a bin at `rbar` stands for: `rbar² - (rbar - bin_width)²`,
    /// with the inner radius clamped at 0. The bin at `rbar = 0` therefore
    /// carries no weight in [`rate`](Self::rate).
    pub fn ring_weight(rbar: f64, bin_width: f64) -> f64 {
        rbar.powi(2) - (rbar - bin_width).max(0.0).powi(2)
    }

    /// Area-weighted mean survival; `None` when no bin carries weight.
    pub fn rate(&self) -> Option<f64> {
        let mut weighted = 0.0;
        let mut total = 0.0;
        for track in self.tracks.values() {
            let w = Self::ring_weight(track.rbar, self.bin_width);
            weighted += track.survival() * w;
            total += w;
        }
        (total > 0.0).then(|| weighted / total)
    }

    pub fn track(&self, rbar: f64) -> Option<&SurvivalTrack> {
        self.tracks.values().find(|t| t.rbar == round_to(rbar, 5))
    }

    /// One row per bin: rbar, survival, steps, skipped, elapsed.
    pub fn to_table(&self) -> Table {
        let mut table = Table::new(
            ["rbar", "survival", "steps", "skipped", "elapsed"]
                .map(str::to_string)
                .to_vec(),
            ["", "", "", "", "s"].map(str::to_string).to_vec(),
        );
        for t in self.tracks.values() {
            table.push_row(&[
                t.rbar,
                t.survival(),
                t.steps().len() as f64,
                t.skipped() as f64,
                t.elapsed(),
            ]);
        }
        table
    }

    /// Profile from the nozzle point export at `config.time`.
    pub fn from_folder(
        folder: &SimulationFolder,
        geo: &FolderGeometry,
        config: &SurvivalConfig,
        deadline: &Deadline,
    ) -> SurvivalResult<Self> {
        let path = folder.points_file(PointSet::Nozzle, config.time);
        let cloud = PointCloud::read(&path)?;
        survival_by_radius(&cloud, geo, config, deadline)
    }
}

/// Bin index of a normalised radius, rounded to the nearest boundary.
fn bin_index(rbar: f64, bin_width: f64) -> usize {
    (rbar / bin_width).round() as usize
}

fn bin_count(bin_width: f64) -> usize {
    (0..)
        .take_while(|k| round_to(*k as f64 * bin_width, 5) < 1.0)
        .count()
}

/// Survival per normalised-radius bin from the nozzle points of one time.
///
/// Points are restricted to the central plane, the upstream half of the
/// nozzle and the lower `top_cutoff` of its length. Planes are walked from
/// the inlet down to the tip; within a plane, points of a bin with non-zero
/// velocity are averaged into one sample. Bins recorded in fewer than
/// `coverage_fraction` of the planes are dropped.
pub fn survival_by_radius(
    cloud: &PointCloud,
    geo: &FolderGeometry,
    config: &SurvivalConfig,
    deadline: &Deadline,
) -> SurvivalResult<SurvivalProfile> {
    config.validate()?;
    let length = geo
        .nozzle_length
        .ok_or_else(|| FfError::missing("legend key nozzle_length"))?;
    if !cloud.is_empty() && cloud.points.iter().all(|p| p.shear_stress.is_none()) {
        return Err(FfError::missing("shearstressmag column in nozzle points").into());
    }

    let dr = config.bin_width;
    let xc = geo.nozzle_center_x;
    let yc = geo.nozzle_center_y;
    // (plane z, bin, point)
    let mut selected: Vec<(f64, usize, &PointRecord)> = Vec::new();
    for p in &cloud.points {
        let z_rel = geo.nozzle_bottom_z - p.z();
        if z_rel <= -config.top_cutoff * length
            || (p.y() - yc).abs() >= config.plane_half_thickness
            || p.x() >= xc
        {
            continue;
        }
        let r = ((p.x() - xc).powi(2) + (p.y() - yc).powi(2)).sqrt();
        let rbar = r / geo.local_radius(z_rel);
        selected.push((z_rel, bin_index(rbar, dr), p));
    }

    let planes = unique_sorted(selected.iter().map(|(z, _, _)| *z));
    let samples = plane_samples(&selected, &planes);
    let bins = bin_count(dr);
    let mut tracks: BTreeMap<usize, SurvivalTrack> = (0..bins)
        .map(|k| {
            let rbar = round_to(k as f64 * dr, 5);
            (k, SurvivalTrack::new(rbar, config.law, config.discontinuity_ratio))
        })
        .collect();

    for (i, plane) in planes.iter().enumerate() {
        deadline.check("survival")?;
        for (k, track) in tracks.iter_mut() {
            let Some(sample) = samples.get(&(i, *k)) else {
                continue;
            };
            if let Err(e) = ensure_finite(sample.stress, "shear stress")
                .and_then(|_| ensure_finite(sample.velocity, "velocity"))
            {
                tracing::warn!(rbar = track.rbar, z = *plane, error = %e, "skipping plane sample");
                continue;
            }
            track.add_sample(sample.x, sample.z, sample.velocity, sample.stress);
        }
    }

    let needed = config.coverage_fraction * planes.len() as f64;
    let mut dropped = Vec::new();
    tracks.retain(|_, t| {
        let keep = t.recorded() as f64 >= needed && t.recorded() > 0;
        if !keep {
            dropped.push(t.rbar);
        }
        keep
    });
    if !dropped.is_empty() {
        tracing::warn!(
            dropped = dropped.len(),
            planes = planes.len(),
            "dropped survival bins with poor coverage"
        );
    }
    Ok(SurvivalProfile {
        bin_width: dr,
        planes: planes.len(),
        tracks,
        dropped,
    })
}

/// Mean sample of every (plane index, bin) pair, over points that are moving.
fn plane_samples(selected: &[(f64, usize, &PointRecord)], planes: &[f64]) -> HashMap<(usize, usize), PlaneSample> {
    let mut sums: HashMap<(usize, usize), (usize, PlaneSample)> = HashMap::new();
    for &(z, bin, p) in selected {
        if p.magu <= 0.0 {
            continue;
        }
        let Ok(plane) = planes.binary_search_by(|v| v.total_cmp(&z)) else {
            continue;
        };
        let (n, sum) = sums.entry((plane, bin)).or_insert((
            0,
            PlaneSample {
                x: 0.0,
                z: 0.0,
                velocity: 0.0,
                stress: 0.0,
            },
        ));
        *n += 1;
        sum.x += p.x();
        sum.z += z;
        sum.velocity += p.magu;
        sum.stress += p.shear_stress.unwrap_or(f64::NAN);
    }
    sums.into_iter()
        .map(|(key, (n, sum))| {
            let n = n as f64;
            let mean = PlaneSample {
                x: sum.x / n,
                z: sum.z / n,
                velocity: sum.velocity / n,
                stress: sum.stress / n,
            };
            (key, mean)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bins_cover_the_unit_radius() {
        assert_eq!(bin_count(0.05), 20);
        assert_eq!(bin_count(0.25), 4);
        assert_eq!(bin_index(0.049, 0.05), 1);
        assert_eq!(bin_index(0.024, 0.05), 0);
    }

    #[test]
    fn ring_weights() {
        assert_eq!(SurvivalProfile::ring_weight(0.0, 0.05), 0.0);
        assert!((SurvivalProfile::ring_weight(0.5, 0.05) - (0.25 - 0.2025)).abs() < 1e-12);
        assert!((SurvivalProfile::ring_weight(0.03, 0.05) - 0.0009).abs() < 1e-12);
    }

    #[test]
    fn rate_is_area_weighted() {
        let mut tracks = BTreeMap::new();
        let mut inner = SurvivalTrack::new(0.5, Default::default(), 0.1);
        inner.add_sample(0.0, -1.0, 1.0, 0.0);
        let mut outer = SurvivalTrack::new(1.0, crate::SurvivalLaw { a: 1.0, b: 1.0, c: 1.0 }, 0.1);
        outer.add_sample(0.0, -1.0, 1.0, 0.0);
        // one second at 1 Pa: factor e^-1
        outer.add_sample(0.0, 0.0, 1.0, 1.0);
        tracks.insert(10, inner);
        tracks.insert(20, outer);
        let profile = SurvivalProfile {
            bin_width: 0.5,
            planes: 2,
            tracks,
            dropped: Vec::new(),
        };
        // weights 0.25 and 0.75
        let expected = (0.25 * 1.0 + 0.75 * (-1.0f64).exp()) / 1.0;
        assert!((profile.rate().unwrap() - expected).abs() < 1e-12);

        let empty = SurvivalProfile {
            bin_width: 0.05,
            planes: 0,
            tracks: BTreeMap::new(),
            dropped: Vec::new(),
        };
        assert_eq!(empty.rate(), None);
    }
}
