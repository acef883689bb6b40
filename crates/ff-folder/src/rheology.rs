//! Nominal flow state of the ink and support fluids at the nozzle outlet.

use serde::{Deserialize, Serialize};

use crate::geometry::FolderGeometry;
use crate::legend::Legend;
use crate::FolderResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fluid {
    Ink,
    Sup,
}

impl Fluid {
    pub fn prefix(self) -> &'static str {
        match self {
            Fluid::Ink => "ink",
            Fluid::Sup => "sup",
        }
    }
}

/// Transport model recorded in the legend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TransportModel {
    /// Kinematic viscosity in m^2/s.
    Newtonian { nu: f64 },
    /// Kinematic plateau viscosity, yield stress, consistency (all per unit
    /// density) and power-law index.
    HerschelBulkley { nu0: f64, tau0: f64, k: f64, n: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FluidState {
    pub fluid: Fluid,
    /// kg/m^3
    pub rho: f64,
    /// Characteristic diameter in mm.
    pub diameter: f64,
    /// mm/s
    pub velocity: f64,
    /// Nominal shear rate v/d in 1/s.
    pub shear_rate: f64,
    /// Dynamic viscosity in Pa·s.
    pub viscosity: f64,
    pub reynolds: f64,
}

impl FluidState {
    pub fn from_legend(le: &Legend, geo: &FolderGeometry, fluid: Fluid) -> FolderResult<Self> {
        let key = |name: &str| format!("{}_{}", fluid.prefix(), name);
        let rho = le.get_f64(&key("rho"))?;
        let model = match le.value(&key("transportModel")) {
            Some("Newtonian") => TransportModel::Newtonian {
                nu: le.get_f64(&key("nu"))?,
            },
            _ => TransportModel::HerschelBulkley {
                nu0: le.get_f64(&key("nu0"))?,
                tau0: le.get_f64(&key("tau0"))?,
                k: le.get_f64(&key("k"))?,
                n: le.get_f64(&key("n"))?,
            },
        };
        let (diameter, velocity) = match fluid {
            Fluid::Ink => (geo.nozzle_inner_width, geo.ink_velocity),
            Fluid::Sup => (geo.outer_width(), geo.bath_velocity),
        };
        Ok(Self::compute(fluid, model, rho, diameter, velocity))
    }

    pub fn compute(
        fluid: Fluid,
        model: TransportModel,
        rho: f64,
        diameter: f64,
        velocity: f64,
    ) -> Self {
        let shear_rate = velocity / diameter;
        let viscosity = match model {
            TransportModel::Newtonian { nu } => nu * rho,
            TransportModel::HerschelBulkley { nu0, tau0, k, n } => {
                let plateau = nu0 * rho;
                let hb = tau0 * rho / shear_rate + k * rho * shear_rate.powf(n - 1.0);
                plateau.min(hb)
            }
        };
        let reynolds = rho * (velocity / 1000.0) * (diameter / 1000.0) / viscosity;
        Self {
            fluid,
            rho,
            diameter,
            velocity,
            shear_rate,
            viscosity,
            reynolds,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RheologySummary {
    pub ink: FluidState,
    pub sup: FluidState,
}

impl RheologySummary {
    pub fn from_legend(le: &Legend, geo: &FolderGeometry) -> FolderResult<Self> {
        Ok(Self {
            ink: FluidState::from_legend(le, geo, Fluid::Ink)?,
            sup: FluidState::from_legend(le, geo, Fluid::Sup)?,
        })
    }

    pub fn viscosity_ratio(&self) -> f64 {
        self.ink.viscosity / self.sup.viscosity
    }

    pub fn reynolds_ratio(&self) -> f64 {
        self.ink.reynolds / self.sup.reynolds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newtonian_viscosity_is_nu_times_rho() {
        let s = FluidState::compute(
            Fluid::Ink,
            TransportModel::Newtonian { nu: 1e-3 },
            1000.0,
            0.6,
            10.0,
        );
        assert!((s.viscosity - 1.0).abs() < 1e-12);
        assert!((s.shear_rate - 10.0 / 0.6).abs() < 1e-12);
        let re = 1000.0 * 0.01 * 0.0006 / 1.0;
        assert!((s.reynolds - re).abs() < 1e-15);
    }

    #[test]
    fn herschel_bulkley_is_capped_by_plateau() {
        let model = TransportModel::HerschelBulkley {
            nu0: 10.0,
            tau0: 0.01,
            k: 0.00375,
            n: 0.45,
        };
        let s = FluidState::compute(Fluid::Sup, model, 1000.0, 0.907, 10.0);
        let gdot: f64 = 10.0 / 0.907;
        let expected = (10.0_f64 * 1000.0).min(10.0 / gdot + 3.75 * gdot.powf(-0.55));
        assert!((s.viscosity - expected).abs() < 1e-9);
        assert!(s.viscosity < 10_000.0);
    }

    #[test]
    fn ratios_from_legend() {
        let text = format!(
            "{}ink\ntransportModel,Newtonian\nnu,0.001\nrho,1000\nsup\ntransportModel,Newtonian\nnu,0.0005\nrho,1000\n",
            crate::geometry::tests::LEGEND
        );
        let le = Legend::parse(&text).unwrap();
        let geo = FolderGeometry::from_legend(&le).unwrap();
        let r = RheologySummary::from_legend(&le, &geo).unwrap();
        assert!((r.viscosity_ratio() - 2.0).abs() < 1e-12);
        assert!(r.reynolds_ratio() > 0.0);
    }
}
