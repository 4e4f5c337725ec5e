// ─────────────────────────────────────────────────────────────────────
// Drift Chamber Core — Chamber
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Drift chamber: charge grid plus the lazily rebuilt implicit operator.
//!
//! Each [`DriftChamber::step`] solves one backward-Euler drift-diffusion
//! update, then zeroes a 2 cm border band. The operator factorization is
//! cached against the `(α, β)` it was built for and rebuilt on the first
//! access after the field, diffusivity or timestep changes.

use crate::operator::{diffusion_coupling, drift_coupling, Factorization, OperatorCache};
use drift_types::config::{validate_diffusivity, validate_field, validate_timestep, ChamberConfig, SimulationConfig};
use drift_types::error::{DriftError, DriftResult};
use drift_types::state::GridShape;
use log::{debug, trace};
use ndarray::{s, Array2};
use std::fmt;

/// Row-major copy of the grid, matching the operator's flat indexing.
pub fn flatten_grid(grid: &Array2<f64>) -> Vec<f64> {
    grid.iter().copied().collect()
}

/// Inverse of [`flatten_grid`].
pub fn reshape_grid(values: Vec<f64>, dims: (usize, usize)) -> DriftResult<Array2<f64>> {
    let expected = dims.0 * dims.1;
    if values.len() != expected {
        return Err(DriftError::ShapeMismatch {
            expected,
            got: values.len(),
        });
    }
    Array2::from_shape_vec(dims, values).map_err(|e| DriftError::LinAlg(e.to_string()))
}

/// Zero every cell within `margin` cells of any edge.
pub fn damp_boundary(grid: &mut Array2<f64>, margin: usize) {
    let (rows, cols) = grid.dim();
    let mz = margin.min(rows);
    let my = margin.min(cols);
    grid.slice_mut(s![..mz, ..]).fill(0.0);
    grid.slice_mut(s![rows - mz.., ..]).fill(0.0);
    grid.slice_mut(s![.., ..my]).fill(0.0);
    grid.slice_mut(s![.., cols - my..]).fill(0.0);
}

/// Planar drift chamber: a 30 × 50 cm gas volume discretized at `spacing_cm`.
#[derive(Debug, Clone)]
pub struct DriftChamber {
    config: ChamberConfig,
    shape: GridShape,
    grid: Array2<f64>,
    operator: Option<OperatorCache>,
    rebuilds: usize,
    elapsed_s: f64,
    steps: u64,
}

impl DriftChamber {
    /// Create a chamber with an empty grid. The operator is built eagerly
    /// unless `config.build_operator` is false.
    pub fn new(config: ChamberConfig) -> DriftResult<Self> {
        config.validate()?;
        let shape = GridShape::from_spacing(config.spacing_cm)?;
        let build_now = config.build_operator;

        let mut chamber = DriftChamber {
            config,
            shape,
            grid: Array2::zeros((shape.rows, shape.cols)),
            operator: None,
            rebuilds: 0,
            elapsed_s: 0.0,
            steps: 0,
        };
        if build_now {
            chamber.factorization()?;
        }
        Ok(chamber)
    }

    /// Create a chamber from the `chamber` section of a JSON config file.
    pub fn from_file(path: &str) -> DriftResult<Self> {
        let config = SimulationConfig::from_file(path)?;
        Self::new(config.chamber)
    }

    /// Current diffusion coupling α.
    pub fn alpha(&self) -> f64 {
        diffusion_coupling(self.config.diffusivity, self.config.timestep_s, self.config.spacing_cm)
    }

    /// Current drift coupling β.
    pub fn beta(&self) -> f64 {
        drift_coupling(self.config.electric_field, self.config.timestep_s, self.config.spacing_cm)
    }

    /// True when the cached operator no longer matches the chamber's parameters.
    pub fn is_operator_stale(&self) -> bool {
        match &self.operator {
            Some(cache) => !cache.is_current(self.alpha(), self.beta(), self.config.factorization),
            None => true,
        }
    }

    /// The factorized operator, rebuilt first if the parameters changed.
    pub fn factorization(&mut self) -> DriftResult<&Factorization> {
        if self.is_operator_stale() {
            let (alpha, beta) = (self.alpha(), self.beta());
            let cache = OperatorCache::build(&self.shape, alpha, beta, self.config.factorization)?;
            self.rebuilds += 1;
            debug!(
                "rebuilt drift operator #{}: alpha={alpha:.3e} beta={beta:.3e} n={} nnz={} method={:?}",
                self.rebuilds,
                self.shape.len(),
                cache.matrix().nnz(),
                self.config.factorization
            );
            self.operator = Some(cache);
        }
        match &self.operator {
            Some(cache) => Ok(cache.factorization()),
            None => Err(DriftError::LinAlg("drift operator was not built".into())),
        }
    }

    /// The cached operator, if one has been built.
    pub fn operator(&self) -> Option<&OperatorCache> {
        self.operator.as_ref()
    }

    /// Number of operator builds so far.
    pub fn rebuild_count(&self) -> usize {
        self.rebuilds
    }

    /// Advance the grid by one timestep.
    ///
    /// Solves A·q_new = q, clamps round-off negatives, damps the border band
    /// and only then replaces the grid, so a failed solve leaves it untouched.
    pub fn step(&mut self) -> DriftResult<()> {
        let rhs = flatten_grid(&self.grid);
        let mut solution = self.factorization()?.solve(&rhs)?;
        for v in solution.iter_mut() {
            if *v < 0.0 {
                *v = 0.0;
            }
        }
        let mut next = reshape_grid(solution, (self.shape.rows, self.shape.cols))?;
        damp_boundary(&mut next, self.shape.damping_margin());

        self.grid = next;
        self.elapsed_s += self.config.timestep_s;
        self.steps += 1;
        trace!(
            "step {} t={:.3e}s total_charge={:.1}",
            self.steps,
            self.elapsed_s,
            self.total_charge()
        );
        Ok(())
    }

    /// Run `n` steps, stopping at the first error.
    pub fn advance(&mut self, n: usize) -> DriftResult<()> {
        for _ in 0..n {
            self.step()?;
        }
        Ok(())
    }

    pub fn set_electric_field(&mut self, electric_field: f64) -> DriftResult<()> {
        validate_field(electric_field)?;
        self.config.electric_field = electric_field;
        Ok(())
    }

    pub fn set_diffusivity(&mut self, diffusivity: f64) -> DriftResult<()> {
        validate_diffusivity(diffusivity)?;
        self.config.diffusivity = diffusivity;
        Ok(())
    }

    pub fn set_timestep(&mut self, timestep_s: f64) -> DriftResult<()> {
        validate_timestep(timestep_s)?;
        self.config.timestep_s = timestep_s;
        Ok(())
    }

    /// Zero the grid and reset the clock. The operator cache is kept.
    pub fn clear(&mut self) {
        self.grid.fill(0.0);
        self.elapsed_s = 0.0;
        self.steps = 0;
    }

    /// Charge density in electrons/cm², indexed `[[row = z, col = y]]`.
    pub fn grid(&self) -> &Array2<f64> {
        &self.grid
    }

    pub(crate) fn grid_mut(&mut self) -> &mut Array2<f64> {
        &mut self.grid
    }

    /// (rows, cols) = (z cells, y cells).
    pub fn dims(&self) -> (usize, usize) {
        (self.shape.rows, self.shape.cols)
    }

    pub fn shape(&self) -> &GridShape {
        &self.shape
    }

    pub fn spacing(&self) -> f64 {
        self.shape.spacing_cm
    }

    pub fn config(&self) -> &ChamberConfig {
        &self.config
    }

    pub fn elapsed_s(&self) -> f64 {
        self.elapsed_s
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Total number of electrons on the grid.
    pub fn total_charge(&self) -> f64 {
        self.grid.sum() * self.shape.spacing_cm * self.shape.spacing_cm
    }
}

impl fmt::Display for DriftChamber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DriftChamber(spacing: {} cm, diffusivity: {}, E-field: {}, grid: {}x{})",
            self.config.spacing_cm,
            self.config.diffusivity,
            self.config.electric_field,
            self.shape.rows,
            self.shape.cols
        )
    }
}
