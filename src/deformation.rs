//! # Parametric post-seismic deformation models
//!
//! After an earthquake, a station's motion departs from the linear velocity
//! model of the reference frame. PSD catalogs describe this transient per
//! station and per topocentric component (East, North, Up) with one of five
//! closed-form parametric models, selected by a model number in `[0, 4]`.
//!
//! All amplitudes are in **millimeters** and relaxation times in **fractional
//! Julian years**; the elapsed-time argument is the interval since the
//! earthquake, also in fractional Julian years.

use crate::constants::{FractionalYears, Millimeter};

/// One of the five closed-form post-seismic deformation models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PsdModel {
    /// Model 0: piece-wise linear. The transient is already captured by the
    /// station velocity, so the correction is identically zero.
    PiecewiseLinear,
    /// Model 1: `a1 · ln(1 + dt/t1)`.
    Logarithmic,
    /// Model 2: `a1 · (1 − e^(−dt/t1))`.
    Exponential,
    /// Model 3: `a1 · ln(1 + dt/t1) + a2 · (1 − e^(−dt/t2))`.
    LogExponential,
    /// Model 4: `a1 · (1 − e^(−dt/t1)) + a2 · (1 − e^(−dt/t2))`.
    TwoExponential,
}

impl PsdModel {
    /// Map a catalog model digit to its model, or `None` when the digit is
    /// outside `[0, 4]`.
    pub fn from_digit(digit: u32) -> Option<PsdModel> {
        match digit {
            0 => Some(PsdModel::PiecewiseLinear),
            1 => Some(PsdModel::Logarithmic),
            2 => Some(PsdModel::Exponential),
            3 => Some(PsdModel::LogExponential),
            4 => Some(PsdModel::TwoExponential),
            _ => None,
        }
    }

    /// Number of parameters the catalog supplies for this model
    /// (0 for model 0, `(a1, t1)` for models 1-2, `(a1, t1, a2, t2)` for
    /// models 3-4).
    pub fn parameter_count(&self) -> usize {
        match self {
            PsdModel::PiecewiseLinear => 0,
            PsdModel::Logarithmic | PsdModel::Exponential => 2,
            PsdModel::LogExponential | PsdModel::TwoExponential => 4,
        }
    }

    /// Evaluate the model at `dt` years after the earthquake.
    ///
    /// Arguments
    /// -----------------
    /// * `dt`: Elapsed time since the earthquake in fractional Julian years.
    /// * `a1`, `t1`: First amplitude (mm) and relaxation time (years).
    /// * `a2`, `t2`: Second amplitude (mm) and relaxation time (years), used
    ///   by models 3 and 4 only.
    ///
    /// Return
    /// ----------
    /// * The post-seismic displacement in millimeters.
    pub fn evaluate(
        &self,
        dt: FractionalYears,
        a1: Millimeter,
        t1: FractionalYears,
        a2: Millimeter,
        t2: FractionalYears,
    ) -> Millimeter {
        match self {
            PsdModel::PiecewiseLinear => 0.0,
            PsdModel::Logarithmic => a1 * (1.0 + dt / t1).ln(),
            PsdModel::Exponential => a1 * (1.0 - (-dt / t1).exp()),
            PsdModel::LogExponential => {
                a1 * (1.0 + dt / t1).ln() + a2 * (1.0 - (-dt / t2).exp())
            }
            PsdModel::TwoExponential => {
                a1 * (1.0 - (-dt / t1).exp()) + a2 * (1.0 - (-dt / t2).exp())
            }
        }
    }
}

/// The post-seismic description of one topocentric component: a model and its
/// parameters as read from the catalog.
///
/// Parameters beyond the model's [`parameter_count`](PsdModel::parameter_count)
/// stay at zero and do not contribute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComponentPsd {
    pub model: PsdModel,
    /// First amplitude in mm.
    pub a1: Millimeter,
    /// First relaxation time in fractional years.
    pub t1: FractionalYears,
    /// Second amplitude in mm.
    pub a2: Millimeter,
    /// Second relaxation time in fractional years.
    pub t2: FractionalYears,
}

impl ComponentPsd {
    /// A component with no transient (model 0).
    pub fn none() -> Self {
        Self {
            model: PsdModel::PiecewiseLinear,
            a1: 0.0,
            t1: 0.0,
            a2: 0.0,
            t2: 0.0,
        }
    }

    /// Displacement of this component at `dt` years after the earthquake,
    /// in millimeters.
    pub fn displacement(&self, dt: FractionalYears) -> Millimeter {
        self.model.evaluate(dt, self.a1, self.t1, self.a2, self.t2)
    }
}
