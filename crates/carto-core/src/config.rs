//! Cartogram configuration and validation.
//!
//! [`CartogramConfig`] bundles everything a transform reads: blur, step
//! cap, progress mode, intermediate-snapshot flag, and the integrator
//! tuning in [`IntegratorConfig`]. No component mutates it.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

// ── ProgressMode ───────────────────────────────────────────────────

/// How much progress the integrator reports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ProgressMode {
    /// No progress events.
    None,
    /// A single summary when the integration finishes.
    #[default]
    Normal,
    /// Fraction of fictitious time completed after every accepted step.
    Percent,
    /// As `Percent`, plus step size, error estimate and rejected steps.
    Detailed,
}

impl ProgressMode {
    /// Whether per-step events are emitted.
    pub fn per_step(&self) -> bool {
        matches!(self, Self::Percent | Self::Detailed)
    }
}

impl FromStr for ProgressMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "normal" => Ok(Self::Normal),
            "percent" => Ok(Self::Percent),
            "detailed" => Ok(Self::Detailed),
            other => Err(ConfigError::InvalidValue {
                name: "progress",
                reason: format!("unrecognised mode '{other}'"),
            }),
        }
    }
}

impl fmt::Display for ProgressMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "none",
            Self::Normal => "normal",
            Self::Percent => "percent",
            Self::Detailed => "detailed",
        };
        f.write_str(s)
    }
}

// ── IntegratorConfig ───────────────────────────────────────────────

/// Step-size control parameters of the adaptive integrator.
#[derive(Clone, Debug, PartialEq)]
pub struct IntegratorConfig {
    /// First proposed step. Default: 1e-4.
    pub initial_step: f64,
    /// Hard upper bound on any step. Default: `f64::INFINITY`.
    pub max_step: f64,
    /// A proposed step below this aborts the run. Default: 1e-10.
    pub min_step: f64,
    /// Largest accepted per-point error estimate, in grid units. Default: 0.01.
    pub target_error: f64,
    /// Safety factor applied to the optimal step ratio. Default: 0.9.
    pub safety: f64,
    /// Largest step growth per accepted step. Default: 4.0.
    pub max_growth: f64,
    /// Smallest step ratio after a rejection. Default: 0.1.
    pub min_shrink: f64,
    /// Largest relative change of the cached velocity field across one
    /// step. Bounds the error of interpolating the field linearly in time,
    /// which the position error estimate cannot see. Default: 0.2.
    pub max_field_change: f64,
}

impl IntegratorConfig {
    /// Default first step.
    pub const DEFAULT_INITIAL_STEP: f64 = 1e-4;
    /// Default collapse threshold.
    pub const DEFAULT_MIN_STEP: f64 = 1e-10;
    /// Default error tolerance.
    pub const DEFAULT_TARGET_ERROR: f64 = 0.01;
    /// Default safety factor.
    pub const DEFAULT_SAFETY: f64 = 0.9;
    /// Default growth cap.
    pub const DEFAULT_MAX_GROWTH: f64 = 4.0;
    /// Default shrink floor.
    pub const DEFAULT_MIN_SHRINK: f64 = 0.1;
    /// Default field-change cap.
    pub const DEFAULT_MAX_FIELD_CHANGE: f64 = 0.2;

    /// Check every parameter is in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive_finite("initial_step", self.initial_step)?;
        positive_finite("min_step", self.min_step)?;
        positive_finite("target_error", self.target_error)?;
        if self.max_step.is_nan() || self.max_step <= 0.0 {
            return Err(ConfigError::InvalidValue {
                name: "max_step",
                reason: format!("must be > 0, got {}", self.max_step),
            });
        }
        if self.min_step > self.max_step {
            return Err(ConfigError::InvalidValue {
                name: "min_step",
                reason: format!(
                    "{} exceeds max_step {}",
                    self.min_step, self.max_step
                ),
            });
        }
        if !(self.safety > 0.0 && self.safety <= 1.0) {
            return Err(ConfigError::InvalidValue {
                name: "safety",
                reason: format!("must be in (0, 1], got {}", self.safety),
            });
        }
        if !(self.max_growth > 1.0) || !self.max_growth.is_finite() {
            return Err(ConfigError::InvalidValue {
                name: "max_growth",
                reason: format!("must be finite and > 1, got {}", self.max_growth),
            });
        }
        if !(self.min_shrink > 0.0 && self.min_shrink < 1.0) {
            return Err(ConfigError::InvalidValue {
                name: "min_shrink",
                reason: format!("must be in (0, 1), got {}", self.min_shrink),
            });
        }
        if !(self.max_field_change > 0.0) {
            return Err(ConfigError::InvalidValue {
                name: "max_field_change",
                reason: format!("must be > 0, got {}", self.max_field_change),
            });
        }
        Ok(())
    }
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self {
            initial_step: Self::DEFAULT_INITIAL_STEP,
            max_step: f64::INFINITY,
            min_step: Self::DEFAULT_MIN_STEP,
            target_error: Self::DEFAULT_TARGET_ERROR,
            safety: Self::DEFAULT_SAFETY,
            max_growth: Self::DEFAULT_MAX_GROWTH,
            min_shrink: Self::DEFAULT_MIN_SHRINK,
            max_field_change: Self::DEFAULT_MAX_FIELD_CHANGE,
        }
    }
}

// ── CartogramConfig ────────────────────────────────────────────────

/// Everything one cartogram transform reads.
#[derive(Clone, Debug, PartialEq)]
pub struct CartogramConfig {
    /// Pre-smoothing width in grid units. Default: 0.0.
    pub blur: f64,
    /// Progress reporting mode. Default: [`ProgressMode::Normal`].
    pub progress: ProgressMode,
    /// Persist the density after every accepted step. Default: false.
    pub intermediate: bool,
    /// Integrator tuning, including the step cap.
    pub integrator: IntegratorConfig,
    /// Diffusion run by fictitious time 1, in e-foldings of the slowest
    /// mode. Default: [`CartogramConfig::DEFAULT_HORIZON`].
    pub horizon: f64,
    /// Velocity density floor as a fraction of the mean density.
    /// Default: [`CartogramConfig::DEFAULT_DENSITY_FLOOR`].
    pub density_floor: f64,
}

impl Default for CartogramConfig {
    fn default() -> Self {
        Self {
            blur: 0.0,
            progress: ProgressMode::default(),
            intermediate: false,
            integrator: IntegratorConfig::default(),
            horizon: Self::DEFAULT_HORIZON,
            density_floor: Self::DEFAULT_DENSITY_FLOOR,
        }
    }
}

impl CartogramConfig {
    /// Default density floor fraction.
    pub const DEFAULT_DENSITY_FLOOR: f64 = 1e-6;
    /// Default horizon: the slowest mode is down by `e^-12` at time 1.
    pub const DEFAULT_HORIZON: f64 = 12.0;

    /// Set the step cap.
    pub fn with_max_step(mut self, max_step: f64) -> Self {
        self.integrator.max_step = max_step;
        self
    }

    /// Set the blur width.
    pub fn with_blur(mut self, blur: f64) -> Self {
        self.blur = blur;
        self
    }

    /// Set the diffusion horizon.
    pub fn with_horizon(mut self, horizon: f64) -> Self {
        self.horizon = horizon;
        self
    }

    /// Set the progress mode.
    pub fn with_progress(mut self, progress: ProgressMode) -> Self {
        self.progress = progress;
        self
    }

    /// Check every parameter is in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.blur >= 0.0) || !self.blur.is_finite() {
            return Err(ConfigError::InvalidValue {
                name: "blur",
                reason: format!("must be finite and >= 0, got {}", self.blur),
            });
        }
        positive_finite("density_floor", self.density_floor)?;
        positive_finite("horizon", self.horizon)?;
        self.integrator.validate()
    }
}

fn positive_finite(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            name,
            reason: format!("must be finite and > 0, got {value}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(CartogramConfig::default().validate().is_ok());
        assert_eq!(CartogramConfig::default().progress, ProgressMode::Normal);
        assert!(CartogramConfig::default().integrator.max_step.is_infinite());
    }

    #[test]
    fn progress_mode_round_trips_names() {
        for mode in [
            ProgressMode::None,
            ProgressMode::Normal,
            ProgressMode::Percent,
            ProgressMode::Detailed,
        ] {
            assert_eq!(mode.to_string().parse::<ProgressMode>().unwrap(), mode);
        }
        assert!("verbose".parse::<ProgressMode>().is_err());
    }

    #[test]
    fn negative_blur_rejected() {
        let err = CartogramConfig::default().with_blur(-1.0).validate().unwrap_err();
        assert!(err.to_string().contains("blur"), "{err}");
    }

    #[test]
    fn zero_max_step_rejected() {
        assert!(CartogramConfig::default().with_max_step(0.0).validate().is_err());
    }

    #[test]
    fn min_step_above_cap_rejected() {
        let cfg = IntegratorConfig {
            max_step: 1e-3,
            min_step: 1e-2,
            ..Default::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { name: "min_step", .. }));
    }

    #[test]
    fn growth_must_exceed_one() {
        let cfg = IntegratorConfig {
            max_growth: 1.0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn safety_outside_unit_interval_rejected() {
        for safety in [0.0, 1.5, f64::NAN] {
            let cfg = IntegratorConfig {
                safety,
                ..Default::default()
            };
            assert!(cfg.validate().is_err(), "safety {safety} accepted");
        }
    }

    #[test]
    fn horizon_must_be_positive() {
        for horizon in [0.0, -3.0, f64::INFINITY] {
            let err = CartogramConfig::default()
                .with_horizon(horizon)
                .validate()
                .unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue { name: "horizon", .. }));
        }
    }

    #[test]
    fn field_change_cap_may_be_disabled_but_not_zero() {
        let open = IntegratorConfig {
            max_field_change: f64::INFINITY,
            ..Default::default()
        };
        assert!(open.validate().is_ok());
        for cap in [0.0, f64::NAN] {
            let cfg = IntegratorConfig {
                max_field_change: cap,
                ..Default::default()
            };
            assert!(cfg.validate().is_err(), "cap {cap} accepted");
        }
    }

    #[test]
    fn zero_density_floor_rejected() {
        let cfg = CartogramConfig {
            density_floor: 0.0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }
}
