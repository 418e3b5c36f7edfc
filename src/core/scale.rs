use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::types::{Axis, Domain};
use crate::error::{ChartError, ChartResult};

/// Continuous mapping family.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScaleKind {
    #[default]
    Linear,
    /// Natural-log spacing; the domain must stay on one side of zero.
    Log,
    /// Linear over epoch milliseconds.
    Time,
    /// Signed power mapping `sign(v) * |v|^exponent`.
    Pow { exponent: f64 },
}

impl ScaleKind {
    #[must_use]
    pub fn is_log(self) -> bool {
        matches!(self, Self::Log)
    }

    fn transform(self, value: f64) -> f64 {
        match self {
            Self::Linear | Self::Time => value,
            Self::Log => {
                if value < 0.0 {
                    -(-value).ln()
                } else {
                    value.ln()
                }
            }
            Self::Pow { exponent } => value.signum() * value.abs().powf(exponent),
        }
    }

    fn untransform(self, value: f64) -> f64 {
        match self {
            Self::Linear | Self::Time => value,
            // Sign of the domain is restored by the caller.
            Self::Log => value.exp(),
            Self::Pow { exponent } => value.signum() * value.abs().powf(exponent.recip()),
        }
    }
}

/// Value-to-pixel capability consumed by the engine.
///
/// Hosts may supply their own implementation; [`ContinuousScale`] covers
/// the linear, log, time and pow families.
pub trait Scale: fmt::Debug + Send + Sync {
    fn kind(&self) -> ScaleKind;
    fn domain(&self) -> Domain;
    fn range(&self) -> (f64, f64);
    fn apply(&self, value: f64) -> f64;
    fn invert(&self, pixel: f64) -> f64;
    fn with_domain(&self, domain: Domain) -> ChartResult<Arc<dyn Scale>>;
    fn with_range(&self, range: (f64, f64)) -> ChartResult<Arc<dyn Scale>>;

    /// Pixel extent of the range.
    fn range_extent(&self) -> f64 {
        let (start, end) = self.range();
        (end - start).abs()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContinuousScale {
    kind: ScaleKind,
    domain: Domain,
    range: (f64, f64),
}

impl ContinuousScale {
    pub fn new(domain: Domain, range: (f64, f64), kind: ScaleKind) -> ChartResult<Self> {
        if !domain.start.is_finite() || !domain.end.is_finite() {
            return Err(ChartError::InvalidScale(
                "scale domain must be finite".to_owned(),
            ));
        }
        if !range.0.is_finite() || !range.1.is_finite() {
            return Err(ChartError::InvalidScale(
                "scale range must be finite".to_owned(),
            ));
        }
        if kind.is_log() && (domain.min() <= 0.0 && domain.max() >= 0.0) {
            return Err(ChartError::InvalidScale(
                "log scale domain must not include zero".to_owned(),
            ));
        }
        if let ScaleKind::Pow { exponent } = kind
            && (!exponent.is_finite() || exponent == 0.0)
        {
            return Err(ChartError::InvalidScale(
                "pow scale exponent must be finite and non-zero".to_owned(),
            ));
        }
        Ok(Self {
            kind,
            domain,
            range,
        })
    }

    #[must_use]
    pub fn into_shared(self) -> Arc<dyn Scale> {
        Arc::new(self)
    }

    fn transformed_domain(&self) -> (f64, f64) {
        (
            self.kind.transform(self.domain.start),
            self.kind.transform(self.domain.end),
        )
    }
}

impl Scale for ContinuousScale {
    fn kind(&self) -> ScaleKind {
        self.kind
    }

    fn domain(&self) -> Domain {
        self.domain
    }

    fn range(&self) -> (f64, f64) {
        self.range
    }

    fn apply(&self, value: f64) -> f64 {
        let (t0, t1) = self.transformed_domain();
        let (r0, r1) = self.range;
        if t1 == t0 {
            return (r0 + r1) / 2.0;
        }
        r0 + (self.kind.transform(value) - t0) / (t1 - t0) * (r1 - r0)
    }

    fn invert(&self, pixel: f64) -> f64 {
        let (t0, t1) = self.transformed_domain();
        let (r0, r1) = self.range;
        if r1 == r0 {
            return self.domain.start;
        }
        let transformed = t0 + (pixel - r0) / (r1 - r0) * (t1 - t0);
        let value = self.kind.untransform(transformed);
        if self.kind.is_log() && self.domain.max() < 0.0 {
            -self.kind.untransform(-transformed)
        } else {
            value
        }
    }

    fn with_domain(&self, domain: Domain) -> ChartResult<Arc<dyn Scale>> {
        Ok(Self::new(domain, self.range, self.kind)?.into_shared())
    }

    fn with_range(&self, range: (f64, f64)) -> ChartResult<Arc<dyn Scale>> {
        Ok(Self::new(self.domain, range, self.kind)?.into_shared())
    }
}

/// Builds a scale from a computed domain and pixel range.
pub fn compute_scale(
    domain: Domain,
    range: (f64, f64),
    kind: ScaleKind,
) -> ChartResult<ContinuousScale> {
    ContinuousScale::new(domain, range, kind)
}

/// Active x/y scales handed to series and containers.
#[derive(Debug, Clone)]
pub struct ScalePair {
    pub x: Arc<dyn Scale>,
    pub y: Arc<dyn Scale>,
}

impl ScalePair {
    #[must_use]
    pub fn new(x: Arc<dyn Scale>, y: Arc<dyn Scale>) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn get(&self, axis: Axis) -> &Arc<dyn Scale> {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
        }
    }
}
