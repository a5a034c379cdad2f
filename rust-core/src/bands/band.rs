//! A single frequency band and its mapping onto Fourier coefficients

use crate::error::{Result, WindowingError};
use serde::{Deserialize, Serialize};

/// Which band edges belong to the band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Closed {
    /// [lower, upper)
    #[default]
    Left,

    /// (lower, upper]
    Right,

    /// [lower, upper]
    Both,
}

/// How the band center is computed from the edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AverageType {
    /// √(lower·upper)
    #[default]
    Geometric,

    /// (lower + upper)/2
    Arithmetic,
}

/// Frequency interval used to aggregate Fourier coefficients
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BandFields")]
pub struct FrequencyBand {
    lower_bound: f64,
    upper_bound: f64,
    closed: Closed,
    average_type: AverageType,
}

/// Unvalidated serialized form
#[derive(Deserialize)]
struct BandFields {
    lower_bound: f64,
    upper_bound: f64,
    #[serde(default)]
    closed: Closed,
    #[serde(default)]
    average_type: AverageType,
}

impl TryFrom<BandFields> for FrequencyBand {
    type Error = WindowingError;

    fn try_from(fields: BandFields) -> Result<Self> {
        Self::with_options(fields.lower_bound, fields.upper_bound, fields.closed, fields.average_type)
    }
}

impl FrequencyBand {
    /// Left-closed band with a geometric center
    pub fn new(lower_bound: f64, upper_bound: f64) -> Result<Self> {
        Self::with_options(lower_bound, upper_bound, Closed::default(), AverageType::default())
    }

    pub fn with_options(
        lower_bound: f64,
        upper_bound: f64,
        closed: Closed,
        average_type: AverageType,
    ) -> Result<Self> {
        if lower_bound.is_nan() || upper_bound.is_nan() || lower_bound > upper_bound {
            return Err(WindowingError::InvalidFrequencyBand {
                lower: lower_bound,
                upper: upper_bound,
            });
        }
        if lower_bound == upper_bound {
            log::warn!("degenerate frequency band: both edges at {lower_bound}");
        }

        Ok(Self {
            lower_bound,
            upper_bound,
            closed,
            average_type,
        })
    }

    pub fn lower_bound(&self) -> f64 {
        self.lower_bound
    }

    pub fn upper_bound(&self) -> f64 {
        self.upper_bound
    }

    pub fn closed(&self) -> Closed {
        self.closed
    }

    pub fn average_type(&self) -> AverageType {
        self.average_type
    }

    pub fn is_degenerate(&self) -> bool {
        self.lower_bound == self.upper_bound
    }

    pub fn width(&self) -> f64 {
        self.upper_bound - self.lower_bound
    }

    pub fn center_frequency(&self) -> f64 {
        match self.average_type {
            AverageType::Geometric => (self.lower_bound * self.upper_bound).sqrt(),
            AverageType::Arithmetic => (self.lower_bound + self.upper_bound) / 2.0,
        }
    }

    /// Whether `frequency` lies in the band under its closure rule
    pub fn contains(&self, frequency: f64) -> bool {
        let (lo, hi) = (self.lower_bound, self.upper_bound);
        match self.closed {
            Closed::Left => lo <= frequency && frequency < hi,
            Closed::Right => lo < frequency && frequency <= hi,
            Closed::Both => lo <= frequency && frequency <= hi,
        }
    }

    /// Indices of the frequencies that fall inside the band
    ///
    /// # Arguments
    /// * `frequencies` - Frequency axis, e.g. the harmonics of an STFT
    pub fn fourier_coefficient_indices(&self, frequencies: &[f64]) -> Vec<usize> {
        frequencies
            .iter()
            .enumerate()
            .filter(|&(_, &f)| self.contains(f))
            .map(|(i, _)| i)
            .collect()
    }
}
