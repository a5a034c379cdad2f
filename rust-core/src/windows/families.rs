//! Taper (apodization window) families
//!
//! Every family is defined by its symmetric form of length M. Periodic tapers,
//! the usual choice ahead of an FFT, are the symmetric taper of length M+1 with
//! the final sample dropped.

use crate::error::{Result, WindowingError};
use rustfft::{num_complex::Complex, FftPlanner};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Taper families together with their shape parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TaperFamily {
    /// Rectangular window: w[n] = 1
    Boxcar,

    /// Triangle with non-zero endpoints
    Triangular,

    /// Hann window: w[n] = 0.5 - 0.5*cos(2πn/(M-1))
    Hann,

    /// Hamming window: w[n] = 0.54 - 0.46*cos(2πn/(M-1))
    Hamming,

    /// Blackman window: w[n] = 0.42 - 0.5*cos(2πn/(M-1)) + 0.08*cos(4πn/(M-1))
    Blackman,

    /// Kaiser window with shape parameter `beta`
    Kaiser { beta: f64 },

    /// Gaussian window with standard deviation `std` (in samples)
    Gaussian { std: f64 },

    /// Generalized gaussian: w[n] = exp(-0.5*|n/width|^(2*power))
    GeneralizedGaussian { power: f64, width: f64 },

    /// First discrete prolate spheroidal sequence for bandwidth `width`
    Slepian { width: f64 },

    /// Dolph-Chebyshev window with sidelobe `attenuation` in dB
    Chebyshev { attenuation: f64 },
}

impl TaperFamily {
    /// Build a family from its name and ordered extra arguments
    ///
    /// # Arguments
    /// * `name` - Family name (case-insensitive, common aliases accepted)
    /// * `additional_args` - Shape parameters as (name, value) pairs
    pub fn from_name_and_args(name: &str, additional_args: &[(String, f64)]) -> Result<Self> {
        let kind = FamilyKind::from_str(name)?;
        let args = TaperArgs {
            family: kind.name(),
            args: additional_args,
        };

        let family = match kind {
            FamilyKind::Boxcar => TaperFamily::Boxcar,
            FamilyKind::Triangular => TaperFamily::Triangular,
            FamilyKind::Hann => TaperFamily::Hann,
            FamilyKind::Hamming => TaperFamily::Hamming,
            FamilyKind::Blackman => TaperFamily::Blackman,
            FamilyKind::Kaiser => TaperFamily::Kaiser {
                beta: args.required("beta", &[])?,
            },
            FamilyKind::Gaussian => TaperFamily::Gaussian {
                std: args.required("std", &["sigma"])?,
            },
            FamilyKind::GeneralizedGaussian => TaperFamily::GeneralizedGaussian {
                power: args.required("power", &["p"])?,
                width: args.required("width", &["sig"])?,
            },
            FamilyKind::Slepian => TaperFamily::Slepian {
                width: args.required("width", &[])?,
            },
            FamilyKind::Chebyshev => TaperFamily::Chebyshev {
                attenuation: args.required("attenuation", &["at"])?,
            },
        };

        args.reject_unknown(kind.argument_names())?;
        Ok(family)
    }

    /// Canonical family name
    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Shape parameters in their canonical order
    pub fn additional_args(&self) -> Vec<(String, f64)> {
        let values: Vec<f64> = match *self {
            TaperFamily::Kaiser { beta } => vec![beta],
            TaperFamily::Gaussian { std } => vec![std],
            TaperFamily::GeneralizedGaussian { power, width } => vec![power, width],
            TaperFamily::Slepian { width } => vec![width],
            TaperFamily::Chebyshev { attenuation } => vec![attenuation],
            _ => Vec::new(),
        };

        self.kind()
            .argument_names()
            .iter()
            .zip(values)
            .map(|(name, value)| (name.to_string(), value))
            .collect()
    }

    fn kind(&self) -> FamilyKind {
        match self {
            TaperFamily::Boxcar => FamilyKind::Boxcar,
            TaperFamily::Triangular => FamilyKind::Triangular,
            TaperFamily::Hann => FamilyKind::Hann,
            TaperFamily::Hamming => FamilyKind::Hamming,
            TaperFamily::Blackman => FamilyKind::Blackman,
            TaperFamily::Kaiser { .. } => FamilyKind::Kaiser,
            TaperFamily::Gaussian { .. } => FamilyKind::Gaussian,
            TaperFamily::GeneralizedGaussian { .. } => FamilyKind::GeneralizedGaussian,
            TaperFamily::Slepian { .. } => FamilyKind::Slepian,
            TaperFamily::Chebyshev { .. } => FamilyKind::Chebyshev,
        }
    }
}

impl fmt::Display for TaperFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())?;
        let args = self.additional_args();
        if !args.is_empty() {
            let rendered: Vec<String> = args.iter().map(|(k, v)| format!("{k}={v}")).collect();
            write!(f, "({})", rendered.join(", "))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FamilyKind {
    Boxcar,
    Triangular,
    Hann,
    Hamming,
    Blackman,
    Kaiser,
    Gaussian,
    GeneralizedGaussian,
    Slepian,
    Chebyshev,
}

impl FamilyKind {
    fn name(self) -> &'static str {
        match self {
            FamilyKind::Boxcar => "boxcar",
            FamilyKind::Triangular => "triangular",
            FamilyKind::Hann => "hann",
            FamilyKind::Hamming => "hamming",
            FamilyKind::Blackman => "blackman",
            FamilyKind::Kaiser => "kaiser",
            FamilyKind::Gaussian => "gaussian",
            FamilyKind::GeneralizedGaussian => "generalized-gaussian",
            FamilyKind::Slepian => "slepian",
            FamilyKind::Chebyshev => "chebyshev",
        }
    }

    fn argument_names(self) -> &'static [&'static str] {
        match self {
            FamilyKind::Kaiser => &["beta"],
            FamilyKind::Gaussian => &["std"],
            FamilyKind::GeneralizedGaussian => &["power", "width"],
            FamilyKind::Slepian => &["width"],
            FamilyKind::Chebyshev => &["attenuation"],
            _ => &[],
        }
    }
}

impl FromStr for FamilyKind {
    type Err = WindowingError;

    fn from_str(s: &str) -> Result<Self> {
        let kind = match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "boxcar" | "rectangular" | "rect" => FamilyKind::Boxcar,
            "triangular" | "triang" | "triangle" => FamilyKind::Triangular,
            "hann" | "hanning" => FamilyKind::Hann,
            "hamming" => FamilyKind::Hamming,
            "blackman" => FamilyKind::Blackman,
            "kaiser" => FamilyKind::Kaiser,
            "gaussian" => FamilyKind::Gaussian,
            "generalized-gaussian" | "general-gaussian" => FamilyKind::GeneralizedGaussian,
            "slepian" => FamilyKind::Slepian,
            "chebyshev" | "chebwin" => FamilyKind::Chebyshev,
            _ => return Err(WindowingError::UnsupportedWindowFamily(s.to_string())),
        };
        Ok(kind)
    }
}

/// Lookup over the (name, value) pairs handed to a family
struct TaperArgs<'a> {
    family: &'static str,
    args: &'a [(String, f64)],
}

impl TaperArgs<'_> {
    fn required(&self, name: &'static str, aliases: &[&str]) -> Result<f64> {
        self.args
            .iter()
            .find(|(key, _)| key == name || aliases.contains(&key.as_str()))
            .map(|&(_, value)| value)
            .ok_or(WindowingError::MissingTaperArgument {
                family: self.family,
                argument: name,
            })
    }

    fn reject_unknown(&self, accepted: &[&str]) -> Result<()> {
        const ALIASES: [(&str, &str); 4] = [("sigma", "std"), ("p", "power"), ("sig", "width"), ("at", "attenuation")];

        for (key, _) in self.args {
            let canonical = ALIASES
                .iter()
                .find(|(alias, _)| alias == key)
                .map_or(key.as_str(), |&(_, name)| name);
            if !accepted.contains(&canonical) {
                return Err(WindowingError::UnexpectedTaperArgument {
                    family: self.family,
                    argument: key.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Generate taper coefficients
///
/// # Arguments
/// * `family` - Taper family and shape parameters
/// * `length` - Number of samples (M)
/// * `periodic` - Drop the last sample of an (M+1)-point symmetric taper
///
/// # Returns
/// Vector of taper coefficients w[n] for n = 0..M-1
pub fn generate_taper(family: TaperFamily, length: usize, periodic: bool) -> Vec<f64> {
    if length <= 1 {
        return vec![1.0; length];
    }

    if !periodic {
        return symmetric_taper(family, length);
    }

    let mut taper = symmetric_taper(family, length + 1);
    taper.pop();
    taper
}

fn symmetric_taper(family: TaperFamily, length: usize) -> Vec<f64> {
    let m = length as f64;

    match family {
        TaperFamily::Boxcar => vec![1.0; length],

        TaperFamily::Triangular => (0..length)
            .map(|n| {
                // Distance from the center, scaled so the endpoints stay non-zero
                let half_width = if length % 2 == 0 { m / 2.0 } else { (m + 1.0) / 2.0 };
                1.0 - (n as f64 - (m - 1.0) / 2.0).abs() / half_width
            })
            .collect(),

        TaperFamily::Hann => cosine_sum(&[0.5, 0.5], length),

        TaperFamily::Hamming => cosine_sum(&[0.54, 0.46], length),

        TaperFamily::Blackman => cosine_sum(&[0.42, 0.5, 0.08], length),

        TaperFamily::Kaiser { beta } => {
            let alpha = (m - 1.0) / 2.0;
            let norm = bessel_i0(beta);
            (0..length)
                .map(|n| {
                    let r = (n as f64 - alpha) / alpha;
                    bessel_i0(beta * (1.0 - r * r).max(0.0).sqrt()) / norm
                })
                .collect()
        }

        TaperFamily::Gaussian { std } => centered(length)
            .map(|n| (-0.5 * (n / std).powi(2)).exp())
            .collect(),

        TaperFamily::GeneralizedGaussian { power, width } => centered(length)
            .map(|n| (-0.5 * (n / width).abs().powf(2.0 * power)).exp())
            .collect(),

        TaperFamily::Slepian { width } => slepian(length, width),

        TaperFamily::Chebyshev { attenuation } => chebyshev(length, attenuation),
    }
}

/// Sample offsets from the taper center
fn centered(length: usize) -> impl Iterator<Item = f64> {
    let center = (length as f64 - 1.0) / 2.0;
    (0..length).map(move |n| n as f64 - center)
}

/// Alternating-sign cosine sum: w[n] = a0 - a1*cos(2πn/(M-1)) + a2*cos(4πn/(M-1)) - ...
fn cosine_sum(coefficients: &[f64], length: usize) -> Vec<f64> {
    let m = length as f64;
    (0..length)
        .map(|n| {
            let angle = 2.0 * PI * n as f64 / (m - 1.0);
            coefficients
                .iter()
                .enumerate()
                .map(|(k, &a)| {
                    let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
                    sign * a * (k as f64 * angle).cos()
                })
                .sum()
        })
        .collect()
}

/// Modified Bessel function of the first kind, order 0 (power series)
fn bessel_i0(x: f64) -> f64 {
    let half = x / 2.0;
    let mut term = 1.0;
    let mut sum = 1.0;
    let mut k = 1.0;
    loop {
        term *= (half / k) * (half / k);
        sum += term;
        if term < sum * 1e-17 {
            return sum;
        }
        k += 1.0;
    }
}

/// First DPSS via the tridiagonal matrix that commutes with the sinc kernel
///
/// The sinc kernel has entries 2F*sinc(2F(n-k)) with 2F = width/2, i.e. a
/// half-bandwidth W = width/4 in cycles per sample.
fn slepian(length: usize, width: f64) -> Vec<f64> {
    let m = length as f64;
    let half_bandwidth = width / 4.0;
    let c = (2.0 * PI * half_bandwidth).cos();

    let diagonal: Vec<f64> = (0..length)
        .map(|n| ((m - 1.0 - 2.0 * n as f64) / 2.0).powi(2) * c)
        .collect();
    let off_diagonal: Vec<f64> = (1..length)
        .map(|n| n as f64 * (m - n as f64) / 2.0)
        .collect();

    let lambda = largest_tridiagonal_eigenvalue(&diagonal, &off_diagonal);
    let mut v = tridiagonal_inverse_iteration(&diagonal, &off_diagonal, lambda);

    for x in v.iter_mut() {
        *x = x.abs();
    }
    normalize_peak(&mut v);
    v
}

/// Number of eigenvalues of the symmetric tridiagonal matrix below `x` (Sturm count)
fn eigenvalues_below(diagonal: &[f64], off_diagonal: &[f64], x: f64) -> usize {
    let mut count = 0;
    let mut q = 1.0;
    for (i, &d) in diagonal.iter().enumerate() {
        let coupling = if i == 0 { 0.0 } else { off_diagonal[i - 1].powi(2) / q };
        q = d - x - coupling;
        if q == 0.0 {
            q = -f64::EPSILON * (d.abs() + x.abs() + 1.0);
        }
        if q < 0.0 {
            count += 1;
        }
    }
    count
}

fn largest_tridiagonal_eigenvalue(diagonal: &[f64], off_diagonal: &[f64]) -> f64 {
    let n = diagonal.len();
    let radius = |i: usize| {
        let left = if i > 0 { off_diagonal[i - 1].abs() } else { 0.0 };
        let right = if i + 1 < n { off_diagonal[i].abs() } else { 0.0 };
        left + right
    };

    // Gershgorin bounds
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for (i, &d) in diagonal.iter().enumerate() {
        lo = lo.min(d - radius(i));
        hi = hi.max(d + radius(i));
    }

    // Smallest x with every eigenvalue below it converges on the largest eigenvalue
    for _ in 0..200 {
        let mid = 0.5 * (lo + hi);
        if mid <= lo || mid >= hi {
            break;
        }
        if eigenvalues_below(diagonal, off_diagonal, mid) == n {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    hi
}

fn tridiagonal_inverse_iteration(diagonal: &[f64], off_diagonal: &[f64], lambda: f64) -> Vec<f64> {
    let n = diagonal.len();
    let scale = diagonal
        .iter()
        .chain(off_diagonal)
        .fold(1.0_f64, |acc, &v| acc.max(v.abs()));
    let shift = lambda + scale * 1e-12;

    let mut v = vec![1.0 / (n as f64).sqrt(); n];
    for _ in 0..4 {
        v = solve_shifted_tridiagonal(diagonal, off_diagonal, shift, &v);
        let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
        if norm == 0.0 || !norm.is_finite() {
            break;
        }
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
    v
}

/// Thomas algorithm for (T - shift*I) x = rhs
fn solve_shifted_tridiagonal(diagonal: &[f64], off_diagonal: &[f64], shift: f64, rhs: &[f64]) -> Vec<f64> {
    let n = diagonal.len();
    let tiny = f64::EPSILON * (1.0 + shift.abs());
    let mut c_prime = vec![0.0; n];
    let mut d_prime = vec![0.0; n];

    let mut pivot = diagonal[0] - shift;
    for i in 0..n {
        if i > 0 {
            pivot = diagonal[i] - shift - off_diagonal[i - 1] * c_prime[i - 1];
        }
        if pivot.abs() < tiny {
            pivot = tiny;
        }
        let upper = if i + 1 < n { off_diagonal[i] } else { 0.0 };
        c_prime[i] = upper / pivot;
        let carried = if i > 0 { off_diagonal[i - 1] * d_prime[i - 1] } else { 0.0 };
        d_prime[i] = (rhs[i] - carried) / pivot;
    }

    let mut x = vec![0.0; n];
    x[n - 1] = d_prime[n - 1];
    for i in (0..n - 1).rev() {
        x[i] = d_prime[i] - c_prime[i] * x[i + 1];
    }
    x
}

/// Dolph-Chebyshev taper from a DFT of the Chebyshev polynomial samples
fn chebyshev(length: usize, attenuation: f64) -> Vec<f64> {
    let m = length as f64;
    let order = m - 1.0;
    let beta = ((10f64.powf(attenuation.abs() / 20.0)).acosh() / order).cosh();
    let odd = length % 2 == 1;

    let mut spectrum: Vec<Complex<f64>> = (0..length)
        .map(|k| {
            let x = beta * (PI * k as f64 / m).cos();
            let p = if x > 1.0 {
                (order * x.acosh()).cosh()
            } else if x < -1.0 {
                let sign = if odd { 1.0 } else { -1.0 };
                sign * (order * (-x).acosh()).cosh()
            } else {
                (order * x.acos()).cos()
            };
            if odd {
                Complex::new(p, 0.0)
            } else {
                // Half-sample shift keeps even-length tapers symmetric
                Complex::from_polar(p, PI / m * k as f64)
            }
        })
        .collect();

    let mut planner = FftPlanner::new();
    planner.plan_fft_forward(length).process(&mut spectrum);
    let re: Vec<f64> = spectrum.iter().map(|c| c.re).collect();

    let mut taper = if odd {
        let half = (length + 1) / 2;
        let mut w: Vec<f64> = re[1..half].iter().rev().copied().collect();
        w.extend_from_slice(&re[..half]);
        w
    } else {
        let half = length / 2 + 1;
        let mut w: Vec<f64> = re[1..half].iter().rev().copied().collect();
        w.extend_from_slice(&re[1..half]);
        w
    };

    normalize_peak(&mut taper);
    taper
}

fn normalize_peak(taper: &mut [f64]) {
    let peak = taper.iter().fold(0.0_f64, |acc, &v| acc.max(v));
    if peak > 0.0 {
        for v in taper.iter_mut() {
            *v /= peak;
        }
    }
}
