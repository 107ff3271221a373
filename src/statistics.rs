//! Summary statistics and Welch's unequal-variance t-test.

use serde::Serialize;

/// Arithmetic mean; NaN for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divides by `n`); NaN for an empty slice.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let m = mean(values);
    let variance = values.iter().map(|&x| (x - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Unbiased sample variance (divides by `n - 1`); NaN below two samples.
pub fn sample_variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    values.iter().map(|&x| (x - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct WelchTest {
    pub t: f64,
    pub df: f64,
    /// Two-sided p-value
    pub p_value: f64,
}

/// Welch's two-sample t-test, not assuming equal variances.
///
/// Every field is NaN when either sample has fewer than two values or both
/// samples have zero variance.
pub fn welch_t_test(a: &[f64], b: &[f64]) -> WelchTest {
    let nan = WelchTest {
        t: f64::NAN,
        df: f64::NAN,
        p_value: f64::NAN,
    };
    if a.len() < 2 || b.len() < 2 {
        return nan;
    }

    let (na, nb) = (a.len() as f64, b.len() as f64);
    let sa = sample_variance(a) / na;
    let sb = sample_variance(b) / nb;
    let se2 = sa + sb;
    if se2 == 0.0 {
        return nan;
    }

    let t = (mean(a) - mean(b)) / se2.sqrt();
    let df = se2 * se2 / (sa * sa / (na - 1.0) + sb * sb / (nb - 1.0));
    WelchTest {
        t,
        df,
        p_value: student_t_two_sided(t, df),
    }
}

/// `P(|T| >= |t|)` for Student's t with `df` degrees of freedom.
pub fn student_t_two_sided(t: f64, df: f64) -> f64 {
    if t.is_nan() || df.is_nan() || df <= 0.0 {
        return f64::NAN;
    }
    if t.is_infinite() {
        return 0.0;
    }
    regularized_incomplete_beta(df / 2.0, 0.5, df / (df + t * t))
}

/// `I_x(a, b)`, evaluated with the continued fraction on whichever side converges.
pub fn regularized_incomplete_beta(a: f64, b: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    let front = (ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln()).exp();
    if x < (a + 1.0) / (a + b + 2.0) {
        front * beta_continued_fraction(a, b, x) / a
    } else {
        1.0 - front * beta_continued_fraction(b, a, 1.0 - x) / b
    }
}

fn beta_continued_fraction(a: f64, b: f64, x: f64) -> f64 {
    const MAX_ITERATIONS: usize = 300;
    const EPS: f64 = 3e-16;
    const FPMIN: f64 = 1e-300;

    let guard = |v: f64| if v.abs() < FPMIN { FPMIN } else { v };

    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;
    let mut c = 1.0;
    let mut d = 1.0 / guard(1.0 - qab * x / qap);
    let mut h = d;

    for m in 1..=MAX_ITERATIONS {
        let m = m as f64;
        let m2 = 2.0 * m;

        let aa = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 / guard(1.0 + aa * d);
        c = guard(1.0 + aa / c);
        h *= d * c;

        let aa = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 / guard(1.0 + aa * d);
        c = guard(1.0 + aa / c);
        let delta = d * c;
        h *= delta;

        if (delta - 1.0).abs() < EPS {
            break;
        }
    }
    h
}

/// Lanczos approximation (g = 7, n = 9).
pub fn ln_gamma(x: f64) -> f64 {
    const COEFFS: [f64; 9] = [
        0.999_999_999_999_809_93,
        676.520_368_121_885_1,
        -1_259.139_216_722_402_8,
        771.323_428_777_653_13,
        -176.615_029_162_140_59,
        12.507_343_278_686_905,
        -0.138_571_095_265_720_12,
        9.984_369_578_019_571_6e-6,
        1.505_632_735_149_311_6e-7,
    ];

    if x < 0.5 {
        let pi = std::f64::consts::PI;
        return (pi / (pi * x).sin().abs()).ln() - ln_gamma(1.0 - x);
    }
    let x = x - 1.0;
    let t = x + 7.5;
    let series = COEFFS[1..]
        .iter()
        .enumerate()
        .fold(COEFFS[0], |acc, (i, &c)| acc + c / (x + i as f64 + 1.0));
    0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + series.ln()
}

/// Per-dataset description of one axis, plus the comparison p-value when two
/// datasets are compared.
#[derive(Debug, Clone, Serialize)]
pub struct AxisSummary {
    pub counts: Vec<usize>,
    pub means: Vec<f64>,
    pub std_devs: Vec<f64>,
    pub welch: Option<WelchTest>,
}

impl AxisSummary {
    pub fn from_groups(groups: &[Vec<f64>]) -> Self {
        let welch = match groups {
            [a, b] => Some(welch_t_test(a, b)),
            _ => None,
        };
        Self {
            counts: groups.iter().map(Vec::len).collect(),
            means: groups.iter().map(|g| mean(g)).collect(),
            std_devs: groups.iter().map(|g| std_dev(g)).collect(),
            welch,
        }
    }
}
