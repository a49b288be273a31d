use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

/// Period of the strongest oscillation in a uniformly sampled signal.
///
/// The mean is removed before the transform; the zero-frequency bin is never chosen.
/// Returns `None` for short, non-finite or flat signals.
pub fn dominant_period(samples: &[f64], dt: f64) -> Option<f64> {
    let n = samples.len();
    if n < 4 || !dt.is_finite() || dt <= 0.0 || samples.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let mean = samples.iter().sum::<f64>() / n as f64;
    let mut buffer: Vec<Complex<f64>> = samples
        .iter()
        .map(|v| Complex::new(v - mean, 0.0))
        .collect();

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(n);
    fft.process(&mut buffer);

    let (bin, magnitude) = buffer[1..=n / 2]
        .iter()
        .enumerate()
        .map(|(i, c)| (i + 1, c.norm_sqr()))
        .fold((0, 0.0), |best, cur| if cur.1 > best.1 { cur } else { best });
    if bin == 0 || magnitude <= f64::EPSILON * n as f64 {
        return None;
    }
    Some(n as f64 * dt / bin as f64)
}
