use candle_core::{Result, Tensor};

/// Arguments below this point are shifted up by the recurrence before
/// applying the Stirling series; the series alone is only accurate for
/// large arguments.
const STIRLING_SHIFT: usize = 8;

/// log Gamma(x) for x > 0, built from differentiable tensor ops
///
/// lgamma(x) = lgamma(x + 8) - sum_{k=0..7} log(x + k)
/// lgamma(z) ~ (z - 1/2) log(z) - z + log(2 pi)/2
///             + 1/(12 z) - 1/(360 z^3) + 1/(1260 z^5)   for z >= 8
///
/// The truncation error of the series at z = 8 is below 3e-10, so the
/// composite is accurate to ~1e-9 absolute over all of (0, inf). Computing
/// `log(gamma(x))` instead would overflow for x beyond ~170; this never
/// materializes gamma itself.
///
/// * `x_n` - strictly positive tensor (kernels guarantee this via the
///   positivity link; values <= 0 produce NaN, not an error)
pub fn lgamma(x_n: &Tensor) -> Result<Tensor> {
    let mut log_shift_n = x_n.log()?;
    for k in 1..STIRLING_SHIFT {
        log_shift_n = log_shift_n.add(&(x_n + k as f64)?.log()?)?;
    }

    let z_n = (x_n + STIRLING_SHIFT as f64)?;
    let log_z_n = z_n.log()?;

    let half_log_2pi = 0.5 * (2.0 * std::f64::consts::PI).ln();
    let main_n = z_n
        .affine(1.0, -0.5)?
        .mul(&log_z_n)?
        .sub(&z_n)?
        .affine(1.0, half_log_2pi)?;

    let series_n = ((z_n.powf(-1.0)? * (1.0 / 12.0))?
        - (z_n.powf(-3.0)? * (1.0 / 360.0))?)?
        .add(&(z_n.powf(-5.0)? * (1.0 / 1260.0))?)?;

    main_n.add(&series_n)?.sub(&log_shift_n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use candle_core::Device;

    fn lgamma_vec(xs: &[f64]) -> Result<Vec<f64>> {
        let x = Tensor::new(xs, &Device::Cpu)?;
        lgamma(&x)?.to_vec1::<f64>()
    }

    #[test]
    fn matches_known_gamma_values() -> Result<()> {
        let got = lgamma_vec(&[0.5, 1.0, 2.0, 5.0, 10.5, 200.0])?;
        let want = [
            std::f64::consts::PI.sqrt().ln(), // Gamma(1/2) = sqrt(pi)
            0.0,                              // Gamma(1) = 1
            0.0,                              // Gamma(2) = 1
            24.0_f64.ln(),                    // Gamma(5) = 4!
            13.940_625_219_403_763,
            857.933_669_825_857_5,
        ];
        for (g, w) in got.iter().zip(want.iter()) {
            assert_relative_eq!(*g, *w, epsilon = 1e-8, max_relative = 1e-10);
        }
        Ok(())
    }

    #[test]
    fn satisfies_the_recurrence() -> Result<()> {
        // lgamma(x + 1) = lgamma(x) + log(x)
        let xs = [0.1, 0.7, 1.3, 4.2, 33.3];
        let at_x = lgamma_vec(&xs)?;
        let at_x1: Vec<f64> = lgamma_vec(&xs.map(|x| x + 1.0))?;
        for ((x, lo), hi) in xs.iter().zip(at_x.iter()).zip(at_x1.iter()) {
            assert_relative_eq!(lo + x.ln(), *hi, epsilon = 1e-8, max_relative = 1e-9);
        }
        Ok(())
    }
}
