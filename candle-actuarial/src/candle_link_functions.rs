use candle_core::{Result, Tensor};

/// Positivity link: R -> (0, inf)
///
/// Total on finite inputs and strictly positive everywhere, so downstream
/// kernels never need to check `rate > 0` or `r > 0` themselves. Very
/// large raw values overflow to `inf`, which is propagated as a non-finite
/// loss rather than an error; with f32 predictions the safe range is
/// roughly |x| < 88, with f64 roughly |x| < 709.
///
/// * `x_n` - unconstrained raw predictions
pub fn positivity_link(x_n: &Tensor) -> Result<Tensor> {
    x_n.exp()
}

/// Unit-interval link: R -> (0, 1), exclusive at both ends
///
/// Logistic sigmoid, computed with candle-nn's stable formulation so that
/// sigmoid(x) never evaluates `exp(-x)` for very negative `x`.
///
/// * `x_n` - unconstrained raw predictions
pub fn unit_interval_link(x_n: &Tensor) -> Result<Tensor> {
    candle_nn::ops::sigmoid(x_n)
}

/// log sigmoid(x) = min(x, 0) - log(1 + exp(-|x|))
///
/// Stable companion to [`unit_interval_link`]: `log(sigmoid(x))` computed
/// directly underflows to `log(0) = -inf` once sigmoid rounds to zero,
/// while this form stays finite for every finite `x`. The negative
/// binomial kernels use `log_sigmoid(x)` for `log(p)` and
/// `log_sigmoid(-x)` for `log(1 - p)`.
///
/// * `x_n` - unconstrained raw predictions
pub fn log_sigmoid(x_n: &Tensor) -> Result<Tensor> {
    let abs_n = x_n.maximum(&x_n.neg()?)?;
    let softplus_n = (abs_n.neg()?.exp()? + 1.0)?.log()?;
    x_n.minimum(0.0)?.sub(&softplus_n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use candle_core::Device;

    #[test]
    fn log_sigmoid_matches_naive_form_in_the_safe_range() -> Result<()> {
        let dev = Device::Cpu;
        let x = Tensor::new(&[-20.0_f64, -1.0, 0.0, 1.0, 20.0], &dev)?;
        let stable = log_sigmoid(&x)?.to_vec1::<f64>()?;
        let naive = unit_interval_link(&x)?.log()?.to_vec1::<f64>()?;
        for (a, b) in stable.iter().zip(naive.iter()) {
            assert_relative_eq!(*a, *b, max_relative = 1e-12);
        }
        Ok(())
    }

    #[test]
    fn log_sigmoid_stays_finite_where_sigmoid_underflows() -> Result<()> {
        let dev = Device::Cpu;
        let x = Tensor::new(&[-800.0_f64, -5000.0], &dev)?;
        let stable = log_sigmoid(&x)?.to_vec1::<f64>()?;
        assert_relative_eq!(stable[0], -800.0, max_relative = 1e-12);
        assert_relative_eq!(stable[1], -5000.0, max_relative = 1e-12);
        Ok(())
    }
}
