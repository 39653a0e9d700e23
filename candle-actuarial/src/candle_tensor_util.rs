use candle_core::{bail, Result, Tensor};

/// Convert tensors of shape (n,1) to (n).
/// Tensors of shape (n) remain unchanged.
pub fn one_dim(t: &Tensor) -> Result<Tensor> {
    match t.dims() {
        [_n] => Ok(t.clone()),
        [_n, 1] => t.squeeze(1),
        dims => bail!("expected a (n) or (n,1) tensor, found {:?}", dims),
    }
}

/// Split a (n,2) tensor into its two (n) columns.
pub fn two_columns(t_n2: &Tensor) -> Result<(Tensor, Tensor)> {
    match t_n2.dims() {
        [_n, 2] => Ok((
            t_n2.narrow(1, 0, 1)?.squeeze(1)?,
            t_n2.narrow(1, 1, 1)?.squeeze(1)?,
        )),
        dims => bail!("expected a (n,2) tensor, found {:?}", dims),
    }
}

/// Cast labels to the prediction's float dtype.
///
/// * `label` - observed data, any numeric dtype
/// * `pred` - model output tensor whose dtype wins
pub fn cast_to_pred(label: &Tensor, pred: &Tensor) -> Result<Tensor> {
    if !pred.dtype().is_float() {
        bail!(
            "predictions must be a floating-point tensor, found {:?}",
            pred.dtype()
        );
    }
    label.to_dtype(pred.dtype())
}

/// Labels and predictions must describe the same number of observations.
pub fn check_same_batch(label: &Tensor, pred: &Tensor) -> Result<()> {
    let n_label = label.dim(0)?;
    let n_pred = pred.dim(0)?;
    if n_label != n_pred {
        bail!(
            "batch size mismatch: {} labels vs. {} predictions",
            n_label,
            n_pred
        );
    }
    Ok(())
}

/// Exposure values must be strictly positive and finite; a zero or
/// negative exposure would push `log(exposure)` or `exposure * r`
/// outside the parameter domain. Exposure is label data and never
/// differentiated, so its values can be inspected eagerly.
pub fn check_positive_exposure(exposure_n: &Tensor) -> Result<()> {
    let min = exposure_n
        .min(0)?
        .to_dtype(candle_core::DType::F64)?
        .to_scalar::<f64>()?;
    let max = exposure_n
        .max(0)?
        .to_dtype(candle_core::DType::F64)?
        .to_scalar::<f64>()?;
    if !(min > 0.0) || !max.is_finite() {
        bail!(
            "invalid exposure: values must lie in (0, inf), found range [{}, {}]",
            min,
            max
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::Device;

    #[test]
    fn one_dim_flattens_column_vectors() -> Result<()> {
        let dev = Device::Cpu;
        let flat = Tensor::new(&[1.0_f64, 2.0, 3.0], &dev)?;
        assert_eq!(one_dim(&flat)?.dims(), &[3]);

        let col = flat.reshape((3, 1))?;
        assert_eq!(one_dim(&col)?.dims(), &[3]);

        let wide = Tensor::zeros((3, 2), candle_core::DType::F64, &dev)?;
        assert!(one_dim(&wide).is_err());
        Ok(())
    }

    #[test]
    fn exposure_must_be_positive() -> Result<()> {
        let dev = Device::Cpu;
        let good = Tensor::new(&[0.5_f64, 2.0], &dev)?;
        assert!(check_positive_exposure(&good).is_ok());

        let zero = Tensor::new(&[1.0_f64, 0.0], &dev)?;
        assert!(check_positive_exposure(&zero).is_err());

        let neg = Tensor::new(&[-1.0_f64, 2.0], &dev)?;
        assert!(check_positive_exposure(&neg).is_err());
        Ok(())
    }
}
