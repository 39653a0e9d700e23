//! Negative log-likelihood losses for some popular actuarial count models.
//!
//! Each loss drops the terms that are constant functions of the observed
//! data, since they do not affect the gradients. All losses return one
//! value per observation; callers wanting a scalar apply their own
//! reduction (mean, weighted sum, ...).

use candle_core::{Result, Tensor};

use crate::candle_link_functions::{log_sigmoid, positivity_link};
use crate::candle_special_functions::lgamma;
use crate::candle_tensor_util::{
    cast_to_pred, check_positive_exposure, check_same_batch, one_dim, two_columns,
};

/// Poisson negative log-likelihood of count data
///
/// loss(i) = -( y(i) * log_rate(i) - exp(log_rate(i)) )
///
/// The prediction is interpreted directly as log(lambda), the canonical
/// Poisson regression link, so no link function is applied here.
///
/// * `y_n` - observed event counts, (n) or (n,1)
/// * `log_rate_n` - predicted log(lambda), (n) or (n,1)
pub fn poisson_loss(y_n: &Tensor, log_rate_n: &Tensor) -> Result<Tensor> {
    let log_rate_n = one_dim(log_rate_n)?;
    let y_n = one_dim(&cast_to_pred(y_n, &log_rate_n)?)?;
    check_same_batch(&y_n, &log_rate_n)?;

    y_n.mul(&log_rate_n)?.sub(&log_rate_n.exp()?)?.neg()
}

/// Poisson negative log-likelihood with per-observation exposure
///
/// Rescales the rate by exposure, the natural Poisson-process scaling
/// (rate x time): log_rate(i) <- log_rate(i) + log(exposure(i)). When
/// every exposure equals one this reduces exactly to [`poisson_loss`].
///
/// * `label_n2` - (n,2) pairs of [num_events, exposure], exposure > 0
/// * `log_rate_n` - predicted log(lambda), (n) or (n,1)
pub fn poisson_loss_with_exposure(label_n2: &Tensor, log_rate_n: &Tensor) -> Result<Tensor> {
    let log_rate_n = one_dim(log_rate_n)?;
    let (y_n, exposure_n) = two_columns(&cast_to_pred(label_n2, &log_rate_n)?)?;
    check_same_batch(&y_n, &log_rate_n)?;
    check_positive_exposure(&exposure_n)?;

    let log_rate_n = log_rate_n.add(&exposure_n.log()?)?;
    y_n.mul(&log_rate_n)?.sub(&log_rate_n.exp()?)?.neg()
}

/// Negative binomial negative log-likelihood of count data
///
/// loss(i) = -( lgamma(y(i) + r(i)) + y(i) * log(1 - p(i))
///              - lgamma(r(i)) + r(i) * log(p(i)) )
///
/// Prediction column 0 passes through the positivity link to give r > 0;
/// column 1 through the unit-interval link to give p in (0,1). Both logs
/// are evaluated through the stable log-sigmoid, so no underflowed
/// probability is ever logged.
///
/// * `y_n` - observed event counts, (n) or (n,1)
/// * `pred_n2` - (n,2) raw predictions, columns [r, p] before the links
pub fn neg_binomial_loss(y_n: &Tensor, pred_n2: &Tensor) -> Result<Tensor> {
    let (raw_r_n, logit_n) = two_columns(pred_n2)?;
    let y_n = one_dim(&cast_to_pred(y_n, pred_n2)?)?;
    check_same_batch(&y_n, &raw_r_n)?;

    let r_n = positivity_link(&raw_r_n)?;
    neg_binomial_kernel(&y_n, &r_n, &logit_n)
}

/// Negative binomial negative log-likelihood with per-observation exposure
///
/// A negative binomial count can be read as the time-1 marginal of more
/// than one stochastic process, so "twice the exposure" is ambiguous:
/// scaling exposure by alpha can be realized either as r -> alpha * r
/// (holding p fixed) or as p -> p / (p + alpha * (1 - p)) (holding r
/// fixed), and the two give different models. This implements only
/// r -> exposure * r, the convention under which the count is the marginal
/// of a negative binomial Levy process. That process is infinitely
/// divisible, so splitting an exposure period into sub-periods yields a
/// consistent model. When every exposure equals one this reduces exactly
/// to [`neg_binomial_loss`].
///
/// * `label_n2` - (n,2) pairs of [num_events, exposure], exposure > 0
/// * `pred_n2` - (n,2) raw predictions, columns [r, p] before the links
pub fn neg_binomial_loss_with_exposure(label_n2: &Tensor, pred_n2: &Tensor) -> Result<Tensor> {
    let (raw_r_n, logit_n) = two_columns(pred_n2)?;
    let (y_n, exposure_n) = two_columns(&cast_to_pred(label_n2, pred_n2)?)?;
    check_same_batch(&y_n, &raw_r_n)?;
    check_positive_exposure(&exposure_n)?;

    let r_n = exposure_n.mul(&positivity_link(&raw_r_n)?)?;
    neg_binomial_kernel(&y_n, &r_n, &logit_n)
}

/// Shared negative binomial kernel over linked parameters.
///
/// * `r_n` - positive shape/rate parameter, already linked (and already
///   rescaled by exposure if applicable)
/// * `logit_n` - raw logit of p; kept raw so log(p) and log(1-p) can go
///   through [`log_sigmoid`]
fn neg_binomial_kernel(y_n: &Tensor, r_n: &Tensor, logit_n: &Tensor) -> Result<Tensor> {
    let log_p_n = log_sigmoid(logit_n)?;
    let log_1mp_n = log_sigmoid(&logit_n.neg()?)?;

    lgamma(&y_n.add(r_n)?)?
        .add(&y_n.mul(&log_1mp_n)?)?
        .sub(&lgamma(r_n)?)?
        .add(&r_n.mul(&log_p_n)?)?
        .neg()
}

/// Per-example loss signature shared by all four variants:
/// `(labels, raw predictions) -> per-observation loss`.
pub type CountLossFn = fn(&Tensor, &Tensor) -> Result<Tensor>;

/// The closed set of count-regression losses.
///
/// A model picks its variant once at construction time and holds the
/// resolved [`CountLossFn`]; nothing branches on this enum per batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountLoss {
    Poisson,
    PoissonWithExposure,
    NegBinomial,
    NegBinomialWithExposure,
}

impl CountLoss {
    pub fn loss_fn(self) -> CountLossFn {
        log::debug!("selected {:?} count loss", self);
        match self {
            Self::Poisson => poisson_loss,
            Self::PoissonWithExposure => poisson_loss_with_exposure,
            Self::NegBinomial => neg_binomial_loss,
            Self::NegBinomialWithExposure => neg_binomial_loss_with_exposure,
        }
    }

    /// Width of the raw prediction each variant expects, i.e. the output
    /// dimension of the upstream linear model.
    pub fn prediction_dim(self) -> usize {
        match self {
            Self::Poisson | Self::PoissonWithExposure => 1,
            Self::NegBinomial | Self::NegBinomialWithExposure => 2,
        }
    }

    /// Number of label columns: 1 for plain counts, 2 for
    /// [num_events, exposure] pairs.
    pub fn label_dim(self) -> usize {
        match self {
            Self::Poisson | Self::NegBinomial => 1,
            Self::PoissonWithExposure | Self::NegBinomialWithExposure => 2,
        }
    }
}
