pub mod candle_link_functions;
pub mod candle_loss_functions;
pub mod candle_special_functions;
pub mod candle_tensor_util;

pub use candle_core;
pub use candle_nn;
