//! 봇 전반에서 사용되는 공통 타입.

mod decimal;
mod news;
mod stock;

pub use decimal::*;
pub use news::*;
pub use stock::*;
