//! # StockBot Core
//!
//! 주식 요약 봇의 핵심 타입과 공통 인프라를 제공합니다.
//!
//! 이 크레이트는 다른 모든 크레이트가 공유하는 기본 요소를 담고 있습니다:
//! - 시세 스냅샷 및 뉴스 헤드라인 타입
//! - 설정 관리 (파일 + 환경 변수)
//! - 로깅 인프라
//! - 공통 에러 타입

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use error::*;
pub use logging::*;
pub use types::*;
