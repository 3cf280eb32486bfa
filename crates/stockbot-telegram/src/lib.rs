//! # StockBot Telegram
//!
//! Telegram Bot API 연동.
//!
//! # 봇 명령어
//!
//! - `/start` (`/menu`) - 환영 메시지와 모드 선택 버튼
//! - `/help` - 사용법
//! - `/ping` - 동작 확인
//!
//! 명령어가 아닌 텍스트는 종목명(짧거나 대문자) 또는 자유 질문으로 분류됩니다.
//! 웹훅과 long polling 두 전송 방식 모두 [`UpdateDispatcher::dispatch`]로
//! 업데이트를 넘깁니다.

pub mod bot_handler;
pub mod client;
pub mod format;
pub mod polling;
pub mod types;

pub use bot_handler::*;
pub use client::*;
pub use polling::run_polling;
pub use types::*;
