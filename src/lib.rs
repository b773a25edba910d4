//! Libris - 小型图书馆借阅管理核心
//!
//! 核心设计原则：
//! - 所有状态都挂在显式的 Library 实例上，没有全局状态
//! - 单线程同步模型，所有操作立即完成
//! - 时间来源可显式注入，测试不依赖真实时钟
//! - 无持久化、无界面，纯内存领域模型

pub mod core;

pub use crate::core::library::{Library, LibraryError};
pub use crate::core::models::{Book, LoanStatus, Member, Reservation, LOAN_PERIOD_DAYS};
