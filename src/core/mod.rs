//! Core模块 - 包含所有核心业务逻辑

pub mod library;
pub mod models;
