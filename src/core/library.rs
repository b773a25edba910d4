//! 图书馆聚合模块
//!
//! 持有馆藏目录、会员名册、自习室预约台账和罚金台账。
//!
//! 设计原则：
//! - 所有状态都是 Library 实例的显式字段，没有全局状态
//! - 目录级操作（入藏、办卡、预约、罚金）只通过 Library 进行
//! - 借书/还书由 Member 直接操作，Library 仅提供按键查找的便捷入口

use crate::core::models::{Book, Member, Reservation};
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use thiserror::Error;

/// 目录操作错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LibraryError {
    /// 馆藏编号已存在
    #[error("图书已存在: {0}")]
    BookAlreadyExists(String),
    /// 会员姓名已存在
    #[error("会员已存在: {0}")]
    MemberAlreadyExists(String),
    /// 未找到图书
    #[error("未找到图书: {0}")]
    BookNotFound(String),
    /// 未找到会员
    #[error("未找到会员: {0}")]
    MemberNotFound(String),
    /// 未找到自习室
    #[error("未找到自习室: {0}")]
    RoomNotFound(String),
    /// 逾期天数不合法（负数）
    #[error("无效的逾期天数: {0}")]
    InvalidOverdueDays(i64),
}

/// 图书馆
pub struct Library {
    /// 馆藏目录（按馆藏编号索引）
    books: HashMap<String, Book>,
    /// 会员名册（按姓名索引）
    members: HashMap<String, Member>,
    /// 自习室预约台账（每间自习室按预约顺序追加）
    study_rooms: HashMap<String, Vec<Reservation>>,
    /// 罚金台账（按会员姓名累计）
    fines: HashMap<String, f64>,
}

impl Library {
    /// 每逾期一天的罚金费率
    pub const LATE_FEE_PER_DAY: f64 = 0.5;

    /// 创建新的图书馆，各台账均为空
    pub fn new() -> Self {
        Self {
            books: HashMap::new(),
            members: HashMap::new(),
            study_rooms: HashMap::new(),
            fines: HashMap::new(),
        }
    }

    /// 图书入藏
    ///
    /// 馆藏编号重复时拒绝入藏，返回 `BookAlreadyExists`。
    pub fn add_book(&mut self, book: Book) -> Result<(), LibraryError> {
        if self.books.contains_key(&book.book_id) {
            tracing::warn!("重复入藏被拒绝: {}", book.book_id);
            return Err(LibraryError::BookAlreadyExists(book.book_id));
        }
        tracing::info!("已入藏: {} 《{}》", book.book_id, book.title);
        self.books.insert(book.book_id.clone(), book);
        Ok(())
    }

    /// 办理会员
    ///
    /// 新会员默认资格有效、无在借图书；姓名重复时拒绝，返回
    /// `MemberAlreadyExists`，不会覆盖已有会员。
    pub fn create_membership(&mut self, name: &str) -> Result<(), LibraryError> {
        if self.members.contains_key(name) {
            tracing::warn!("重复办卡被拒绝: {}", name);
            return Err(LibraryError::MemberAlreadyExists(name.to_string()));
        }
        tracing::info!("已办理会员: {}", name);
        self.members.insert(name.to_string(), Member::new(name));
        Ok(())
    }

    /// 按编号查找图书
    pub fn book(&self, book_id: &str) -> Option<&Book> {
        self.books.get(book_id)
    }

    /// 按编号查找图书（可变）
    pub fn book_mut(&mut self, book_id: &str) -> Option<&mut Book> {
        self.books.get_mut(book_id)
    }

    /// 按姓名查找会员
    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.get(name)
    }

    /// 按姓名查找会员（可变）
    pub fn member_mut(&mut self, name: &str) -> Option<&mut Member> {
        self.members.get_mut(name)
    }

    /// 馆藏目录
    pub fn books(&self) -> &HashMap<String, Book> {
        &self.books
    }

    /// 会员名册
    pub fn members(&self) -> &HashMap<String, Member> {
        &self.members
    }

    /// 自习室预约台账
    pub fn study_rooms(&self) -> &HashMap<String, Vec<Reservation>> {
        &self.study_rooms
    }

    /// 罚金台账
    pub fn fines(&self) -> &HashMap<String, f64> {
        &self.fines
    }

    /// 借出图书（以当前时间计算应还日期）
    pub fn checkout(&mut self, member_name: &str, book_id: &str) -> Result<(), LibraryError> {
        self.checkout_at(member_name, book_id, Utc::now())
    }

    /// 借出图书（显式传入借出时间）
    ///
    /// 按键解析会员与图书后委托给 `Member::borrow_book_at`，
    /// 语义与直接调用会员操作完全一致。
    pub fn checkout_at(
        &mut self,
        member_name: &str,
        book_id: &str,
        now: DateTime<Utc>,
    ) -> Result<(), LibraryError> {
        let member = self
            .members
            .get_mut(member_name)
            .ok_or_else(|| LibraryError::MemberNotFound(member_name.to_string()))?;
        let book = self
            .books
            .get_mut(book_id)
            .ok_or_else(|| LibraryError::BookNotFound(book_id.to_string()))?;
        member.borrow_book_at(book, now);
        Ok(())
    }

    /// 归还图书
    pub fn check_in(&mut self, member_name: &str, book_id: &str) -> Result<(), LibraryError> {
        let member = self
            .members
            .get_mut(member_name)
            .ok_or_else(|| LibraryError::MemberNotFound(member_name.to_string()))?;
        let book = self
            .books
            .get_mut(book_id)
            .ok_or_else(|| LibraryError::BookNotFound(book_id.to_string()))?;
        member.return_book(book);
        Ok(())
    }

    /// 预约自习室（以当前时间为开始时间）
    pub fn reserve_study_room(
        &mut self,
        room_id: &str,
        member_name: &str,
        duration_hours: u32,
    ) -> Result<(), LibraryError> {
        self.reserve_study_room_at(room_id, member_name, duration_hours, Utc::now())
    }

    /// 预约自习室（显式传入开始时间）
    ///
    /// 会员必须已办卡；自习室首次被预约时自动建立台账（按需创建，
    /// 不视为错误）。同一自习室的预约按调用顺序追加，不做冲突检测。
    pub fn reserve_study_room_at(
        &mut self,
        room_id: &str,
        member_name: &str,
        duration_hours: u32,
        now: DateTime<Utc>,
    ) -> Result<(), LibraryError> {
        if !self.members.contains_key(member_name) {
            return Err(LibraryError::MemberNotFound(member_name.to_string()));
        }

        let reservation = Reservation::new(member_name, now, duration_hours);
        tracing::info!("已预约自习室 {}: {}", room_id, reservation);
        self.study_rooms
            .entry(room_id.to_string())
            .or_default()
            .push(reservation);
        Ok(())
    }

    /// 查询自习室的预约记录（按预约顺序）
    ///
    /// 从未被预约过的自习室返回 `RoomNotFound`。
    pub fn room_reservations(&self, room_id: &str) -> Result<&[Reservation], LibraryError> {
        self.study_rooms
            .get(room_id)
            .map(Vec::as_slice)
            .ok_or_else(|| LibraryError::RoomNotFound(room_id.to_string()))
    }

    /// 登记逾期罚金
    ///
    /// 罚金按 `逾期天数 × LATE_FEE_PER_DAY` 累加到该会员名下，
    /// 多次登记累计。负数天数拒绝，返回 `InvalidOverdueDays`。
    /// 返回该会员累计后的罚金总额。
    pub fn calculate_fine(
        &mut self,
        member_name: &str,
        overdue_days: i64,
    ) -> Result<f64, LibraryError> {
        if !self.members.contains_key(member_name) {
            return Err(LibraryError::MemberNotFound(member_name.to_string()));
        }
        if overdue_days < 0 {
            return Err(LibraryError::InvalidOverdueDays(overdue_days));
        }

        let total = self.fines.entry(member_name.to_string()).or_insert(0.0);
        *total += overdue_days as f64 * Self::LATE_FEE_PER_DAY;
        tracing::info!(
            "已登记罚金: {} 逾期 {} 天，累计 {:.2}",
            member_name,
            overdue_days,
            *total
        );
        Ok(*total)
    }

    /// 查询会员的累计罚金，从未被登记过罚金的会员为 0
    pub fn fine_balance(&self, member_name: &str) -> f64 {
        self.fines.get(member_name).copied().unwrap_or(0.0)
    }

    /// 查询已逾期的在借图书（按馆藏编号排序）
    pub fn overdue_books(&self, now: DateTime<Utc>) -> Vec<&Book> {
        let mut overdue: Vec<&Book> = self
            .books
            .values()
            .filter(|b| matches!(b.due_date, Some(due) if due < now))
            .collect();
        overdue.sort_by(|a, b| a.book_id.cmp(&b.book_id));
        overdue
    }

    /// 导出馆藏目录为JSON（按馆藏编号排序，便于对比）
    pub fn export_catalog_to_json(&self) -> Result<String> {
        let mut books: Vec<&Book> = self.books.values().collect();
        books.sort_by(|a, b| a.book_id.cmp(&b.book_id));
        Ok(serde_json::to_string_pretty(&books)?)
    }

    /// 从JSON加载馆藏目录
    ///
    /// 只登记目录中尚不存在的编号，已有馆藏保持不变。
    pub fn load_catalog_from_json(&mut self, json_str: &str) -> Result<()> {
        let books: Vec<Book> = serde_json::from_str(json_str)?;

        for book in books {
            if !self.books.contains_key(&book.book_id) {
                self.books.insert(book.book_id.clone(), book);
            }
        }

        Ok(())
    }
}

impl Default for Library {
    fn default() -> Self {
        Self::new()
    }
}
