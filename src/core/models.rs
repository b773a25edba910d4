//! 核心数据模型定义
//!
//! 图书、会员、自习室预约记录等实体。
//! 所有数据结构必须严格遵守设计文档定义，不允许自行添加未定义的字段。

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// 默认借阅期限（天）
pub const LOAN_PERIOD_DAYS: i64 = 7;

/// 图书借阅状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanStatus {
    /// 在馆可借
    Available,
    /// 已借出
    Borrowed,
}

/// 实体图书
/// 描述一本馆藏图书的完整信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    /// 书名
    pub title: String,
    /// 作者
    pub author: String,
    /// 馆藏编号（唯一）
    pub book_id: String,
    /// 书架位置
    pub shelf_location: String,
    /// 应还日期，None 表示未借出
    pub due_date: Option<DateTime<Utc>>,
}

impl Book {
    /// 创建新的图书记录（尚未入藏任何图书馆）
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        book_id: impl Into<String>,
        shelf_location: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            book_id: book_id.into(),
            shelf_location: shelf_location.into(),
            due_date: None,
        }
    }

    /// 是否处于借出状态
    pub fn is_on_loan(&self) -> bool {
        self.due_date.is_some()
    }

    /// 当前借阅状态
    pub fn loan_status(&self) -> LoanStatus {
        if self.is_on_loan() {
            LoanStatus::Borrowed
        } else {
            LoanStatus::Available
        }
    }
}

/// 图书馆会员
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    /// 会员姓名（馆内唯一）
    pub name: String,
    /// 会员资格是否有效
    pub membership_active: bool,
    /// 当前借阅的图书编号集合
    pub borrowed_books: HashSet<String>,
}

impl Member {
    /// 创建新会员，默认资格有效、无在借图书
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            membership_active: true,
            borrowed_books: HashSet::new(),
        }
    }

    /// 借书（以当前时间计算应还日期）
    pub fn borrow_book(&mut self, book: &mut Book) {
        self.borrow_book_at(book, Utc::now());
    }

    /// 借书（显式传入借出时间，便于测试固定时钟）
    ///
    /// 重复借同一本书不会产生重复条目；应还日期为借出时间加 7 天。
    /// 注意：不检查 membership_active，与现有业务行为保持一致。
    pub fn borrow_book_at(&mut self, book: &mut Book, now: DateTime<Utc>) {
        self.borrowed_books.insert(book.book_id.clone());
        book.due_date = Some(now + Duration::days(LOAN_PERIOD_DAYS));
        tracing::info!("已借出: {} -> {}", book.book_id, self.name);
    }

    /// 还书
    ///
    /// 归还未借的书不是错误，集合移除静默跳过；应还日期无条件清空。
    pub fn return_book(&mut self, book: &mut Book) {
        self.borrowed_books.remove(&book.book_id);
        book.due_date = None;
        tracing::info!("已归还: {} <- {}", book.book_id, self.name);
    }

    /// 是否借有指定图书
    pub fn has_borrowed(&self, book: &Book) -> bool {
        self.borrowed_books.contains(&book.book_id)
    }
}

/// 自习室预约记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    /// 预约唯一ID
    pub id: String,
    /// 预约会员姓名
    pub member_name: String,
    /// 开始时间
    pub start_time: DateTime<Utc>,
    /// 时长（小时）
    pub duration_hours: u32,
}

impl Reservation {
    /// 创建新的预约记录
    pub fn new(
        member_name: impl Into<String>,
        start_time: DateTime<Utc>,
        duration_hours: u32,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            member_name: member_name.into(),
            start_time,
            duration_hours,
        }
    }

    /// 结束时间
    pub fn end_time(&self) -> DateTime<Utc> {
        self.start_time + Duration::hours(i64::from(self.duration_hours))
    }
}

impl fmt::Display for Reservation {
    /// 渲染为对外的可读格式："姓名: 开始 - 结束"
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} - {}",
            self.member_name,
            self.start_time.format("%H:%M"),
            self.end_time().format("%H:%M")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn make_fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_borrow_sets_due_date() {
        let mut member = Member::new("Test Member");
        let mut book = Book::new("Test Book", "Author", "B001", "Shelf A");
        let now = make_fixed_time();

        member.borrow_book_at(&mut book, now);

        assert!(member.has_borrowed(&book));
        assert_eq!(book.due_date, Some(now + Duration::days(7)));
        assert_eq!(book.loan_status(), LoanStatus::Borrowed);
    }

    #[test]
    fn test_borrow_twice_does_not_duplicate() {
        let mut member = Member::new("Test Member");
        let mut book = Book::new("Test Book", "Author", "B001", "Shelf A");

        member.borrow_book_at(&mut book, make_fixed_time());
        member.borrow_book_at(&mut book, make_fixed_time());

        assert_eq!(member.borrowed_books.len(), 1);
    }

    #[test]
    fn test_return_clears_due_date() {
        let mut member = Member::new("Test Member");
        let mut book = Book::new("Test Book", "Author", "B001", "Shelf A");

        member.borrow_book_at(&mut book, make_fixed_time());
        member.return_book(&mut book);

        assert!(!member.has_borrowed(&book));
        assert_eq!(book.due_date, None);
        assert_eq!(book.loan_status(), LoanStatus::Available);
    }

    #[test]
    fn test_return_unborrowed_book_is_noop() {
        let mut member = Member::new("Test Member");
        let mut book = Book::new("Test Book", "Author", "B001", "Shelf A");
        let before = book.clone();

        member.return_book(&mut book);

        assert_eq!(book, before);
        assert!(member.borrowed_books.is_empty());
    }

    #[test]
    fn test_reservation_display_contains_name_and_colon() {
        let reservation = Reservation::new("Test Member", make_fixed_time(), 2);

        let rendered = reservation.to_string();
        assert!(rendered.contains("Test Member"));
        assert!(rendered.contains(':'));
        assert_eq!(
            reservation.end_time(),
            make_fixed_time() + Duration::hours(2)
        );
    }
}
