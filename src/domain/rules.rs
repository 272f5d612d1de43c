//! Business rules for post moderation and contract terms. These are checked
//! before any mutation; every violation maps to HTTP 400 with the verbatim
//! client message.

use chrono::NaiveDate;

use super::role::{ContractStatus, PostStatus};

/// Minimum lease duration, inclusive of the start day.
pub const MIN_TERM_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("Ngày không hợp lệ")]
    InvalidDate,
    #[error("Ngày kết thúc phải sau ngày bắt đầu")]
    EndBeforeStart,
    #[error("Thời hạn hợp đồng phải ít nhất 30 ngày")]
    TermTooShort,
    #[error("Chỉ có thể tạo hợp đồng cho bài đăng đã được duyệt")]
    PostNotApproved,
    #[error("Bạn đã tạo hợp đồng cho bài đăng này")]
    DuplicateContract,
    #[error("Bài đăng đã được duyệt")]
    AlreadyApproved,
    #[error("Không thể từ chối bài đăng đã được duyệt. Vui lòng sử dụng chức năng xóa.")]
    CannotRejectApproved,
    #[error("Không thể sửa bài đăng đã được duyệt. Vui lòng liên hệ admin.")]
    CannotEditApproved,
    #[error("Hợp đồng đã được kết thúc")]
    AlreadyTerminated,
}

/// Parse a `YYYY-MM-DD` calendar date from client input.
pub fn parse_date(value: &str) -> Result<NaiveDate, DomainError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| DomainError::InvalidDate)
}

/// Validate a contract date pair. Ordering is checked before the minimum
/// term so `end <= start` always reports as an ordering violation.
pub fn validate_term(start: NaiveDate, end: NaiveDate) -> Result<(), DomainError> {
    let days = (end - start).num_days();
    if days <= 0 {
        return Err(DomainError::EndBeforeStart);
    }
    if days < MIN_TERM_DAYS {
        return Err(DomainError::TermTooShort);
    }
    Ok(())
}

/// Approving is idempotence-guarded: an approved post cannot be approved
/// again. Rejected posts may still be approved.
pub fn ensure_approvable(status: PostStatus) -> Result<(), DomainError> {
    match status {
        PostStatus::Approved => Err(DomainError::AlreadyApproved),
        PostStatus::Pending | PostStatus::Rejected => Ok(()),
    }
}

/// Approved posts are never rejected; they must be deleted instead.
pub fn ensure_rejectable(status: PostStatus) -> Result<(), DomainError> {
    match status {
        PostStatus::Approved => Err(DomainError::CannotRejectApproved),
        PostStatus::Pending | PostStatus::Rejected => Ok(()),
    }
}

/// Content fields freeze once a post is approved.
pub fn ensure_content_editable(status: PostStatus) -> Result<(), DomainError> {
    match status {
        PostStatus::Approved => Err(DomainError::CannotEditApproved),
        PostStatus::Pending | PostStatus::Rejected => Ok(()),
    }
}

/// Contracts are created against approved posts only.
pub fn ensure_contractable(status: PostStatus) -> Result<(), DomainError> {
    match status {
        PostStatus::Approved => Ok(()),
        PostStatus::Pending | PostStatus::Rejected => Err(DomainError::PostNotApproved),
    }
}

/// Terminating a terminated contract is a conflict, not a no-op.
pub fn ensure_terminable(status: ContractStatus) -> Result<(), DomainError> {
    match status {
        ContractStatus::Active => Ok(()),
        ContractStatus::Terminated => Err(DomainError::AlreadyTerminated),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn parse_rejects_garbage_and_impossible_dates() {
        assert_eq!(parse_date("not-a-date"), Err(DomainError::InvalidDate));
        assert_eq!(parse_date("2025-02-30"), Err(DomainError::InvalidDate));
        assert!(parse_date("2025-02-01").is_ok());
    }

    #[test]
    fn term_of_exactly_thirty_days_passes() {
        assert_eq!(validate_term(date("2025-02-01"), date("2025-03-03")), Ok(()));
        assert_eq!(validate_term(date("2025-02-01"), date("2025-08-01")), Ok(()));
    }

    #[test]
    fn short_term_is_rejected() {
        assert_eq!(
            validate_term(date("2025-02-01"), date("2025-02-15")),
            Err(DomainError::TermTooShort)
        );
        assert_eq!(
            validate_term(date("2025-02-01"), date("2025-03-02")),
            Err(DomainError::TermTooShort)
        );
    }

    #[test]
    fn ordering_violation_wins_over_short_term() {
        // end == start and end < start are both ordering errors, never "too short"
        assert_eq!(
            validate_term(date("2025-02-01"), date("2025-02-01")),
            Err(DomainError::EndBeforeStart)
        );
        assert_eq!(
            validate_term(date("2025-02-01"), date("2025-01-01")),
            Err(DomainError::EndBeforeStart)
        );
    }

    #[test]
    fn approve_guards() {
        assert!(ensure_approvable(PostStatus::Pending).is_ok());
        assert!(ensure_approvable(PostStatus::Rejected).is_ok());
        assert_eq!(ensure_approvable(PostStatus::Approved), Err(DomainError::AlreadyApproved));
    }

    #[test]
    fn reject_guards() {
        assert!(ensure_rejectable(PostStatus::Pending).is_ok());
        assert_eq!(
            ensure_rejectable(PostStatus::Approved),
            Err(DomainError::CannotRejectApproved)
        );
    }

    #[test]
    fn approved_content_is_frozen() {
        assert!(ensure_content_editable(PostStatus::Pending).is_ok());
        assert!(ensure_content_editable(PostStatus::Rejected).is_ok());
        assert_eq!(
            ensure_content_editable(PostStatus::Approved),
            Err(DomainError::CannotEditApproved)
        );
    }

    #[test]
    fn contracts_require_approved_posts() {
        assert!(ensure_contractable(PostStatus::Approved).is_ok());
        assert_eq!(ensure_contractable(PostStatus::Pending), Err(DomainError::PostNotApproved));
        assert_eq!(ensure_contractable(PostStatus::Rejected), Err(DomainError::PostNotApproved));
    }

    #[test]
    fn terminate_is_one_way() {
        assert!(ensure_terminable(ContractStatus::Active).is_ok());
        assert_eq!(
            ensure_terminable(ContractStatus::Terminated),
            Err(DomainError::AlreadyTerminated)
        );
    }
}
