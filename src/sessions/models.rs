use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use std::net::IpAddr;
use utoipa::ToSchema;
use uuid::Uuid;

/// One row per issued refresh token. The token itself never appears here,
/// only its hash keys the row in the database.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_agent: Option<String>,
    #[schema(value_type = Option<String>)]
    pub ip: Option<IpAddr>,
    pub active: bool,
    pub expires_at: DateTime<Utc>,
    pub last_access_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PageMeta {
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PageMeta {
    #[must_use]
    pub fn new(total: i64, page: u32, per_page: u32) -> Self {
        let per_page = per_page.max(1);
        let total_pages = u32::try_from(
            u64::try_from(total.max(0)).unwrap_or(0).div_ceil(u64::from(per_page)),
        )
        .unwrap_or(u32::MAX);

        Self {
            total,
            page,
            per_page,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionPage {
    pub sessions: Vec<Session>,
    pub meta: PageMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_meta_empty() {
        let meta = PageMeta::new(0, 1, 20);
        assert_eq!(meta.total_pages, 0);
        assert!(!meta.has_next);
        assert!(!meta.has_prev);
    }

    #[test]
    fn test_page_meta_exact_multiple() {
        let meta = PageMeta::new(40, 1, 20);
        assert_eq!(meta.total_pages, 2);
        assert!(meta.has_next);
        assert!(!meta.has_prev);
    }

    #[test]
    fn test_page_meta_remainder_rounds_up() {
        let meta = PageMeta::new(41, 3, 20);
        assert_eq!(meta.total_pages, 3);
        assert!(!meta.has_next);
        assert!(meta.has_prev);
    }

    #[test]
    fn test_page_meta_middle_page() {
        let meta = PageMeta::new(100, 3, 10);
        assert_eq!(meta.total_pages, 10);
        assert!(meta.has_next);
        assert!(meta.has_prev);
    }

    #[test]
    fn test_page_meta_zero_per_page_clamped() {
        let meta = PageMeta::new(5, 1, 0);
        assert_eq!(meta.per_page, 1);
        assert_eq!(meta.total_pages, 5);
    }
}
