use std::cmp::Ordering;

use thiserror::Error;

use super::models::CashCard;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PageError {
    #[error("Unknown sort property '{0}'")]
    UnknownSortField(String),

    #[error("Invalid sort direction '{0}'; expected 'asc' or 'desc'")]
    InvalidSortDirection(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    fn parse(s: &str) -> Result<Self, PageError> {
        if s.eq_ignore_ascii_case("asc") {
            Ok(SortDirection::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(SortDirection::Desc)
        } else {
            Err(PageError::InvalidSortDirection(s.to_string()))
        }
    }
}

/// Card properties a listing may be ordered by. Only these ever reach SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Amount,
}

impl SortField {
    pub fn column(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Amount => "amount",
        }
    }

    fn parse(s: &str) -> Result<Self, PageError> {
        match s {
            "id" => Ok(SortField::Id),
            "amount" => Ok(SortField::Amount),
            other => Err(PageError::UnknownSortField(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for SortOrder {
    fn default() -> Self {
        Self {
            field: SortField::Amount,
            direction: SortDirection::Asc,
        }
    }
}

impl SortOrder {
    /// Parses `<field>` or `<field>,<asc|desc>`; direction defaults to ascending.
    pub fn parse(s: &str) -> Result<Self, PageError> {
        let mut parts = s.split(',').map(str::trim);
        let field = SortField::parse(parts.next().unwrap_or_default())?;
        let direction = match parts.next() {
            Some(dir) if !dir.is_empty() => SortDirection::parse(dir)?,
            _ => SortDirection::Asc,
        };
        if let Some(extra) = parts.next() {
            return Err(PageError::InvalidSortDirection(extra.to_string()));
        }
        Ok(Self { field, direction })
    }

    /// ORDER BY clause with `id` as tie-breaker so pages never overlap.
    pub fn to_sql(&self) -> String {
        match self.field {
            SortField::Id => format!("ORDER BY id {}", self.direction.to_sql()),
            field => format!(
                "ORDER BY {} {}, id ASC",
                field.column(),
                self.direction.to_sql()
            ),
        }
    }

    /// In-memory equivalent of [`SortOrder::to_sql`].
    pub fn compare(&self, a: &CashCard, b: &CashCard) -> Ordering {
        let primary = match self.field {
            SortField::Id => a.id.cmp(&b.id),
            SortField::Amount => a.amount.cmp(&b.amount),
        };
        let primary = match self.direction {
            SortDirection::Asc => primary,
            SortDirection::Desc => primary.reverse(),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

/// Zero-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub sort: SortOrder,
}

impl PageRequest {
    pub fn new(page: u32, size: u32, sort: SortOrder) -> Self {
        Self { page, size, sort }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub number: u32,
    pub size: u32,
    pub total_elements: u64,
}
