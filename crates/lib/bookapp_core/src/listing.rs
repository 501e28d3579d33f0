//! Paginated, filtered listing queries.
//!
//! Listing endpoints translate optional query parameters into a [`PageRequest`]
//! and a criteria struct, then into a [`FilterSet`]: an AND-conjoined list of
//! SQL predicates with positional (`$n`) placeholders and the parameter values
//! bound to them, in clause order. Only criteria that are present add a clause,
//! so empty criteria match every row.

use serde::Serialize;

/// Rows per page when `limit` is absent or unusable.
pub const DEFAULT_LIMIT: i64 = 10;

/// Page number when `page` is absent or unusable.
pub const DEFAULT_PAGE: i64 = 1;

/// Requested page window. Always holds a positive limit and page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    limit: i64,
    page: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            page: DEFAULT_PAGE,
        }
    }
}

impl PageRequest {
    /// Non-positive values fall back to the defaults.
    pub fn new(limit: i64, page: i64) -> Self {
        Self {
            limit: if limit > 0 { limit } else { DEFAULT_LIMIT },
            page: if page > 0 { page } else { DEFAULT_PAGE },
        }
    }

    /// Build from raw query-string values; missing or unparsable values
    /// fall back to the defaults.
    pub fn from_query(limit: Option<&str>, page: Option<&str>) -> Self {
        let parse = |raw: Option<&str>| raw.and_then(|v| v.trim().parse::<i64>().ok());
        Self::new(
            parse(limit).unwrap_or(DEFAULT_LIMIT),
            parse(page).unwrap_or(DEFAULT_PAGE),
        )
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    /// Rows skipped before this page: `(page - 1) * limit`.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Page metadata for a listing with `total_count` matching rows.
    pub fn meta(&self, total_count: i64) -> PageMeta {
        paginate(total_count, self.limit, self.page)
    }
}

/// Page metadata returned alongside a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub total_count: i64,
    pub page_count: i64,
    pub current_page: i64,
    pub per_page: i64,
}

/// Compute page metadata. `limit` must be positive.
pub fn paginate(total_count: i64, limit: i64, page: i64) -> PageMeta {
    debug_assert!(limit > 0, "limit must be coerced before paginating");
    let total_count = total_count.max(0);
    PageMeta {
        total_count,
        page_count: total_count / limit + i64::from(total_count % limit != 0),
        current_page: page,
        per_page: limit,
    }
}

/// Optional narrowing conditions for book listings.
///
/// `search` is a case-insensitive substring match over title, description and
/// author first/last name; an empty or blank search string is not a criterion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFilter {
    pub category_id: Option<i64>,
    pub subcategory_id: Option<i64>,
    pub author_id: Option<i64>,
    pub search: Option<String>,
    /// Exact `book_type` match (e.g. `top`).
    pub book_type: Option<String>,
    /// Only books with a non-empty audio URL.
    pub audio_only: bool,
}

/// A value bound to a positional placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlParam {
    Int(i64),
    Text(String),
}

/// Sort orders a listing may use. Fixed strings only; never caller input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOrder {
    /// Most recently created first.
    Newest,
    /// Most viewed first, newest breaking ties.
    MostViewed,
}

impl ListOrder {
    fn sql(&self) -> &'static str {
        match self {
            ListOrder::Newest => "ORDER BY created_at DESC, id DESC",
            ListOrder::MostViewed => "ORDER BY view_count DESC, created_at DESC, id DESC",
        }
    }
}

/// Assembled predicate, parameters and page window of a listing query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSet {
    /// WHERE conditions, each referencing placeholders `$1..`.
    pub clauses: Vec<String>,
    /// Values for the clause placeholders, in placeholder order.
    pub params: Vec<SqlParam>,
    pub order: ListOrder,
    pub limit: i64,
    pub offset: i64,
}

impl FilterSet {
    fn new(page: &PageRequest) -> Self {
        Self {
            clauses: Vec::new(),
            params: Vec::new(),
            order: ListOrder::Newest,
            limit: page.limit(),
            offset: page.offset(),
        }
    }

    /// Replace the sort order.
    pub fn ordered_by(mut self, order: ListOrder) -> Self {
        self.order = order;
        self
    }

    /// Bind `param` and return its placeholder.
    fn bind(&mut self, param: SqlParam) -> String {
        self.params.push(param);
        format!("${}", self.params.len())
    }

    /// `WHERE TRUE AND …`; matches everything when there are no clauses.
    pub fn where_sql(&self) -> String {
        let mut sql = String::from("WHERE TRUE");
        for clause in &self.clauses {
            sql.push_str(" AND ");
            sql.push_str(clause);
        }
        sql
    }

    /// `SELECT COUNT(*)` over `source` with this predicate. Binds `params`.
    pub fn count_sql(&self, source: &str) -> String {
        format!("SELECT COUNT(*) FROM {source} {}", self.where_sql())
    }

    /// Page query over `source`: predicate, order, then `LIMIT`/`OFFSET`.
    /// Binds [`FilterSet::page_params`].
    pub fn page_sql(&self, select: &str, source: &str) -> String {
        let n = self.params.len();
        format!(
            "SELECT {select} FROM {source} {} {} LIMIT ${} OFFSET ${}",
            self.where_sql(),
            self.order.sql(),
            n + 1,
            n + 2
        )
    }

    /// Clause parameters followed by limit and offset.
    pub fn page_params(&self) -> Vec<SqlParam> {
        let mut params = self.params.clone();
        params.push(SqlParam::Int(self.limit));
        params.push(SqlParam::Int(self.offset));
        params
    }
}

/// Escape LIKE metacharacters and wrap in `%…%`.
fn contains_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

fn search_term(search: Option<&str>) -> Option<&str> {
    search.map(str::trim).filter(|s| !s.is_empty())
}

/// Build the predicate for a book listing.
///
/// Column references assume the listing source exposes the book columns and
/// `author_first_name` / `author_last_name` unqualified (see the storage
/// layer's book listing view).
pub fn build_book_filter_set(filter: &BookFilter, page: &PageRequest) -> FilterSet {
    let mut set = FilterSet::new(page);

    if let Some(id) = filter.category_id {
        let p = set.bind(SqlParam::Int(id));
        set.clauses.push(format!("category_id = {p}"));
    }
    if let Some(id) = filter.subcategory_id {
        let p = set.bind(SqlParam::Int(id));
        set.clauses.push(format!("subcategory_id = {p}"));
    }
    if let Some(id) = filter.author_id {
        let p = set.bind(SqlParam::Int(id));
        set.clauses.push(format!("author_id = {p}"));
    }
    if let Some(book_type) = filter.book_type.as_deref() {
        let p = set.bind(SqlParam::Text(book_type.to_string()));
        set.clauses.push(format!("book_type = {p}"));
    }
    if filter.audio_only {
        set.clauses.push("audio_url <> ''".to_string());
    }
    if let Some(term) = search_term(filter.search.as_deref()) {
        let p = set.bind(SqlParam::Text(contains_pattern(term)));
        set.clauses.push(format!(
            "(title ILIKE {p} OR description ILIKE {p} \
             OR author_first_name ILIKE {p} OR author_last_name ILIKE {p})"
        ));
    }

    set
}

/// Build the predicate for the author listing (search on first/last name).
pub fn build_author_filter_set(search: Option<&str>, page: &PageRequest) -> FilterSet {
    let mut set = FilterSet::new(page);
    if let Some(term) = search_term(search) {
        let p = set.bind(SqlParam::Text(contains_pattern(term)));
        set.clauses
            .push(format!("(first_name ILIKE {p} OR last_name ILIKE {p})"));
    }
    set
}
