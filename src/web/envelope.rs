// src/web/envelope.rs

//! Uniform response envelope: every success carries `status: "SUCCESS"` plus
//! `data` (and pagination for list endpoints); failures are shaped by
//! `AppError::error_response`.

use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};
use serde_json::json;

const DEFAULT_PAGE_SIZE: i64 = 10;
const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
  pub total_pages: i64,
  pub current_page: i64,
  pub total_items: i64,
  pub current_items: usize,
  pub limit: i64,
}

impl Pagination {
  pub fn new(total_items: i64, page: i64, current_items: usize, limit: i64) -> Self {
    Self {
      total_pages: (total_items + limit - 1) / limit,
      current_page: page,
      total_items,
      current_items,
      limit,
    }
  }
}

/// `page`/`limit` query parameters, normalized to sane bounds.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
  pub page: Option<i64>,
  pub limit: Option<i64>,
}

impl PageQuery {
  pub fn page(&self) -> i64 {
    self.page.unwrap_or(1).max(1)
  }

  pub fn limit(&self) -> i64 {
    self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
  }

  pub fn offset(&self) -> i64 {
    (self.page() - 1) * self.limit()
  }
}

pub fn ok(data: impl Serialize) -> HttpResponse {
  HttpResponse::Ok().json(json!({ "status": "SUCCESS", "data": data }))
}

pub fn ok_message(message: &str, data: impl Serialize) -> HttpResponse {
  HttpResponse::Ok().json(json!({ "status": "SUCCESS", "message": message, "data": data }))
}

pub fn ok_paginated(data: impl Serialize, pagination: Pagination) -> HttpResponse {
  HttpResponse::Ok().json(json!({ "status": "SUCCESS", "data": data, "pagination": pagination }))
}

pub fn created(message: &str, data: impl Serialize) -> HttpResponse {
  HttpResponse::Created().json(json!({ "status": "SUCCESS", "message": message, "data": data }))
}

pub fn ok_empty(message: &str) -> HttpResponse {
  HttpResponse::Ok().json(json!({ "status": "SUCCESS", "message": message }))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn pagination_rounds_total_pages_up() {
    let p = Pagination::new(21, 1, 10, 10);
    assert_eq!(p.total_pages, 3);
    let exact = Pagination::new(20, 2, 10, 10);
    assert_eq!(exact.total_pages, 2);
    let empty = Pagination::new(0, 1, 0, 10);
    assert_eq!(empty.total_pages, 0);
  }

  #[test]
  fn page_query_defaults_and_clamps() {
    let q = PageQuery::default();
    assert_eq!((q.page(), q.limit(), q.offset()), (1, 10, 0));

    let q = PageQuery {
      page: Some(0),
      limit: Some(1000),
    };
    assert_eq!(q.page(), 1);
    assert_eq!(q.limit(), MAX_PAGE_SIZE);

    let q = PageQuery {
      page: Some(3),
      limit: Some(20),
    };
    assert_eq!(q.offset(), 40);
  }

  #[test]
  fn pagination_serializes_camel_case() {
    let p = Pagination::new(5, 1, 5, 10);
    let value = serde_json::to_value(&p).unwrap();
    assert!(value.get("totalPages").is_some());
    assert!(value.get("currentPage").is_some());
    assert!(value.get("totalItems").is_some());
    assert!(value.get("currentItems").is_some());
  }
}
