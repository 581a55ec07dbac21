//! Hosted backend client.
//!
//! Blocking reqwest client (no async runtime) speaking the PostgREST table API
//! and the object-storage upload API of the hosted backend. No retries.

use std::time::Duration;

use chrono::Utc;
use reqwest::{
    blocking::{Client, RequestBuilder, Response},
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
};
use serde::Serialize;

use crate::{
    config::RestSettings,
    domain::{ExpenseCategory, ExpenseRecord, GuestRecord, NewGuest, RecordId},
    errors::{BudgetError, Result},
};

use super::{
    rows::{guests_from_rows, records_from_rows, ExpenseRow, GuestRow},
    storage_file_name, Attachment, AttachmentStore, ExpenseStore, GuestStore,
};

/// Client for the hosted tables and the receipts bucket.
#[derive(Clone)]
pub struct RestBackend {
    http: Client,
    base_url: String,
    settings: RestSettings,
}

/// Mutable expense columns sent on update; id and created_at stay untouched.
#[derive(Serialize)]
struct ExpenseUpdate<'a> {
    description: &'a str,
    amount: Option<f64>,
    date: &'a str,
    month_year: Option<&'a str>,
    receipt_url: Option<&'a str>,
    status: &'a str,
}

impl RestBackend {
    pub fn new(settings: RestSettings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&settings.anon_key)
            .map_err(|e| BudgetError::Config(format!("invalid API key: {e}")))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", settings.anon_key))
            .map_err(|e| BudgetError::Config(format!("invalid API key: {e}")))?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);

        let http = Client::builder()
            .user_agent(format!("couple_budget/{}", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| BudgetError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: settings.url.trim_end_matches('/').to_string(),
            settings,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Public URL of an object in the receipts bucket.
    pub fn public_url(&self, object_name: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.settings.bucket, object_name
        )
    }

    fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send()?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .text()
            .unwrap_or_else(|e| format!("<unreadable body: {e}>"));
        tracing::warn!(status = status.as_u16(), %message, "backend request failed");
        Err(BudgetError::Backend {
            status: status.as_u16(),
            message,
        })
    }

    fn fetch_expense_rows(&self, filter: Option<ExpenseCategory>) -> Result<Vec<ExpenseRow>> {
        let url = self.table_url(&self.settings.expenses_table);
        let mut query = vec![
            ("select", "*".to_string()),
            ("order", "date.asc".to_string()),
        ];
        if let Some(category) = filter {
            query.push(("type", format!("eq.{}", category.code())));
        }
        tracing::debug!(%url, ?filter, "fetching expenses");
        let response = self.send(self.http.get(&url).query(&query))?;
        Ok(response.json::<Vec<ExpenseRow>>()?)
    }

    fn insert_rows(&self, rows: &[ExpenseRow]) -> Result<()> {
        let url = self.table_url(&self.settings.expenses_table);
        tracing::debug!(%url, count = rows.len(), "inserting expenses");
        // An array body is applied by the backend in a single statement.
        self.send(
            self.http
                .post(&url)
                .header("Prefer", "return=minimal")
                .json(rows),
        )?;
        Ok(())
    }
}

impl ExpenseStore for RestBackend {
    fn fetch_all(&self) -> Result<Vec<ExpenseRecord>> {
        records_from_rows(self.fetch_expense_rows(None)?)
    }

    fn fetch_by_category(&self, category: ExpenseCategory) -> Result<Vec<ExpenseRecord>> {
        records_from_rows(self.fetch_expense_rows(Some(category))?)
    }

    fn insert_one(&self, record: &ExpenseRecord) -> Result<()> {
        self.insert_rows(&[ExpenseRow::from(record)])
    }

    fn insert_many(&self, records: &[ExpenseRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        let rows: Vec<ExpenseRow> = records.iter().map(ExpenseRow::from).collect();
        self.insert_rows(&rows)
    }

    fn update(&self, record: &ExpenseRecord) -> Result<()> {
        let url = self.table_url(&self.settings.expenses_table);
        let row = ExpenseRow::from(record);
        let body = ExpenseUpdate {
            description: &record.description,
            amount: row.amount,
            date: record.date.as_str(),
            month_year: row.month_year.as_deref(),
            receipt_url: record.receipt_url.as_deref(),
            status: record.status.code(),
        };
        let response = self.send(
            self.http
                .patch(&url)
                .query(&[("id", format!("eq.{}", record.id))])
                .header("Prefer", "return=representation")
                .json(&body),
        )?;
        let updated: Vec<serde_json::Value> = response.json()?;
        if updated.is_empty() {
            return Err(BudgetError::NotFound(record.id.to_string()));
        }
        Ok(())
    }

    fn delete(&self, id: &RecordId) -> Result<()> {
        let url = self.table_url(&self.settings.expenses_table);
        self.send(self.http.delete(&url).query(&[("id", format!("eq.{id}"))]))?;
        Ok(())
    }
}

impl GuestStore for RestBackend {
    fn fetch_all(&self) -> Result<Vec<GuestRecord>> {
        let url = self.table_url(&self.settings.guests_table);
        let response = self.send(
            self.http
                .get(&url)
                .query(&[("select", "*"), ("order", "created_at.desc")]),
        )?;
        guests_from_rows(response.json::<Vec<GuestRow>>()?)
    }

    fn insert(&self, guest: &NewGuest) -> Result<GuestRecord> {
        let url = self.table_url(&self.settings.guests_table);
        let row = GuestRow::for_insert(guest, Utc::now());
        let response = self.send(
            self.http
                .post(&url)
                .header("Prefer", "return=representation")
                .json(&[row]),
        )?;
        let mut rows: Vec<GuestRow> = response.json()?;
        let stored = rows
            .pop()
            .ok_or_else(|| BudgetError::mapping("guests", "id", "insert returned no row"))?;
        GuestRecord::try_from(stored)
    }

    fn delete(&self, id: &RecordId) -> Result<()> {
        let url = self.table_url(&self.settings.guests_table);
        self.send(self.http.delete(&url).query(&[("id", format!("eq.{id}"))]))?;
        Ok(())
    }
}

impl AttachmentStore for RestBackend {
    fn upload(&self, attachment: &Attachment) -> Result<String> {
        let name = storage_file_name(&attachment.file_name, Utc::now());
        let url = format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url, self.settings.bucket, name
        );
        tracing::debug!(%url, bytes = attachment.bytes.len(), "uploading attachment");
        self.send(
            self.http
                .post(&url)
                .header(CONTENT_TYPE, attachment.content_type.as_str())
                .header("x-upsert", "false")
                .body(attachment.bytes.clone()),
        )?;
        Ok(self.public_url(&name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GuestSide, PaymentStatus};
    use httpmock::prelude::*;
    use rust_decimal::Decimal;
    use serde_json::json;

    fn backend(server: &MockServer) -> RestBackend {
        let settings = RestSettings {
            url: server.base_url(),
            anon_key: "test-key".into(),
            ..RestSettings::default()
        };
        RestBackend::new(settings).expect("client")
    }

    fn fee_row(id: &str, date: &str, status: &str) -> serde_json::Value {
        json!({
            "id": id,
            "type": "FEE",
            "description": "fee",
            "amount": 500,
            "date": date,
            "month_year": null,
            "created_at": "2024-01-01T00:00:00+00:00",
            "receipt_url": null,
            "status": status
        })
    }

    #[test]
    fn fetch_all_sends_auth_headers_and_maps_rows() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/rest/v1/expenses")
                .query_param("select", "*")
                .header("apikey", "test-key")
                .header("Authorization", "Bearer test-key");
            then.status(200).json_body(json!([
                fee_row("a", "2024-01-10", "PAID"),
                fee_row("b", "2024-02-10", "PENDING")
            ]));
        });

        let records = ExpenseStore::fetch_all(&backend(&server)).expect("fetch");
        mock.assert();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].status, PaymentStatus::Paid);
        assert_eq!(records[1].amount, Decimal::new(500, 0));
    }

    #[test]
    fn fetch_by_category_filters_on_type() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/rest/v1/expenses")
                .query_param("type", "eq.FEE");
            then.status(200).json_body(json!([fee_row("a", "2024-01-10", "PAID")]));
        });
        let records = backend(&server)
            .fetch_by_category(ExpenseCategory::Fee)
            .expect("fetch");
        mock.assert();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn malformed_rows_surface_as_mapping_errors() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/rest/v1/expenses");
            then.status(200).json_body(json!([{ "id": "a", "type": "FEE" }]));
        });
        let err = ExpenseStore::fetch_all(&backend(&server)).unwrap_err();
        assert!(matches!(err, BudgetError::Mapping { .. }), "{err}");
    }

    #[test]
    fn insert_many_posts_one_array() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/rest/v1/expenses")
                .header("Prefer", "return=minimal")
                .body_includes("\"month_year\"");
            then.status(201);
        });
        let records: Vec<ExpenseRecord> = (1..=3)
            .map(|m| {
                ExpenseRecord::new(
                    ExpenseCategory::Installment,
                    "parcel",
                    Decimal::ONE,
                    format!("2024-{m:02}-05").parse().unwrap(),
                )
                .unwrap()
            })
            .collect();
        backend(&server).insert_many(&records).expect("insert");
        mock.assert_calls(1);
    }

    #[test]
    fn backend_errors_keep_status_and_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/rest/v1/expenses");
            then.status(401)
                .body("new row violates row-level security policy for table \"expenses\"");
        });
        let record = ExpenseRecord::new(
            ExpenseCategory::Note,
            "gate",
            Decimal::ONE,
            "2024-01-01".parse().unwrap(),
        )
        .unwrap();
        let err = backend(&server).insert_one(&record).unwrap_err();
        assert!(matches!(err, BudgetError::Backend { status: 401, .. }));
        assert_eq!(err.diagnosis(), crate::errors::Diagnosis::PolicyDenied);
    }

    #[test]
    fn update_patches_by_id() {
        let server = MockServer::start();
        let record = ExpenseRecord::new(
            ExpenseCategory::Buffet,
            "menu",
            Decimal::new(1999, 2),
            "2025-05-01".parse().unwrap(),
        )
        .unwrap()
        .with_status(PaymentStatus::Paid);
        let id_filter = format!("eq.{}", record.id);
        let mock = server.mock(|when, then| {
            when.method(PATCH)
                .path("/rest/v1/expenses")
                .query_param("id", id_filter.as_str())
                .body_includes("\"status\":\"PAID\"")
                .body_includes("\"description\":\"menu\"");
            then.status(200).json_body(json!([{ "id": "x" }]));
        });
        backend(&server).update(&record).expect("update");
        mock.assert();
    }

    #[test]
    fn update_of_unknown_id_is_not_found() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(PATCH).path("/rest/v1/expenses");
            then.status(200).json_body(json!([]));
        });
        let record = ExpenseRecord::new(
            ExpenseCategory::Buffet,
            "menu",
            Decimal::ONE,
            "2025-05-01".parse().unwrap(),
        )
        .unwrap();
        let err = backend(&server).update(&record).unwrap_err();
        assert!(matches!(err, BudgetError::NotFound(_)));
    }

    #[test]
    fn delete_filters_on_id() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(DELETE)
                .path("/rest/v1/expenses")
                .query_param("id", "eq.abc");
            then.status(204);
        });
        ExpenseStore::delete(&backend(&server), &RecordId::new("abc")).expect("delete");
        mock.assert();
    }

    #[test]
    fn guests_are_requested_newest_first_and_inserted_with_representation() {
        let server = MockServer::start();
        let list = server.mock(|when, then| {
            when.method(GET)
                .path("/rest/v1/guests")
                .query_param("order", "created_at.desc");
            then.status(200).json_body(json!([
                { "id": 2, "name": "Bruno", "side": "GROOM", "is_child": true,
                  "created_at": "2025-01-02T00:00:00+00:00" },
                { "id": 1, "name": "Ana", "side": "BRIDE", "is_child": false,
                  "created_at": "2025-01-01T00:00:00+00:00" }
            ]));
        });
        let insert = server.mock(|when, then| {
            when.method(POST)
                .path("/rest/v1/guests")
                .header("Prefer", "return=representation");
            then.status(201).json_body(json!([
                { "id": 3, "name": "Carla", "side": "BRIDE", "is_child": null,
                  "created_at": "2025-01-03T00:00:00+00:00" }
            ]));
        });

        let backend = backend(&server);
        let guests = GuestStore::fetch_all(&backend).expect("fetch");
        assert_eq!(guests[0].name, "Bruno");
        let stored = backend
            .insert(&NewGuest::new("Carla", GuestSide::Bride).unwrap())
            .expect("insert");
        assert_eq!(stored.id.as_str(), "3");
        assert!(!stored.is_child);
        list.assert();
        insert.assert();
    }

    #[test]
    fn upload_returns_public_url() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path_includes("/storage/v1/object/receipts/")
                .header("Content-Type", "image/png");
            then.status(200).json_body(json!({ "Key": "receipts/x.png" }));
        });
        let url = backend(&server)
            .upload(&Attachment::new("foto.png", vec![1, 2, 3]))
            .expect("upload");
        mock.assert();
        let public_prefix = format!("{}/storage/v1/object/public/receipts/", server.base_url());
        assert!(url.starts_with(&public_prefix), "{url}");
        assert!(url.ends_with(".png"));
    }

    #[test]
    fn missing_bucket_is_diagnosed() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path_includes("/storage/v1/object/");
            then.status(400).json_body(json!({
                "statusCode": "404",
                "error": "Bucket not found",
                "message": "Bucket not found"
            }));
        });
        let err = backend(&server)
            .upload(&Attachment::new("a.pdf", vec![0]))
            .unwrap_err();
        assert_eq!(err.diagnosis(), crate::errors::Diagnosis::MissingBucket);
    }
}
