//! Postgres-backed record store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (foreign key violation) | `23503` | `ForeignKey` |
//! | Database (unique / check / not-null violation) | `23505`, `23514`, `23502` | `Constraint` |
//! | Database (other) | Any other | `Database` |
//! | ColumnDecode / Decode | N/A | `Decode` |
//! | Other | N/A | `Database` |
//!
//! Every transaction is a real Postgres transaction; dropping a
//! [`PostgresTransaction`] without committing rolls it back.

use async_trait::async_trait;
use serde_json::Number;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;

use intake_core::{CountryId, CurrencyId, InvoiceId, PartnerId, ProductId, RecordId, StateId};
use intake_invoicing::NewInvoice;
use intake_parties::{NewPartner, PartnerMatch};
use intake_products::NewProduct;

use super::schema::STATEMENTS;
use super::{DEFAULT_CURRENCIES, RecordStore, StoreError, StoreResult, StoreTransaction};

/// Record store over a Postgres connection pool.
#[derive(Debug, Clone)]
pub struct PostgresRecordStore {
    pool: PgPool,
}

impl PostgresRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create missing tables and seed the default currencies.
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> StoreResult<()> {
        for statement in STATEMENTS {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("migrate", e))?;
        }

        for (code, full_name, symbol) in DEFAULT_CURRENCIES {
            sqlx::query(
                r#"
                INSERT INTO currencies (code, full_name, symbol)
                VALUES ($1, $2, $3)
                ON CONFLICT (code) DO NOTHING
                "#,
            )
            .bind(*code)
            .bind(*full_name)
            .bind(*symbol)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("seed_currencies", e))?;
        }

        tracing::info!(statements = STATEMENTS.len(), "record store schema ready");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl RecordStore for PostgresRecordStore {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTransaction>> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;
        Ok(Box::new(PostgresTransaction { tx }))
    }
}

/// One Postgres transaction.
pub struct PostgresTransaction {
    tx: Transaction<'static, Postgres>,
}

impl PostgresTransaction {
    async fn exists(&mut self, operation: &str, sql: &str, id: i64) -> StoreResult<bool> {
        sqlx::query_scalar::<_, bool>(sql)
            .bind(id)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error(operation, e))
    }

    async fn find_id<T: RecordId>(
        &mut self,
        operation: &str,
        sql: &str,
        key: &str,
    ) -> StoreResult<Option<T>> {
        let id = sqlx::query_scalar::<_, i64>(sql)
            .bind(key)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error(operation, e))?;
        Ok(id.map(T::from_raw))
    }
}

#[async_trait]
impl StoreTransaction for PostgresTransaction {
    #[instrument(skip(self), fields(partner_id = %id), err)]
    async fn partner_exists(&mut self, id: PartnerId) -> StoreResult<bool> {
        self.exists(
            "partner_exists",
            "SELECT EXISTS (SELECT 1 FROM partners WHERE id = $1)",
            id.get(),
        )
        .await
    }

    #[instrument(skip(self, criteria), err)]
    async fn find_partner(&mut self, criteria: &PartnerMatch) -> StoreResult<Option<PartnerId>> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT id FROM partners
            WHERE ($1::text IS NOT NULL AND email = $1)
               OR ($2::text IS NOT NULL AND mobile = $2)
            ORDER BY id ASC
            LIMIT 1
            "#,
        )
        .bind(criteria.email.as_deref())
        .bind(criteria.mobile.as_deref())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("find_partner", e))?;
        Ok(id.map(PartnerId::from_raw))
    }

    #[instrument(skip(self, partner), err)]
    async fn create_partner(&mut self, partner: &NewPartner) -> StoreResult<PartnerId> {
        partner
            .validate()
            .map_err(|e| StoreError::Constraint(format!("partner: {e}")))?;

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO partners (
                name, email, phone, mobile, fax,
                street, city, zip, state_id, country_id,
                gender, date_of_birth, spouse_date_of_birth, wedding_anniversary, nationality
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING id
            "#,
        )
        .bind(&partner.name)
        .bind(partner.contact.email.as_deref())
        .bind(partner.contact.phone.as_deref())
        .bind(partner.contact.mobile.as_deref())
        .bind(partner.contact.fax.as_deref())
        .bind(partner.address.street.as_deref())
        .bind(partner.address.city.as_deref())
        .bind(partner.address.zip.as_deref())
        .bind(partner.address.state_id.map(StateId::get))
        .bind(partner.address.country_id.map(CountryId::get))
        .bind(partner.personal.gender.as_deref())
        .bind(partner.personal.date_of_birth)
        .bind(partner.personal.spouse_date_of_birth)
        .bind(partner.personal.wedding_anniversary)
        .bind(partner.personal.nationality.as_deref())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("create_partner", e))?;

        Ok(PartnerId::from_raw(id))
    }

    #[instrument(skip(self), err)]
    async fn find_country(&mut self, name: &str) -> StoreResult<Option<CountryId>> {
        self.find_id(
            "find_country",
            "SELECT id FROM countries WHERE name = $1 ORDER BY id ASC LIMIT 1",
            name,
        )
        .await
    }

    #[instrument(skip(self), err)]
    async fn find_state(
        &mut self,
        name: &str,
        country_id: Option<CountryId>,
    ) -> StoreResult<Option<StateId>> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT id FROM country_states
            WHERE name = $1 AND ($2::bigint IS NULL OR country_id = $2)
            ORDER BY id ASC
            LIMIT 1
            "#,
        )
        .bind(name)
        .bind(country_id.map(CountryId::get))
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("find_state", e))?;
        Ok(id.map(StateId::from_raw))
    }

    #[instrument(skip(self), fields(currency_id = %id), err)]
    async fn currency_exists(&mut self, id: CurrencyId) -> StoreResult<bool> {
        self.exists(
            "currency_exists",
            "SELECT EXISTS (SELECT 1 FROM currencies WHERE id = $1)",
            id.get(),
        )
        .await
    }

    #[instrument(skip(self), err)]
    async fn find_currency(&mut self, code_or_name: &str) -> StoreResult<Option<CurrencyId>> {
        self.find_id(
            "find_currency",
            "SELECT id FROM currencies WHERE code = $1 OR full_name = $1 ORDER BY id ASC LIMIT 1",
            code_or_name,
        )
        .await
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn product_exists(&mut self, id: ProductId) -> StoreResult<bool> {
        self.exists(
            "product_exists",
            "SELECT EXISTS (SELECT 1 FROM products WHERE id = $1)",
            id.get(),
        )
        .await
    }

    #[instrument(skip(self), err)]
    async fn find_product(&mut self, name: &str) -> StoreResult<Option<ProductId>> {
        self.find_id(
            "find_product",
            "SELECT id FROM products WHERE name = $1 ORDER BY id ASC LIMIT 1",
            name,
        )
        .await
    }

    #[instrument(skip(self, product), fields(name = %product.name), err)]
    async fn create_product(&mut self, product: &NewProduct) -> StoreResult<ProductId> {
        product
            .validate()
            .map_err(|e| StoreError::Constraint(format!("product: {e}")))?;

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO products (name, product_type, list_price)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(&product.name)
        .bind(product.product_type.as_str())
        .bind(product.list_price)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("create_product", e))?;

        Ok(ProductId::from_raw(id))
    }

    #[instrument(
        skip(self, invoice),
        fields(
            partner_id = %invoice.partner_id,
            currency_id = %invoice.currency_id,
            line_count = invoice.lines.len()
        ),
        err
    )]
    async fn create_invoice(&mut self, invoice: &NewInvoice) -> StoreResult<InvoiceId> {
        if invoice.lines.is_empty() {
            return Err(StoreError::Constraint("invoice has no lines".to_string()));
        }

        let totals = &invoice.totals;
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO invoices (
                partner_id, currency_id, move_type, invoice_date, currency_code,
                total_amount_before_tax, total_tax, total_discount,
                total_amount_after_tax, total_payment,
                payment_reference, payment_method
            )
            VALUES (
                $1, $2, $3, $4, $5,
                $6::numeric, $7::numeric, $8::numeric,
                $9::numeric, $10::numeric,
                $11, $12
            )
            RETURNING id
            "#,
        )
        .bind(invoice.partner_id.get())
        .bind(invoice.currency_id.get())
        .bind(invoice.move_type.as_str())
        .bind(invoice.invoice_date)
        .bind(invoice.currency_code.as_deref())
        .bind(numeric_text(&totals.total_amount_before_tax))
        .bind(numeric_text(&totals.total_tax))
        .bind(numeric_text(&totals.total_discount))
        .bind(numeric_text(&totals.total_amount_after_tax))
        .bind(numeric_text(&totals.total_payment))
        .bind(invoice.payment_reference.as_deref())
        .bind(invoice.payment_method.as_deref())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("create_invoice", e))?;

        for (position, line) in invoice.lines.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO invoice_lines (invoice_id, position, product_id, quantity, price_unit)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(id)
            .bind(position as i32)
            .bind(line.product_id.get())
            .bind(line.quantity)
            .bind(line.price_unit)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("create_invoice_line", e))?;
        }

        Ok(InvoiceId::from_raw(id))
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let PostgresTransaction { tx } = *self;
        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        let PostgresTransaction { tx } = *self;
        tx.rollback().await.map_err(|e| map_sqlx_error("rollback", e))
    }
}

/// Totals are bound as text and cast to NUMERIC server-side.
fn numeric_text(value: &Option<Number>) -> Option<String> {
    value.as_ref().map(Number::to_string)
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("{} in {}", db_err.message(), operation);
            match db_err.code().as_deref() {
                Some("23503") => StoreError::ForeignKey(msg),
                Some("23505") | Some("23514") | Some("23502") => StoreError::Constraint(msg),
                _ => StoreError::Database(msg),
            }
        }
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            StoreError::Decode(format!("{} in {}", err, operation))
        }
        sqlx::Error::PoolClosed => {
            StoreError::Database(format!("connection pool closed in {}", operation))
        }
        _ => StoreError::Database(format!("sqlx error in {}: {}", operation, err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_text_keeps_supplied_digits() {
        let value: Number = serde_json::from_str("1200.5").unwrap();
        assert_eq!(numeric_text(&Some(value)).as_deref(), Some("1200.5"));
        assert_eq!(numeric_text(&None), None);
    }

    #[test]
    fn non_database_errors_map_to_database_kind() {
        let err = map_sqlx_error("commit", sqlx::Error::PoolClosed);
        assert!(matches!(err, StoreError::Database(_)));
        assert!(err.to_string().contains("commit"));

        let err = map_sqlx_error("find_product", sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Database(_)));
    }
}
