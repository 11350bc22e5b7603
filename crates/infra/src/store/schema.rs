//! Postgres DDL applied by [`super::PostgresRecordStore::migrate`].
//!
//! Every statement is idempotent.

pub(crate) const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS countries (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        code TEXT NOT NULL UNIQUE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS country_states (
        id BIGSERIAL PRIMARY KEY,
        country_id BIGINT NOT NULL REFERENCES countries (id),
        name TEXT NOT NULL,
        code TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS currencies (
        id BIGSERIAL PRIMARY KEY,
        code TEXT NOT NULL UNIQUE,
        full_name TEXT NOT NULL,
        symbol TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS partners (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL CHECK (length(trim(name)) > 0),
        email TEXT,
        phone TEXT,
        mobile TEXT,
        fax TEXT,
        street TEXT,
        city TEXT,
        zip TEXT,
        state_id BIGINT REFERENCES country_states (id),
        country_id BIGINT REFERENCES countries (id),
        gender TEXT,
        date_of_birth DATE,
        spouse_date_of_birth DATE,
        wedding_anniversary DATE,
        nationality TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS partners_email_idx ON partners (email)",
    "CREATE INDEX IF NOT EXISTS partners_mobile_idx ON partners (mobile)",
    r#"
    CREATE TABLE IF NOT EXISTS products (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL CHECK (length(trim(name)) > 0),
        product_type TEXT NOT NULL CHECK (product_type IN ('service', 'consumable', 'storable')),
        list_price DOUBLE PRECISION NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS products_name_idx ON products (name)",
    r#"
    CREATE TABLE IF NOT EXISTS invoices (
        id BIGSERIAL PRIMARY KEY,
        partner_id BIGINT NOT NULL REFERENCES partners (id),
        currency_id BIGINT NOT NULL REFERENCES currencies (id),
        move_type TEXT NOT NULL,
        invoice_date DATE NOT NULL,
        currency_code TEXT,
        total_amount_before_tax NUMERIC,
        total_tax NUMERIC,
        total_discount NUMERIC,
        total_amount_after_tax NUMERIC,
        total_payment NUMERIC,
        payment_reference TEXT,
        payment_method TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS invoice_lines (
        id BIGSERIAL PRIMARY KEY,
        invoice_id BIGINT NOT NULL REFERENCES invoices (id) ON DELETE CASCADE,
        position INTEGER NOT NULL,
        product_id BIGINT NOT NULL REFERENCES products (id),
        quantity DOUBLE PRECISION NOT NULL,
        price_unit DOUBLE PRECISION NOT NULL,
        UNIQUE (invoice_id, position)
    )
    "#,
];
