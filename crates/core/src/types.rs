/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Calendar dates (move-in, move-out, due dates) carry no time zone.
pub type Date = chrono::NaiveDate;

/// Monetary amounts are stored as integer cents.
pub type Cents = i64;

/// Largest amount accepted for any rate, fee or payment (one billion dollars).
///
/// Keeps every derived total well inside `i64`.
pub const MAX_AMOUNT_CENTS: Cents = 100_000_000_000;
