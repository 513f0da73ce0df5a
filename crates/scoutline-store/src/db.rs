// SQLite persistence for tier ratings and category results.

use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection};
use tracing::info;

use scoutline_core::{
    AgeTier, CategoryRecord, CategoryResultSource, LookupError, MetricSnapshot, RatingResult,
};

/// A rating as read back from the `ratings` table.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRating {
    pub id: i64,
    pub player_id: String,
    pub performed_at: Option<DateTime<Utc>>,
    pub rating: RatingResult,
}

/// SQLite-backed store of ratings and their per-category results.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a SQLite database at `path` and ensure all tables
    /// exist. Pass `":memory:"` for an ephemeral in-memory database.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;
             PRAGMA foreign_keys = ON;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS ratings (
                id             INTEGER PRIMARY KEY AUTOINCREMENT,
                player_id      TEXT NOT NULL,
                tier           TEXT NOT NULL,
                performed_at   TEXT NOT NULL,
                overall_score  REAL,
                offense_score  REAL,
                defense_score  REAL,
                pitching_score REAL,
                result_json    TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS category_results (
                id             INTEGER PRIMARY KEY AUTOINCREMENT,
                rating_id      INTEGER NOT NULL REFERENCES ratings(id),
                player_id      TEXT NOT NULL,
                template_label TEXT NOT NULL,
                category       TEXT NOT NULL,
                performed_at   TEXT NOT NULL,
                score          REAL,
                total_points   REAL,
                max_points     REAL NOT NULL,
                breakdown_json TEXT NOT NULL,
                metrics_json   TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_category_results_lookup
                ON category_results(player_id, template_label, performed_at);
            ",
        )
        .context("failed to create database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the database connection.
    ///
    /// Panics if the mutex is poisoned (another thread panicked while
    /// holding the lock).
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }

    /// Record a rating and one row per assessed category in a single
    /// transaction. Categories with no test present get no row, so an older
    /// result stays the latest one for them. The raw snapshot is kept next to
    /// each category for audit. Returns the new rating id.
    pub fn record_rating(
        &self,
        player_id: &str,
        performed_at: DateTime<Utc>,
        rating: &RatingResult,
        snapshot: &MetricSnapshot,
    ) -> Result<i64> {
        let at = format_timestamp(performed_at);
        let result_json = serde_json::to_string(rating).context("failed to serialize rating")?;
        let metrics_json =
            serde_json::to_string(&snapshot.to_json()).context("failed to serialize metrics")?;

        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin rating transaction")?;

        tx.execute(
            "INSERT INTO ratings
                (player_id, tier, performed_at, overall_score, offense_score, defense_score, pitching_score, result_json)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                player_id,
                rating.tier.label(),
                at,
                rating.overall_score,
                rating.offense_score,
                rating.defense_score,
                rating.pitching_score,
                result_json,
            ],
        )
        .context("failed to insert rating")?;
        let rating_id = tx.last_insert_rowid();

        let mut written = 0;
        for (kind, result) in &rating.categories {
            if result.total_points.is_none() {
                continue;
            }
            let breakdown_json = serde_json::to_string(&result.breakdown)
                .context("failed to serialize category breakdown")?;
            tx.execute(
                "INSERT INTO category_results
                    (rating_id, player_id, template_label, category, performed_at, score, total_points, max_points, breakdown_json, metrics_json)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    rating_id,
                    player_id,
                    rating.tier.template_label(*kind),
                    kind.key(),
                    at,
                    result.score,
                    result.total_points,
                    result.max_points,
                    breakdown_json,
                    metrics_json,
                ],
            )
            .context("failed to insert category result")?;
            written += 1;
        }

        tx.commit().context("failed to commit rating")?;
        info!(
            "recorded {} rating {rating_id} for player {player_id} ({written} of {} categories assessed)",
            rating.tier,
            rating.categories.len()
        );
        Ok(rating_id)
    }

    /// Newest category result for `(player_id, template_label)`. Rows with the
    /// same performed-at time resolve to the one inserted last.
    pub fn latest_category_record(
        &self,
        player_id: &str,
        template_label: &str,
    ) -> Result<Option<CategoryRecord>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT score, breakdown_json, performed_at
                 FROM category_results
                 WHERE player_id = ?1 AND template_label = ?2
                 ORDER BY performed_at DESC, id DESC
                 LIMIT 1",
            )
            .context("failed to prepare category result query")?;

        let mut rows = stmt
            .query_map(params![player_id, template_label], |row| {
                let score: Option<f64> = row.get(0)?;
                let breakdown: String = row.get(1)?;
                let performed_at: String = row.get(2)?;
                Ok((score, breakdown, performed_at))
            })
            .context("failed to query category results")?;

        match rows.next() {
            Some(row_result) => {
                let (score, breakdown, performed_at) =
                    row_result.context("failed to read category result row")?;
                let breakdown: serde_json::Value = serde_json::from_str(&breakdown)
                    .context("failed to deserialize category breakdown")?;
                Ok(Some(CategoryRecord {
                    score,
                    breakdown,
                    performed_at: parse_timestamp(&performed_at),
                }))
            }
            None => Ok(None),
        }
    }

    /// Newest rating of `player_id` in `tier`.
    pub fn latest_rating(&self, player_id: &str, tier: AgeTier) -> Result<Option<StoredRating>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT id, performed_at, result_json
                 FROM ratings
                 WHERE player_id = ?1 AND tier = ?2
                 ORDER BY performed_at DESC, id DESC
                 LIMIT 1",
            )
            .context("failed to prepare rating query")?;

        let mut rows = stmt
            .query_map(params![player_id, tier.label()], |row| {
                let id: i64 = row.get(0)?;
                let performed_at: String = row.get(1)?;
                let result_json: String = row.get(2)?;
                Ok((id, performed_at, result_json))
            })
            .context("failed to query ratings")?;

        match rows.next() {
            Some(row_result) => {
                let (id, performed_at, result_json) =
                    row_result.context("failed to read rating row")?;
                let rating: RatingResult = serde_json::from_str(&result_json)
                    .context("failed to deserialize rating")?;
                Ok(Some(StoredRating {
                    id,
                    player_id: player_id.to_string(),
                    performed_at: parse_timestamp(&performed_at),
                    rating,
                }))
            }
            None => Ok(None),
        }
    }

    /// Number of ratings stored for `player_id`.
    pub fn rating_count(&self, player_id: &str) -> Result<usize> {
        let conn = self.conn();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM ratings WHERE player_id = ?1",
                params![player_id],
                |row| row.get(0),
            )
            .context("failed to count ratings")?;
        Ok(count as usize)
    }
}

/// Answers on the calling task. Each query is a single indexed row read,
/// so the report's five lookups run one after another under the connection
/// lock rather than on the blocking pool.
#[async_trait]
impl CategoryResultSource for Database {
    async fn latest_category_result(
        &self,
        player_id: &str,
        template_label: &str,
    ) -> Result<Option<CategoryRecord>, LookupError> {
        self.latest_category_record(player_id, template_label)
            .map_err(|e| LookupError::new(player_id, template_label, format!("{e:#}")))
    }
}

/// Fixed-width UTC timestamps so text ordering matches time ordering.
fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|at| at.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scoutline_core::{evaluate_tier_rating, CategoryKind};

    /// Helper: create a fresh in-memory database for each test.
    fn test_db() -> Database {
        Database::open(":memory:").expect("in-memory database should open")
    }

    fn at(text: &str) -> DateTime<Utc> {
        text.parse().unwrap()
    }

    fn fielding_snapshot(rep: f64) -> MetricSnapshot {
        MetricSnapshot::from_numbers([
            ("grounders_2b_rep_1", rep),
            ("grounders_2b_rep_2", rep),
            ("receiving_points", 7.0),
        ])
    }

    fn record(db: &Database, player: &str, when: &str, rep: f64) -> i64 {
        let snapshot = fielding_snapshot(rep);
        let rating = evaluate_tier_rating(AgeTier::U9, &snapshot);
        db.record_rating(player, at(when), &rating, &snapshot).unwrap()
    }

    // ------------------------------------------------------------------
    // Schema / open
    // ------------------------------------------------------------------

    #[test]
    fn open_creates_tables() {
        let db = test_db();
        let conn = db.conn();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert!(tables.contains(&"ratings".to_string()));
        assert!(tables.contains(&"category_results".to_string()));
    }

    #[test]
    fn foreign_keys_enforced() {
        let db = test_db();
        let result = db.conn().execute(
            "INSERT INTO category_results
                (rating_id, player_id, template_label, category, performed_at, max_points, breakdown_json, metrics_json)
             VALUES (9999, 'p', '9U Fielding Skills', 'fielding', '2026-01-01T00:00:00.000Z', 67, '{}', '{}')",
            [],
        );
        assert!(result.is_err());
    }

    // ------------------------------------------------------------------
    // Ratings
    // ------------------------------------------------------------------

    #[test]
    fn record_rating_writes_rows_for_assessed_categories_only() {
        let db = test_db();
        let id = record(&db, "p1", "2026-04-01T12:00:00Z", 2.0);

        let conn = db.conn();
        let rows: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM category_results WHERE rating_id = ?1",
                params![id],
                |row| row.get(0),
            )
            .unwrap();
        // Fielding and catching only; the other three categories are empty.
        assert_eq!(rows, 2);

        let metrics: String = conn
            .query_row(
                "SELECT metrics_json FROM category_results WHERE template_label = '9U Catching Skills'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        let metrics: serde_json::Value = serde_json::from_str(&metrics).unwrap();
        assert_eq!(metrics["receiving_points"], serde_json::json!(7.0));
    }

    #[test]
    fn latest_rating_round_trips_scores() {
        let db = test_db();
        record(&db, "p1", "2026-04-01T12:00:00Z", 1.0);
        let id = record(&db, "p1", "2026-05-01T12:00:00Z", 2.0);

        let stored = db.latest_rating("p1", AgeTier::U9).unwrap().unwrap();
        assert_eq!(stored.id, id);
        assert_eq!(stored.performed_at, Some(at("2026-05-01T12:00:00Z")));
        assert_eq!(
            stored.rating.category_score(CategoryKind::Fielding),
            evaluate_tier_rating(AgeTier::U9, &fielding_snapshot(2.0))
                .category_score(CategoryKind::Fielding)
        );
        assert!(db.latest_rating("p1", AgeTier::U10).unwrap().is_none());
        assert_eq!(db.rating_count("p1").unwrap(), 2);
        assert_eq!(db.rating_count("p2").unwrap(), 0);
    }

    // ------------------------------------------------------------------
    // Category lookups
    // ------------------------------------------------------------------

    #[test]
    fn latest_category_record_prefers_newest_performed_at() {
        let db = test_db();
        record(&db, "p1", "2026-06-01T09:00:00Z", 3.0);
        record(&db, "p1", "2026-02-01T09:00:00Z", 1.0);

        let rec = db
            .latest_category_record("p1", "9U Fielding Skills")
            .unwrap()
            .unwrap();
        assert_eq!(rec.performed_at, Some(at("2026-06-01T09:00:00Z")));
        assert_eq!(rec.test_points("grounders_2b"), Some(6.0));
    }

    #[test]
    fn same_timestamp_resolves_to_last_inserted() {
        let db = test_db();
        record(&db, "p1", "2026-06-01T09:00:00Z", 1.0);
        record(&db, "p1", "2026-06-01T09:00:00Z", 3.0);

        let rec = db
            .latest_category_record("p1", "9U Fielding Skills")
            .unwrap()
            .unwrap();
        assert_eq!(rec.test_points("grounders_2b"), Some(6.0));
    }

    #[test]
    fn later_session_without_a_category_keeps_the_older_result() {
        let db = test_db();
        record(&db, "p1", "2026-04-01T09:00:00Z", 2.0);

        let hitting = MetricSnapshot::from_numbers([("bat_speed_mph", 48.0)]);
        let rating = evaluate_tier_rating(AgeTier::U9, &hitting);
        db.record_rating("p1", at("2026-05-01T09:00:00Z"), &rating, &hitting)
            .unwrap();

        let fielding = db
            .latest_category_record("p1", "9U Fielding Skills")
            .unwrap()
            .unwrap();
        assert_eq!(fielding.performed_at, Some(at("2026-04-01T09:00:00Z")));
        assert_eq!(fielding.test_points("grounders_2b"), Some(4.0));

        let hitting = db
            .latest_category_record("p1", "9U Hitting Skills")
            .unwrap()
            .unwrap();
        assert_eq!(hitting.performed_at, Some(at("2026-05-01T09:00:00Z")));
    }

    #[test]
    fn missing_history_is_none() {
        let db = test_db();
        record(&db, "p1", "2026-06-01T09:00:00Z", 1.0);
        assert!(db
            .latest_category_record("p2", "9U Fielding Skills")
            .unwrap()
            .is_none());
        assert!(db
            .latest_category_record("p1", "10U Fielding Skills")
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn lookup_trait_reads_from_store() {
        let db = test_db();
        record(&db, "p1", "2026-06-01T09:00:00Z", 2.0);
        let rec = db
            .latest_category_result("p1", "9U Catching Skills")
            .await
            .unwrap()
            .unwrap();
        // receiving 7 of a 30-point catching battery
        assert_eq!(rec.score, Some(11.7));
    }

    #[test]
    fn timestamps_sort_as_text() {
        let early = format_timestamp(at("2026-01-02T03:04:05Z"));
        let late = format_timestamp(at("2026-01-02T03:04:05.5Z"));
        assert_eq!(early, "2026-01-02T03:04:05.000Z");
        assert!(early < late);
        assert_eq!(parse_timestamp(&late), Some(at("2026-01-02T03:04:05.500Z")));
        assert_eq!(parse_timestamp("yesterday"), None);
    }
}
