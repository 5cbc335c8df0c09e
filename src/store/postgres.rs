use async_trait::async_trait;
use chrono::NaiveDateTime;
use tracing::{debug, info};

use super::{venue_layout, BookOutcome, SeatStore, StoreError};
use crate::database::Database;
use crate::models::Seat;

type SeatTuple = (i64, i32, i32, String, NaiveDateTime);

fn into_seat((id, row, seat_number, status, updated_at): SeatTuple) -> Result<Seat, StoreError> {
    Ok(Seat {
        id,
        row,
        seat_number,
        status: status.parse()?,
        updated_at,
    })
}

#[derive(Clone)]
pub struct PgSeatStore {
    db: Database,
}

impl PgSeatStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SeatStore for PgSeatStore {
    async fn list_all(&self) -> Result<Vec<Seat>, StoreError> {
        let rows = sqlx::query_as::<_, SeatTuple>(
            "SELECT id, row, seat_number, status, updated_at FROM seats ORDER BY row, seat_number",
        )
        .fetch_all(&self.db.pool)
        .await?;

        rows.into_iter().map(into_seat).collect()
    }

    async fn list_available(&self) -> Result<Vec<Seat>, StoreError> {
        let rows = sqlx::query_as::<_, SeatTuple>(
            r#"
            SELECT id, row, seat_number, status, updated_at
            FROM seats
            WHERE status = 'available'
            ORDER BY row, seat_number
            "#,
        )
        .fetch_all(&self.db.pool)
        .await?;

        rows.into_iter().map(into_seat).collect()
    }

    async fn mark_booked(&self, seat_number: i32) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE seats SET status = 'booked', updated_at = NOW() WHERE seat_number = $1",
        )
        .bind(seat_number)
        .execute(&self.db.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn try_book(&self, seat_numbers: &[i32]) -> Result<BookOutcome, StoreError> {
        let mut tx = self.db.pool.begin().await?;

        let booked: Vec<i32> = sqlx::query_scalar(
            r#"
            UPDATE seats
            SET status = 'booked', updated_at = NOW()
            WHERE seat_number = ANY($1) AND status = 'available'
            RETURNING seat_number
            "#,
        )
        .bind(seat_numbers)
        .fetch_all(&mut *tx)
        .await?;

        if booked.len() != seat_numbers.len() {
            debug!(
                "try_book conflict: wanted {:?}, only {:?} still available",
                seat_numbers, booked
            );
            tx.rollback().await?;
            return Ok(BookOutcome::Conflict);
        }

        tx.commit().await?;
        Ok(BookOutcome::Booked)
    }

    async fn reset_all(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("UPDATE seats SET status = 'available', updated_at = NOW()")
            .execute(&self.db.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn seed_if_empty(&self) -> Result<u64, StoreError> {
        let mut tx = self.db.pool.begin().await?;

        // Serializes concurrent starters; released on commit/rollback.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext('seats_seed'))")
            .execute(&mut *tx)
            .await?;

        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM seats")
            .fetch_one(&mut *tx)
            .await?;
        if existing > 0 {
            info!("Seat store already holds {} seats, skipping seed", existing);
            tx.rollback().await?;
            return Ok(0);
        }

        let (numbers, rows): (Vec<i32>, Vec<i32>) = venue_layout().into_iter().unzip();
        let inserted = sqlx::query(
            r#"
            INSERT INTO seats (seat_number, row, status)
            SELECT n, r, 'available' FROM UNNEST($1::int4[], $2::int4[]) AS t(n, r)
            ON CONFLICT (seat_number) DO NOTHING
            "#,
        )
        .bind(&numbers)
        .bind(&rows)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;
        info!("Seeded {} seats", inserted);
        Ok(inserted)
    }

    async fn count(&self) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM seats")
            .fetch_one(&self.db.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheService;
    use crate::services::reservation::ReservationService;
    use sqlx::PgPool;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn store(pool: PgPool) -> PgSeatStore {
        PgSeatStore::new(Database { pool })
    }

    #[sqlx::test(migrations = "./src/migrations")]
    #[ignore = "needs a Postgres server at DATABASE_URL"]
    async fn seeds_once_with_partial_last_row(pool: PgPool) {
        let store = store(pool);
        assert_eq!(store.seed_if_empty().await.unwrap(), 80);
        assert_eq!(store.seed_if_empty().await.unwrap(), 0);
        assert_eq!(store.count().await.unwrap(), 80);

        let all = store.list_all().await.unwrap();
        let last_row: Vec<i32> = all
            .iter()
            .filter(|s| s.seat_number >= 78)
            .map(|s| s.row)
            .collect();
        assert_eq!(last_row, vec![12, 12, 12]);
        assert!(all.iter().filter(|s| s.seat_number <= 7).all(|s| s.row == 1));
        assert!(all.iter().all(Seat::is_available));
    }

    #[sqlx::test(migrations = "./src/migrations")]
    #[ignore = "needs a Postgres server at DATABASE_URL"]
    async fn try_book_conflict_changes_nothing(pool: PgPool) {
        let store = store(pool);
        store.seed_if_empty().await.unwrap();
        assert!(store.mark_booked(3).await.unwrap());
        assert!(store.mark_booked(3).await.unwrap());
        assert!(!store.mark_booked(81).await.unwrap());

        assert_eq!(store.try_book(&[1, 2, 3]).await.unwrap(), BookOutcome::Conflict);
        let available = store.list_available().await.unwrap();
        assert_eq!(available.len(), 79);
        assert_eq!(available[0].seat_number, 1);

        assert_eq!(store.try_book(&[1, 2]).await.unwrap(), BookOutcome::Booked);
        assert_eq!(store.list_available().await.unwrap().len(), 77);
    }

    #[sqlx::test(migrations = "./src/migrations")]
    #[ignore = "needs a Postgres server at DATABASE_URL"]
    async fn available_seats_are_row_ordered_and_reset_frees_all(pool: PgPool) {
        let store = store(pool);
        store.seed_if_empty().await.unwrap();
        for n in [1, 2, 40, 80] {
            store.mark_booked(n).await.unwrap();
        }

        let keys: Vec<(i32, i32)> = store
            .list_available()
            .await
            .unwrap()
            .iter()
            .map(|s| (s.row, s.seat_number))
            .collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        assert_eq!(keys.len(), 76);

        assert_eq!(store.reset_all().await.unwrap(), 80);
        assert_eq!(store.list_available().await.unwrap().len(), 80);
    }

    #[sqlx::test(migrations = "./src/migrations")]
    #[ignore = "needs a Postgres server at DATABASE_URL"]
    async fn concurrent_reservations_never_share_a_seat(pool: PgPool) {
        let service = ReservationService::new(Arc::new(store(pool)), CacheService::disabled(), 50);
        service.seed().await.unwrap();

        let handles: Vec<_> = (0..20)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move { service.reserve(4).await })
            })
            .collect();

        let mut booked = HashSet::new();
        let mut total = 0;
        for handle in handles {
            let numbers = handle.await.unwrap().unwrap();
            total += numbers.len();
            booked.extend(numbers);
        }

        assert_eq!(total, 80);
        assert_eq!(booked.len(), 80);
        assert!(service.store().list_available().await.unwrap().is_empty());
    }
}
