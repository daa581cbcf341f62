use async_trait::async_trait;
use diesel_async::{
    pooled_connection::{deadpool::Pool, AsyncDieselConnectionManager},
    AsyncPgConnection,
};
use shared::{EventRecord, Snapshot};

use crate::error::ApiResult;
use crate::repository::EventRepository;

pub type DbPool = Pool<AsyncPgConnection>;

pub fn establish_connection_pool(database_url: &str) -> anyhow::Result<DbPool> {
    let config = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
    let pool = Pool::builder(config).max_size(10).build()?;

    Ok(pool)
}

// Calendar event database operations
pub mod calendar_events {
    use diesel::prelude::*;
    use diesel::upsert::excluded;
    use diesel_async::{AsyncPgConnection, RunQueryDsl};

    use crate::models::{CalendarEventRow, NewCalendarEvent};

    pub async fn list_for_user(
        conn: &mut AsyncPgConnection,
        uid: &str,
    ) -> QueryResult<Vec<CalendarEventRow>> {
        use crate::schema::calendar_events::dsl::*;

        calendar_events
            .filter(user_id.eq(uid))
            .order_by(event_id.asc())
            .select(CalendarEventRow::as_select())
            .load(conn)
            .await
    }

    pub async fn upsert(
        conn: &mut AsyncPgConnection,
        new_event: &NewCalendarEvent<'_>,
    ) -> QueryResult<usize> {
        use crate::schema::calendar_events::dsl::*;

        diesel::insert_into(calendar_events)
            .values(new_event)
            .on_conflict((user_id, event_id))
            .do_update()
            .set((
                event_name.eq(excluded(event_name)),
                event_date.eq(excluded(event_date)),
                event_time.eq(excluded(event_time)),
            ))
            .execute(conn)
            .await
    }

    pub async fn delete(
        conn: &mut AsyncPgConnection,
        uid: &str,
        id: &str,
    ) -> QueryResult<usize> {
        use crate::schema::calendar_events::dsl::*;

        diesel::delete(calendar_events.filter(user_id.eq(uid)).filter(event_id.eq(id)))
            .execute(conn)
            .await
    }
}

/// Repository over the `calendar_events` table.
pub struct PgEventRepository {
    pool: DbPool,
}

impl PgEventRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn snapshot(&self, uid: &str) -> ApiResult<Snapshot> {
        let mut conn = self.pool.get().await?;
        let rows = calendar_events::list_for_user(&mut conn, uid).await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn put(&self, uid: &str, event_id: &str, record: &EventRecord) -> ApiResult<()> {
        let mut conn = self.pool.get().await?;
        let new_event = crate::models::NewCalendarEvent {
            user_id: uid,
            event_id,
            event_name: &record.event_name,
            event_date: &record.event_date,
            event_time: &record.event_time,
        };
        calendar_events::upsert(&mut conn, &new_event).await?;

        Ok(())
    }

    async fn remove(&self, uid: &str, event_id: &str) -> ApiResult<bool> {
        let mut conn = self.pool.get().await?;
        let deleted = calendar_events::delete(&mut conn, uid, event_id).await?;

        Ok(deleted > 0)
    }
}
