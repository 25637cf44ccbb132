use futures::future::BoxFuture;

use crate::errors::BackendError;
use crate::filter::{Criteria, Order, Page};
use crate::player::{Id, Player, PlayerDraft};

pub mod memory;

/// A change to a stored player, applied while the player is locked.
/// Returning an error abandons the change.
pub type Modification = Box<dyn FnOnce(Player) -> Result<Player, BackendError> + Send>;

pub trait Db {
    /// Returns one page of the players matching `criteria`.
    fn list(
        &self,
        criteria: &Criteria,
        page: Page,
        order: Order,
    ) -> BoxFuture<Result<Vec<Player>, BackendError>>;

    /// Counts the players matching `criteria`.
    fn count(&self, criteria: &Criteria) -> BoxFuture<Result<i64, BackendError>>;

    fn retrieve(&self, id: Id) -> BoxFuture<Result<Option<Player>, BackendError>>;

    /// Stores a new player, assigning its ID.
    fn insert(&self, draft: PlayerDraft) -> BoxFuture<Result<Player, BackendError>>;

    /// Loads, changes, and writes back a player as a single unit.
    /// Returns `None` without calling `modification` if the ID is unknown.
    fn modify(
        &self,
        id: Id,
        modification: Modification,
    ) -> BoxFuture<Result<Option<Player>, BackendError>>;

    /// Deletes a player, returning it as it was.
    fn remove(&self, id: Id) -> BoxFuture<Result<Option<Player>, BackendError>>;
}

pub use self::memory::MemoryDb;
pub use self::postgres::*;

mod postgres {
    use futures::future::BoxFuture;
    use futures::FutureExt;
    use sqlx::{
        self,
        postgres::{PgArguments, PgPool, PgRow, Postgres},
        query::Query,
    };
    use time::OffsetDateTime;

    use super::Modification;
    use crate::errors::BackendError;
    use crate::filter::{Column, Criteria, Order, Page, Predicate, Value};
    use crate::player::{Id, Player, PlayerDraft};

    const COLUMNS: &str =
        "id, name, title, race, profession, level, until_next_level, birthday, banned, experience";

    pub struct PgDb {
        pool: PgPool,
    }

    impl PgDb {
        pub fn new(pool: PgPool) -> Self {
            PgDb { pool }
        }

        /// Creates the `players` table if it doesn't exist yet.
        pub async fn prepare(&self) -> Result<(), BackendError> {
            sqlx::query(include_str!("queries/create_schema.sql"))
                .execute(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

            Ok(())
        }
    }

    // these can be simplified once async functions in traits are stabilized
    impl super::Db for PgDb {
        fn list(
            &self,
            criteria: &Criteria,
            page: Page,
            order: Order,
        ) -> BoxFuture<Result<Vec<Player>, BackendError>> {
            let (clause, values) = where_clause(&criteria.predicates());

            async move {
                let placeholder = values.len();
                let sql = format!(
                    "SELECT {} FROM players{} ORDER BY {} ASC, id ASC LIMIT ${} OFFSET ${}",
                    COLUMNS,
                    clause,
                    sort_key(order),
                    placeholder + 1,
                    placeholder + 2,
                );

                let players = bind_all(sqlx::query(&sql), values)
                    .bind(page.size())
                    .bind(page.offset())
                    .try_map(read_player)
                    .fetch_all(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(players)
            }
            .boxed()
        }

        fn count(&self, criteria: &Criteria) -> BoxFuture<Result<i64, BackendError>> {
            let (clause, values) = where_clause(&criteria.predicates());

            async move {
                let sql = format!("SELECT COUNT(*) AS count FROM players{}", clause);

                let count = bind_all(sqlx::query(&sql), values)
                    .try_map(|row: PgRow| try_get::<i64>(&row, "count"))
                    .fetch_one(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(count)
            }
            .boxed()
        }

        fn retrieve(&self, id: Id) -> BoxFuture<Result<Option<Player>, BackendError>> {
            async move {
                let player = sqlx::query(include_str!("queries/retrieve.sql"))
                    .bind(id)
                    .try_map(read_player)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(player)
            }
            .boxed()
        }

        fn insert(&self, draft: PlayerDraft) -> BoxFuture<Result<Player, BackendError>> {
            async move {
                let mut transaction = self.pool.begin().await.map_err(map_sqlx_error)?;

                let player = sqlx::query(include_str!("queries/create.sql"))
                    .bind(draft.name)
                    .bind(draft.title)
                    .bind(draft.race.as_str())
                    .bind(draft.profession.as_str())
                    .bind(draft.level)
                    .bind(draft.until_next_level)
                    .bind(draft.birthday)
                    .bind(draft.banned)
                    .bind(draft.experience)
                    .try_map(read_player)
                    .fetch_one(&mut transaction)
                    .await
                    .map_err(map_sqlx_error)?;

                transaction.commit().await.map_err(map_sqlx_error)?;

                Ok(player)
            }
            .boxed()
        }

        fn modify(
            &self,
            id: Id,
            modification: Modification,
        ) -> BoxFuture<Result<Option<Player>, BackendError>> {
            async move {
                // dropping the transaction without committing rolls it back
                let mut transaction = self.pool.begin().await.map_err(map_sqlx_error)?;

                let current = sqlx::query(include_str!("queries/retrieve_for_update.sql"))
                    .bind(id)
                    .try_map(read_player)
                    .fetch_optional(&mut transaction)
                    .await
                    .map_err(map_sqlx_error)?;

                let current = match current {
                    Some(player) => player,
                    None => return Ok(None),
                };

                let changed = modification(current)?;

                let player = sqlx::query(include_str!("queries/update.sql"))
                    .bind(id)
                    .bind(changed.name)
                    .bind(changed.title)
                    .bind(changed.race.as_str())
                    .bind(changed.profession.as_str())
                    .bind(changed.level)
                    .bind(changed.until_next_level)
                    .bind(changed.birthday)
                    .bind(changed.banned)
                    .bind(changed.experience)
                    .try_map(read_player)
                    .fetch_one(&mut transaction)
                    .await
                    .map_err(map_sqlx_error)?;

                transaction.commit().await.map_err(map_sqlx_error)?;

                Ok(Some(player))
            }
            .boxed()
        }

        fn remove(&self, id: Id) -> BoxFuture<Result<Option<Player>, BackendError>> {
            async move {
                let mut transaction = self.pool.begin().await.map_err(map_sqlx_error)?;

                let player = sqlx::query(include_str!("queries/delete.sql"))
                    .bind(id)
                    .try_map(read_player)
                    .fetch_optional(&mut transaction)
                    .await
                    .map_err(map_sqlx_error)?;

                transaction.commit().await.map_err(map_sqlx_error)?;

                Ok(player)
            }
            .boxed()
        }
    }

    /// Renders predicates as a `WHERE` clause (with a leading space)
    /// using numbered placeholders, plus the values to bind in order.
    pub(crate) fn where_clause(predicates: &[Predicate]) -> (String, Vec<Value>) {
        let mut conditions = Vec::with_capacity(predicates.len());
        let mut values = Vec::new();

        let mut push = |value: Value| {
            values.push(value);
            format!("${}", values.len())
        };

        for predicate in predicates {
            let condition = match predicate.clone() {
                Predicate::Contains(column, needle) => {
                    format!("strpos({}, {}) > 0", column.name(), push(Value::Text(needle)))
                }
                Predicate::Equals(column, value) => format!("{} = {}", column.name(), push(value)),
                Predicate::AtLeast(column, min) => format!("{} >= {}", column.name(), push(min)),
                Predicate::AtMost(column, max) => format!("{} <= {}", column.name(), push(max)),
                Predicate::Between(column, min, max) => {
                    let min = push(min);
                    let max = push(max);

                    format!("{} BETWEEN {} AND {}", column.name(), min, max)
                }
            };

            conditions.push(condition);
        }

        if conditions.is_empty() {
            (String::new(), values)
        } else {
            (format!(" WHERE {}", conditions.join(" AND ")), values)
        }
    }

    /// The `ORDER BY` expression for `order`. Text sorts by code point,
    /// matching comparisons of Rust strings.
    pub(crate) fn sort_key(order: Order) -> String {
        match order.column() {
            column @ Column::Name | column @ Column::Title => {
                format!("{} COLLATE \"C\"", column.name())
            }
            column => column.name().to_owned(),
        }
    }

    fn bind_all<'q>(
        query: Query<'q, Postgres, PgArguments>,
        values: Vec<Value>,
    ) -> Query<'q, Postgres, PgArguments> {
        values.into_iter().fold(query, |query, value| match value {
            Value::Text(v) => query.bind(v),
            Value::Int(v) => query.bind(v),
            Value::BigInt(v) => query.bind(v),
            Value::Bool(v) => query.bind(v),
            Value::Time(v) => query.bind(v),
        })
    }

    fn read_player(row: PgRow) -> Result<Player, sqlx::Error> {
        let race: String = try_get(&row, "race")?;
        let profession: String = try_get(&row, "profession")?;
        let birthday: OffsetDateTime = try_get(&row, "birthday")?;

        Ok(Player {
            id: try_get(&row, "id")?,
            name: try_get(&row, "name")?,
            title: try_get(&row, "title")?,
            // labels are only ever written from the enums, but just for
            // completeness...
            race: race
                .parse()
                .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
            profession: profession
                .parse()
                .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
            level: try_get(&row, "level")?,
            until_next_level: try_get(&row, "until_next_level")?,
            birthday: birthday.to_offset(time::UtcOffset::UTC),
            banned: try_get(&row, "banned")?,
            experience: try_get(&row, "experience")?,
        })
    }

    fn try_get<'a, T: sqlx::Type<sqlx::Postgres> + sqlx::decode::Decode<'a, sqlx::Postgres>>(
        row: &'a PgRow,
        column: &str,
    ) -> Result<T, sqlx::Error> {
        use sqlx::prelude::*;

        row.try_get(column)
    }

    fn map_sqlx_error(error: sqlx::Error) -> BackendError {
        BackendError::Sqlx { source: error }
    }

}
