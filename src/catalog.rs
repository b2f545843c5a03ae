use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait, sea_query::Expr,
};
use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

use crate::{
    entities::movie,
    error::{AppError, AppResult},
    models::{Movie, MovieDraft, MovieUpdate},
    ranking,
};

/// The SQLite-backed movie catalog.
#[derive(Clone)]
pub struct Catalog {
    db: DatabaseConnection,
    writes: Arc<Mutex<()>>,
}

impl Catalog {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db, writes: Arc::new(Mutex::new(())) }
    }

    /// Serializes mutations so two requests never re-rank the catalog at once.
    pub async fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.writes.lock().await
    }

    pub async fn list_all(&self) -> AppResult<Vec<Movie>> {
        let rows = movie::Entity::find()
            .order_by_asc(movie::Column::Ranking)
            .order_by_asc(movie::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Movie::from).collect())
    }

    pub async fn list_in_insertion_order(&self) -> AppResult<Vec<Movie>> {
        let rows = movie::Entity::find().order_by_asc(movie::Column::Id).all(&self.db).await?;
        Ok(rows.into_iter().map(Movie::from).collect())
    }

    pub async fn count(&self) -> AppResult<u64> {
        Ok(movie::Entity::find().count(&self.db).await?)
    }

    pub async fn get(&self, id: i32) -> AppResult<Movie> {
        find_row(&self.db, id).await
    }

    pub async fn insert(&self, draft: MovieDraft) -> AppResult<Movie> {
        insert_row(&self.db, draft).await
    }

    /// Inserts `draft` and re-ranks the catalog in one transaction.
    ///
    /// The returned movie carries its final ranking.
    pub async fn insert_ranked(&self, draft: MovieDraft) -> AppResult<Movie> {
        let txn = self.db.begin().await?;
        let result = async {
            let stored = insert_row(&txn, draft).await?;
            rerank(&txn).await?;
            find_row(&txn, stored.id).await
        }
        .await;
        finish(txn, result).await
    }

    pub async fn update(&self, id: i32, update: MovieUpdate) -> AppResult<Movie> {
        update_row(&self.db, id, update).await
    }

    /// Applies `update` and re-ranks the catalog in one transaction.
    pub async fn update_ranked(&self, id: i32, update: MovieUpdate) -> AppResult<Movie> {
        let txn = self.db.begin().await?;
        let result = async {
            update_row(&txn, id, update).await?;
            rerank(&txn).await?;
            find_row(&txn, id).await
        }
        .await;
        finish(txn, result).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        delete_row(&self.db, id).await
    }

    /// Deletes one movie and closes the gap it leaves, in one transaction.
    pub async fn delete_ranked(&self, id: i32) -> AppResult<()> {
        let txn = self.db.begin().await?;
        let result = async {
            delete_row(&txn, id).await?;
            rerank(&txn).await
        }
        .await;
        finish(txn, result).await
    }

    /// Writes every `(id, ranking)` pair in one transaction.
    ///
    /// SQLite checks the unique index on `ranking` row by row, so swapping two
    /// rankings in place would fail halfway. Rows are first parked on `-id`,
    /// which can never clash with a real ranking or with each other, and then
    /// moved to their final value.
    pub async fn replace_all_rankings(&self, rankings: &[(i32, i32)]) -> AppResult<()> {
        if rankings.is_empty() {
            return Ok(());
        }

        let txn = self.db.begin().await?;
        let result = write_rankings(&txn, rankings).await;
        finish(txn, result).await?;

        debug!(updated = rankings.len(), "replaced rankings");
        Ok(())
    }
}

/// Commits on success, rolls back and hands the error on otherwise.
async fn finish<T>(txn: DatabaseTransaction, result: AppResult<T>) -> AppResult<T> {
    match result {
        Ok(value) => {
            txn.commit().await?;
            Ok(value)
        },
        Err(err) => {
            txn.rollback().await?;
            Err(err)
        },
    }
}

async fn find_row<C: ConnectionTrait>(conn: &C, id: i32) -> AppResult<Movie> {
    movie::Entity::find_by_id(id).one(conn).await?.map(Movie::from).ok_or(AppError::NotFound(id))
}

async fn insert_row<C: ConnectionTrait>(conn: &C, draft: MovieDraft) -> AppResult<Movie> {
    let taken = movie::Entity::find()
        .filter(movie::Column::Title.eq(draft.title.as_str()))
        .count(conn)
        .await?;
    if taken > 0 {
        return Err(AppError::Conflict(format!("{} is already in your list.", draft.title)));
    }

    let title = draft.title.clone();
    let ranking = draft.ranking;
    let model = movie::ActiveModel {
        id: Default::default(),
        title: Set(draft.title),
        year: Set(draft.year),
        description: Set(draft.description),
        rating: Set(draft.rating),
        ranking: Set(draft.ranking),
        review: Set(draft.review),
        image_url: Set(draft.image_url),
    };

    let stored = model.insert(conn).await.map_err(|err| {
        AppError::from_write(err, || {
            format!("{title} could not be added: ranking {ranking} is already taken.")
        })
    })?;

    debug!(id = stored.id, title = %stored.title, "inserted movie");
    Ok(stored.into())
}

async fn update_row<C: ConnectionTrait>(
    conn: &C,
    id: i32,
    update: MovieUpdate,
) -> AppResult<Movie> {
    let existing = movie::Entity::find_by_id(id).one(conn).await?.ok_or(AppError::NotFound(id))?;
    if update.is_empty() {
        return Ok(existing.into());
    }

    let mut active: movie::ActiveModel = existing.into();
    if let Some(rating) = update.rating {
        active.rating = Set(rating);
    }
    if let Some(review) = update.review {
        active.review = Set(review);
    }

    let stored = active.update(conn).await.map_err(|err| {
        AppError::from_write(err, || format!("movie {id} conflicts with another entry."))
    })?;

    debug!(id, rating = stored.rating, "updated movie");
    Ok(stored.into())
}

async fn delete_row<C: ConnectionTrait>(conn: &C, id: i32) -> AppResult<()> {
    let res = movie::Entity::delete_by_id(id).exec(conn).await?;
    if res.rows_affected == 0 {
        return Err(AppError::NotFound(id));
    }
    debug!(id, "deleted movie");
    Ok(())
}

async fn rerank<C: ConnectionTrait>(conn: &C) -> AppResult<()> {
    let rows = movie::Entity::find().order_by_asc(movie::Column::Id).all(conn).await?;
    let movies: Vec<Movie> = rows.into_iter().map(Movie::from).collect();
    if let Some(rankings) = ranking::pending_rankings(&movies) {
        write_rankings(conn, &rankings).await?;
        debug!(movies = movies.len(), "rankings recomputed");
    }
    Ok(())
}

async fn write_rankings<C: ConnectionTrait>(conn: &C, rankings: &[(i32, i32)]) -> AppResult<()> {
    for &(id, _) in rankings {
        let res = movie::Entity::update_many()
            .col_expr(movie::Column::Ranking, Expr::value(-id))
            .filter(movie::Column::Id.eq(id))
            .exec(conn)
            .await?;
        if res.rows_affected == 0 {
            return Err(AppError::NotFound(id));
        }
    }

    for &(id, ranking) in rankings {
        movie::Entity::update_many()
            .col_expr(movie::Column::Ranking, Expr::value(ranking))
            .filter(movie::Column::Id.eq(id))
            .exec(conn)
            .await
            .map_err(|err| {
                AppError::from_write(err, || format!("ranking {ranking} is already taken."))
            })?;
    }
    Ok(())
}
