use std::collections::HashMap;

use tracing::debug;

use crate::{catalog::Catalog, error::AppResult, models::Movie};

/// Ranks movies by descending rating, 1 = best.
///
/// The sort is stable, so equal ratings keep the order of `movies`.
pub fn assign_rankings(movies: &[Movie]) -> Vec<(i32, i32)> {
    let mut order: Vec<&Movie> = movies.iter().collect();
    order.sort_by(|a, b| b.rating.total_cmp(&a.rating));
    order.iter().zip(1..).map(|(movie, ranking)| (movie.id, ranking)).collect()
}

/// The rankings `movies` should have, or `None` when every one is already right.
pub fn pending_rankings(movies: &[Movie]) -> Option<Vec<(i32, i32)>> {
    let rankings = assign_rankings(movies);
    let current: HashMap<i32, i32> = movies.iter().map(|m| (m.id, m.ranking)).collect();
    if rankings.iter().all(|(id, ranking)| current.get(id) == Some(ranking)) {
        return None;
    }
    Some(rankings)
}

/// Rewrites every ranking from the current ratings.
pub async fn recompute(catalog: &Catalog) -> AppResult<()> {
    let movies = catalog.list_in_insertion_order().await?;
    let Some(rankings) = pending_rankings(&movies) else {
        debug!(movies = movies.len(), "rankings already up to date");
        return Ok(());
    };

    catalog.replace_all_rankings(&rankings).await?;
    debug!(movies = movies.len(), "rankings recomputed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::tests::{draft, memory_catalog},
        models::MovieUpdate,
    };

    fn movie(id: i32, rating: f64) -> Movie {
        Movie {
            id,
            title: format!("movie {id}"),
            year: 2000,
            description: String::new(),
            rating,
            ranking: 0,
            review: String::new(),
            image_url: String::new(),
        }
    }

    async fn rankings_by_title(catalog: &Catalog) -> Vec<(String, i32)> {
        catalog.list_all().await.unwrap().into_iter().map(|m| (m.title, m.ranking)).collect()
    }

    async fn assert_dense(catalog: &Catalog) {
        let mut rankings: Vec<i32> =
            catalog.list_all().await.unwrap().into_iter().map(|m| m.ranking).collect();
        rankings.sort_unstable();
        let expected: Vec<i32> = (1..=rankings.len() as i32).collect();
        assert_eq!(rankings, expected);
    }

    #[test]
    fn higher_rating_ranks_first() {
        let movies = [movie(1, 6.0), movie(2, 9.1), movie(3, 7.5)];

        assert_eq!(assign_rankings(&movies), [(2, 1), (3, 2), (1, 3)]);
    }

    #[test]
    fn ties_keep_input_order() {
        let movies = [movie(4, 5.0), movie(2, 8.0), movie(7, 5.0), movie(1, 5.0)];

        assert_eq!(assign_rankings(&movies), [(2, 1), (4, 2), (7, 3), (1, 4)]);
    }

    #[test]
    fn correct_rankings_need_no_write() {
        let mut movies = [movie(1, 9.0), movie(2, 3.0)];
        movies[0].ranking = 1;
        movies[1].ranking = 2;

        assert_eq!(pending_rankings(&movies), None);

        movies[1].rating = 9.5;
        assert_eq!(pending_rankings(&movies), Some(vec![(2, 1), (1, 2)]));
    }

    #[test]
    fn empty_catalog_has_no_rankings() {
        assert!(assign_rankings(&[]).is_empty());
    }

    #[tokio::test]
    async fn ties_on_insert_follow_insertion_order() {
        let catalog = memory_catalog().await;

        catalog.insert(draft("A", 0)).await.unwrap();
        recompute(&catalog).await.unwrap();
        assert_eq!(rankings_by_title(&catalog).await, [("A".to_string(), 1)]);

        catalog.insert(draft("B", 0)).await.unwrap();
        recompute(&catalog).await.unwrap();
        assert_eq!(
            rankings_by_title(&catalog).await,
            [("A".to_string(), 1), ("B".to_string(), 2)]
        );
    }

    #[tokio::test]
    async fn rating_change_reorders_after_recompute() {
        let catalog = memory_catalog().await;
        catalog.insert(draft("A", 0)).await.unwrap();
        recompute(&catalog).await.unwrap();
        let b = catalog.insert(draft("B", 0)).await.unwrap();
        recompute(&catalog).await.unwrap();

        catalog.update(b.id, MovieUpdate { rating: Some(9.5), review: None }).await.unwrap();
        recompute(&catalog).await.unwrap();

        assert_eq!(
            rankings_by_title(&catalog).await,
            [("B".to_string(), 1), ("A".to_string(), 2)]
        );
    }

    #[tokio::test]
    async fn rankings_stay_dense_across_inserts_and_deletes() {
        let catalog = memory_catalog().await;
        let mut ids = Vec::new();

        for (i, rating) in [3.0, 8.0, 5.5, 8.0, 1.0].into_iter().enumerate() {
            let movie = catalog.insert(draft(&format!("movie {i}"), 0)).await.unwrap();
            catalog
                .update(movie.id, MovieUpdate { rating: Some(rating), review: None })
                .await
                .unwrap();
            recompute(&catalog).await.unwrap();
            assert_dense(&catalog).await;
            ids.push(movie.id);
        }

        for id in [ids[1], ids[4], ids[0]] {
            catalog.delete(id).await.unwrap();
            recompute(&catalog).await.unwrap();
            assert_dense(&catalog).await;
        }

        assert_eq!(catalog.count().await.unwrap(), 2);
    }
}
