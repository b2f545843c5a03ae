use crate::{
    error::{AppError, AppResult},
    models::{
        EditForm, MovieCandidate, MovieUpdate, RATING_MAX, REVIEW_MAX_LEN, SearchForm, SelectForm,
    },
};

pub fn validate_search(form: &SearchForm) -> AppResult<String> {
    let title = form.title.trim();
    if title.is_empty() {
        return Err(AppError::validation("movie title is required"));
    }
    Ok(title.to_string())
}

/// Encodes a search result for the hidden field of the selection form.
pub fn candidate_payload(candidate: &MovieCandidate) -> String {
    // Plain strings and integers with derived impls always serialize.
    serde_json::to_string(candidate).expect("MovieCandidate serializes to JSON")
}

/// Decodes the search result the user picked.
pub fn parse_candidate(form: &SelectForm) -> AppResult<MovieCandidate> {
    serde_json::from_str(&form.candidate)
        .map_err(|err| AppError::validation(format!("invalid movie selection: {err}")))
}

pub fn validate_edit(form: &EditForm) -> AppResult<MovieUpdate> {
    let rating = form.rating.trim();
    if rating.is_empty() {
        return Err(AppError::validation("rating is required"));
    }
    let rating: f64 = rating
        .parse()
        .map_err(|_| AppError::validation(format!("rating must be a number, got {rating:?}")))?;
    if !rating.is_finite() || !(0.0..=RATING_MAX).contains(&rating) {
        return Err(AppError::validation(format!("rating must be between 0 and {RATING_MAX}")));
    }

    let review = form.review.trim();
    if review.is_empty() {
        return Err(AppError::validation("review is required"));
    }
    if review.chars().count() > REVIEW_MAX_LEN {
        return Err(AppError::validation(format!(
            "reviews are limited to {REVIEW_MAX_LEN} characters"
        )));
    }

    Ok(MovieUpdate { rating: Some(rating), review: Some(review.to_string()) })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit(rating: &str, review: &str) -> EditForm {
        EditForm { rating: rating.to_string(), review: review.to_string() }
    }

    #[test]
    fn search_title_is_trimmed() {
        let form = SearchForm { title: "  Heat ".to_string() };

        assert_eq!(validate_search(&form).unwrap(), "Heat");
    }

    #[test]
    fn blank_search_is_rejected() {
        let form = SearchForm { title: "   ".to_string() };

        assert!(matches!(validate_search(&form), Err(AppError::Validation(_))));
    }

    #[test]
    fn edit_accepts_rating_and_review() {
        let update = validate_edit(&edit(" 7.5 ", " Slow burn. ")).unwrap();

        assert_eq!(update.rating, Some(7.5));
        assert_eq!(update.review.as_deref(), Some("Slow burn."));
    }

    #[test]
    fn edit_rejects_bad_ratings() {
        for rating in ["", "seven", "-1", "10.5", "NaN", "inf"] {
            assert!(
                matches!(validate_edit(&edit(rating, "ok")), Err(AppError::Validation(_))),
                "{rating:?} should be rejected"
            );
        }
    }

    #[test]
    fn edit_requires_review() {
        assert!(matches!(validate_edit(&edit("8", "  ")), Err(AppError::Validation(_))));

        let long = "x".repeat(REVIEW_MAX_LEN + 1);
        assert!(matches!(validate_edit(&edit("8", &long)), Err(AppError::Validation(_))));
    }

    #[test]
    fn candidate_payload_round_trips() {
        let candidate = MovieCandidate {
            id: 603,
            original_title: "The Matrix".to_string(),
            release_date: Some("1999-03-30".to_string()),
            overview: None,
            poster_path: Some("/matrix.jpg".to_string()),
        };
        let form = SelectForm { candidate: candidate_payload(&candidate) };

        assert_eq!(parse_candidate(&form).unwrap(), candidate);
    }

    #[test]
    fn garbage_payload_is_rejected() {
        let form = SelectForm { candidate: "{not json".to_string() };

        assert!(matches!(parse_candidate(&form), Err(AppError::Validation(_))));
    }
}
