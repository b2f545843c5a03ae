use axum::http::StatusCode;
use maud::{DOCTYPE, Markup, html};

use crate::{
    forms,
    models::{EditForm, Movie, MovieCandidate, RATING_MAX, REVIEW_MAX_LEN},
};

const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";

const INPUT: &str = "mt-2 w-full rounded-md border border-gray-300 px-3 py-2 \
                     focus:border-blue-500 focus:outline-none focus:ring-1 focus:ring-blue-500";
const BUTTON: &str =
    "rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700";

pub fn index_page(movies: &[Movie], flash: Option<&str>) -> String {
    page(
        "My Top Movies",
        html! {
            div class="max-w-4xl mx-auto px-6 py-12" {
                div class="flex items-start justify-between gap-6" {
                    div {
                        h1 class="text-3xl font-bold text-gray-900" { "My Top Movies" }
                        p class="mt-2 text-gray-600" { "Ranked by your own ratings." }
                    }
                    a class=(BUTTON) href="/add" { "Add movie" }
                }

                @if let Some(message) = flash {
                    div class="mt-6 rounded-md border border-amber-300 bg-amber-50 px-4 py-3 text-amber-900" {
                        (message)
                    }
                }

                @if movies.is_empty() {
                    div class="mt-10 bg-white shadow rounded-lg p-8" {
                        p class="text-gray-600" { "No movies yet. Search for one to get started." }
                    }
                } @else {
                    div class="mt-10 space-y-4" {
                        @for movie in movies {
                            (movie_card(movie))
                        }
                    }
                }
            }
        },
    )
}

pub fn add_page(query: &str, error: Option<&str>) -> String {
    page(
        "Add Movie",
        html! {
            div class="max-w-2xl mx-auto px-6 py-12" {
                div class="bg-white shadow rounded-lg p-8" {
                    h1 class="text-3xl font-bold text-gray-900" { "Add a movie" }
                    p class="mt-2 text-gray-600" { "Search The Movie Database by title." }
                    (error_note(error))

                    form class="mt-8 space-y-6" method="post" action="/add" {
                        div {
                            label class="block text-sm font-medium text-gray-700" for="title" { "Movie title" }
                            input class=(INPUT) name="title" id="title" value=(query) required;
                        }
                        button class=(format!("w-full {BUTTON}")) type="submit" { "Search" }
                    }
                    a class="mt-6 inline-block text-blue-600 hover:text-blue-800" href="/" { "Back" }
                }
            }
        },
    )
}

pub fn select_page(query: &str, candidates: &[MovieCandidate]) -> String {
    page(
        "Select Movie",
        html! {
            div class="max-w-3xl mx-auto px-6 py-12" {
                div class="flex items-start justify-between gap-6" {
                    div {
                        h1 class="text-3xl font-bold text-gray-900" { "Select a movie" }
                        p class="mt-2 text-gray-600" { "Results for \u{201c}" (query) "\u{201d}" }
                    }
                    a class="text-sm text-blue-600 hover:text-blue-800" href="/add" { "New search" }
                }

                @if candidates.is_empty() {
                    div class="mt-10 bg-white shadow rounded-lg p-8" {
                        p class="text-gray-600" { "No movies matched that title." }
                    }
                } @else {
                    ul class="mt-10 bg-white shadow rounded-lg divide-y divide-gray-100" {
                        @for candidate in candidates {
                            li class="flex items-center justify-between gap-4 px-6 py-4" {
                                span class="text-gray-900" {
                                    (candidate.original_title)
                                    @if let Some(date) = candidate.release_date.as_deref().filter(|d| !d.is_empty()) {
                                        span class="ml-2 text-gray-500" { "(" (date) ")" }
                                    }
                                }
                                form method="post" action="/select" {
                                    input type="hidden" name="candidate"
                                        value=(forms::candidate_payload(candidate));
                                    button class="text-sm font-semibold text-blue-600 hover:text-blue-800" type="submit" { "Add" }
                                }
                            }
                        }
                    }
                }
            }
        },
    )
}

pub fn edit_page(movie: &Movie, form: Option<&EditForm>, error: Option<&str>) -> String {
    let rating = form.map(|f| f.rating.clone()).unwrap_or_else(|| movie.rating.to_string());
    let review = form.map(|f| f.review.clone()).unwrap_or_else(|| movie.review.clone());

    page(
        "Edit Movie",
        html! {
            div class="max-w-2xl mx-auto px-6 py-12" {
                div class="bg-white shadow rounded-lg p-8" {
                    h1 class="text-3xl font-bold text-gray-900" { (movie.title) }
                    p class="mt-2 text-gray-600" { (movie.year) }
                    (error_note(error))

                    form class="mt-8 space-y-6" method="post" action=(format!("/movies/{}/edit", movie.id)) {
                        div {
                            label class="block text-sm font-medium text-gray-700" for="rating" {
                                "Your rating out of " (RATING_MAX) ", e.g. 7.5"
                            }
                            input class=(INPUT) name="rating" id="rating" value=(rating) required;
                        }
                        div {
                            label class="block text-sm font-medium text-gray-700" for="review" { "Your review" }
                            input class=(INPUT) name="review" id="review" value=(review)
                                maxlength=(REVIEW_MAX_LEN) required;
                        }
                        button class=(format!("w-full {BUTTON}")) type="submit" { "Done" }
                    }
                    a class="mt-6 inline-block text-blue-600 hover:text-blue-800" href="/" { "Back" }
                }
            }
        },
    )
}

pub fn error_page(status: StatusCode, message: String) -> String {
    page(
        "Error",
        html! {
            div class="min-h-screen bg-gray-50 flex items-center justify-center" {
                div class="max-w-xl w-full px-6" {
                    div class="bg-white shadow rounded-lg p-8" {
                        h1 class="text-2xl font-bold text-gray-900" {
                            (status.canonical_reason().unwrap_or("Error"))
                        }
                        p class="mt-4 text-gray-700" { (message) }
                        a class="mt-6 inline-block text-blue-600 hover:text-blue-800" href="/" { "Back" }
                    }
                }
            }
        },
    )
}

fn page(title: &str, body: Markup) -> String {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                script src=(TAILWIND_CDN) {}
            }
            body class="min-h-screen bg-gray-50" { (body) }
        }
    }
    .into_string()
}

fn error_note(error: Option<&str>) -> Markup {
    html! {
        @if let Some(message) = error {
            p class="mt-4 rounded-md bg-red-50 px-4 py-3 text-sm text-red-800" role="alert" { (message) }
        }
    }
}

fn movie_card(movie: &Movie) -> Markup {
    html! {
        div class="bg-white shadow rounded-lg p-6 flex gap-6" {
            img class="w-24 rounded-md object-cover" src=(movie.image_url) alt=(movie.title);
            div class="flex-1" {
                div class="flex items-start justify-between gap-4" {
                    h2 class="text-xl font-semibold text-gray-900" {
                        span class="mr-2 text-gray-400" { "#" (movie.ranking) }
                        (movie.title)
                        span class="ml-2 font-normal text-gray-500" { "(" (movie.year) ")" }
                    }
                    span class="text-lg font-semibold text-amber-600" { (format!("{:.1}", movie.rating)) }
                }
                p class="mt-2 text-sm text-gray-700" { (movie.description) }
                p class="mt-2 text-sm italic text-gray-600" { "\u{201c}" (movie.review) "\u{201d}" }

                div class="mt-4 flex gap-4" {
                    a class="text-sm text-blue-600 hover:text-blue-800" href=(format!("/movies/{}/edit", movie.id)) { "Update" }
                    form method="post" action=(format!("/movies/{}/delete", movie.id)) {
                        button class="text-sm text-red-600 hover:text-red-800" type="submit" { "Delete" }
                    }
                }
            }
        }
    }
}
