use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Movie {
    pub id: u32,
    pub title: String,
    pub year: u16,
    pub genre: String,
    pub director: String,
}

/// Read-only movie listing, seeded once at startup.
#[derive(Debug, Clone)]
pub struct MovieCatalog {
    movies: Arc<[Movie]>,
}

impl MovieCatalog {
    pub fn new(movies: Vec<Movie>) -> Self {
        Self {
            movies: movies.into(),
        }
    }

    pub fn seeded() -> Self {
        Self::new(vec![
            Movie {
                id: 1,
                title: "The Shawshank Redemption".to_string(),
                year: 1994,
                genre: "Drama".to_string(),
                director: "Frank Darabont".to_string(),
            },
            Movie {
                id: 2,
                title: "The Godfather".to_string(),
                year: 1972,
                genre: "Crime".to_string(),
                director: "Francis Ford Coppola".to_string(),
            },
        ])
    }

    pub fn all(&self) -> &[Movie] {
        &self.movies
    }

    pub fn count(&self) -> usize {
        self.movies.len()
    }
}
