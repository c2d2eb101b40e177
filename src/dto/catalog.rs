use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::catalog::{Movie, TicketPrices};

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct MovieDto {
    pub id: String,
    pub title: String,
    pub genre: String,
    pub duration: String,
    pub poster: String,
}

impl From<&Movie> for MovieDto {
    fn from(movie: &Movie) -> Self {
        Self {
            id: movie.id.to_string(),
            title: movie.title.to_string(),
            genre: movie.genre.to_string(),
            duration: movie.duration.to_string(),
            poster: movie.poster.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MovieList {
    pub items: Vec<MovieDto>,
    pub prices: TicketPrices,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ShowtimeDto {
    pub time: String,
    pub enabled: bool,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ShowtimeList {
    pub date: NaiveDate,
    pub items: Vec<ShowtimeDto>,
}
