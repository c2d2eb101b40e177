use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::models::ShowingKey;

/// The three-part key of a showing, taken from the query string.
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ShowingQuery {
    pub movie_id: String,
    /// `YYYY-MM-DD`
    pub date: NaiveDate,
    /// 12-hour showtime, e.g. `1:30 PM`
    pub time: String,
}

impl ShowingQuery {
    pub fn into_key(self) -> ShowingKey {
        ShowingKey::new(self.movie_id, self.date, self.time)
    }
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EmailQuery {
    pub email: String,
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ShowtimeQuery {
    /// Defaults to today.
    pub date: Option<NaiveDate>,
}
