use serde::Deserialize;

use crate::errors::BackendError;
use crate::filter::{Bounds, Criteria, Order, Page};
use crate::player::{Profession, Race};

/// The query string accepted by the listing and count routes. The
/// count route ignores the paging and ordering keys.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerQuery {
    pub name: Option<String>,
    pub title: Option<String>,
    pub race: Option<Race>,
    pub profession: Option<Profession>,

    /// Epoch milliseconds.
    pub after: Option<i64>,

    /// Epoch milliseconds.
    pub before: Option<i64>,

    pub banned: Option<bool>,
    pub min_experience: Option<i32>,
    pub max_experience: Option<i32>,
    pub min_level: Option<i32>,
    pub max_level: Option<i32>,
    pub page_number: Option<i32>,
    pub page_size: Option<i32>,
    pub order: Option<Order>,
}

impl PlayerQuery {
    pub fn criteria(&self) -> Criteria {
        Criteria {
            name: self.name.clone(),
            title: self.title.clone(),
            race: self.race,
            profession: self.profession,
            banned: self.banned,
            level: Bounds::new(self.min_level, self.max_level),
            experience: Bounds::new(self.min_experience, self.max_experience),
            birthday: Bounds::new(self.after, self.before),
        }
    }

    pub fn page(&self, default_size: i32) -> Result<Page, BackendError> {
        Page::new(
            self.page_number.unwrap_or(0),
            self.page_size.unwrap_or(default_size),
        )
    }

    pub fn order(&self) -> Order {
        self.order.unwrap_or_default()
    }
}
