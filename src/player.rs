use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;

use crate::errors::BackendError;
use crate::level::{level, until_next_level};
use crate::timestamp;
use crate::validation::Limits;

/// An ID in the database.
pub type Id = i64;

macro_rules! labelled_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            /// The upper-case label used on the wire and in the database.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownLabel;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok($name::$variant),)+
                    _ => Err(UnknownLabel(s.to_owned())),
                }
            }
        }
    };
}

labelled_enum! {
    /// The race of a player.
    Race {
        Human => "HUMAN",
        Dwarf => "DWARF",
        Elf => "ELF",
        Giant => "GIANT",
        Orc => "ORC",
        Troll => "TROLL",
        Hobbit => "HOBBIT",
    }
}

labelled_enum! {
    /// The profession of a player.
    Profession {
        Warrior => "WARRIOR",
        Rogue => "ROGUE",
        Sorcerer => "SORCERER",
        Clerk => "CLERK",
        Knight => "KNIGHT",
        Paladin => "PALADIN",
        Druid => "DRUID",
    }
}

/// A stored label that matches no known variant.
#[derive(Debug, thiserror::Error)]
#[error("unknown label {0:?}")]
pub struct UnknownLabel(pub String);

/// A single player in the database.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: Id,
    pub name: String,
    pub title: String,
    pub race: Race,
    pub profession: Profession,

    /// Derived from `experience`.
    pub level: i32,

    /// Derived from `experience` and `level`.
    pub until_next_level: i32,

    #[serde(with = "timestamp")]
    pub birthday: OffsetDateTime,

    pub banned: bool,
    pub experience: i32,
}

impl Player {
    fn set_experience(&mut self, experience: i32) {
        self.experience = experience;
        self.level = level(experience);
        self.until_next_level = until_next_level(experience, self.level);
    }
}

/// A player as submitted for creation. Everything is optional here so
/// that missing fields surface as validation failures.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlayer {
    pub name: Option<String>,
    pub title: Option<String>,
    pub race: Option<Race>,
    pub profession: Option<Profession>,

    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub birthday: Option<OffsetDateTime>,

    #[serde(default, deserialize_with = "deserialize_banned")]
    pub banned: bool,

    pub experience: Option<i32>,
}

impl NewPlayer {
    /// Checks every mandatory field and computes the derived ones.
    pub fn validate(self, limits: &Limits) -> Result<PlayerDraft, BackendError> {
        limits.check_name(self.name.as_deref())?;
        limits.check_title(self.title.as_deref())?;
        limits.check_experience(self.experience)?;
        limits.check_birthday(self.birthday)?;

        match self {
            NewPlayer {
                name: Some(name),
                title: Some(title),
                race: Some(race),
                profession: Some(profession),
                birthday: Some(birthday),
                banned,
                experience: Some(experience),
            } => {
                let level = level(experience);

                Ok(PlayerDraft {
                    name,
                    title,
                    race,
                    profession,
                    level,
                    until_next_level: until_next_level(experience, level),
                    birthday,
                    banned,
                    experience,
                })
            }
            NewPlayer { race: None, .. } => Err(BackendError::invalid("race")),
            _ => Err(BackendError::invalid("profession")),
        }
    }
}

/// A validated player that has not been stored yet.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerDraft {
    pub name: String,
    pub title: String,
    pub race: Race,
    pub profession: Profession,
    pub level: i32,
    pub until_next_level: i32,
    pub birthday: OffsetDateTime,
    pub banned: bool,
    pub experience: i32,
}

impl PlayerDraft {
    pub fn into_player(self, id: Id) -> Player {
        Player {
            id,
            name: self.name,
            title: self.title,
            race: self.race,
            profession: self.profession,
            level: self.level,
            until_next_level: self.until_next_level,
            birthday: self.birthday,
            banned: self.banned,
            experience: self.experience,
        }
    }
}

/// A partial update. Absent fields are left untouched, except for
/// `banned`, which is always overwritten and defaults to `false` when
/// missing from the payload. Existing clients rely on this.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerUpdate {
    pub name: Option<String>,
    pub title: Option<String>,
    pub race: Option<Race>,
    pub profession: Option<Profession>,

    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub birthday: Option<OffsetDateTime>,

    #[serde(default, deserialize_with = "deserialize_banned")]
    pub banned: bool,

    pub experience: Option<i32>,
}

/// Reads an explicit `null` the same way as a missing `banned`.
fn deserialize_banned<'de, D>(deserializer: D) -> Result<bool, D::Error>
where D: Deserializer<'de> {
    let banned: Option<bool> = Deserialize::deserialize(deserializer)?;

    Ok(banned.unwrap_or(false))
}

impl PlayerUpdate {
    /// Validates each present field and applies it to `player`.
    pub fn apply(self, mut player: Player, limits: &Limits) -> Result<Player, BackendError> {
        if let Some(name) = self.name {
            limits.check_name(Some(&name))?;
            player.name = name;
        }

        if let Some(title) = self.title {
            limits.check_title(Some(&title))?;
            player.title = title;
        }

        if let Some(experience) = self.experience {
            limits.check_experience(Some(experience))?;
            player.set_experience(experience);
        }

        if let Some(birthday) = self.birthday {
            limits.check_birthday(Some(birthday))?;
            player.birthday = birthday;
        }

        if let Some(race) = self.race {
            player.race = race;
        }

        if let Some(profession) = self.profession {
            player.profession = profession;
        }

        player.banned = self.banned;

        Ok(player)
    }
}
