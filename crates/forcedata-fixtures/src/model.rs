//! Fixture record types.
//!
//! Every field is nullable: a fixture that does not set a field serializes it
//! as `null`, which is what the consuming test suites expect.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Base {
    pub id: Option<String>,
    pub is_active: Option<bool>,
    pub age: Option<i64>,
    pub name: Option<String>,
    pub gender: Option<String>,
    /// Untyped in the consuming schema.
    pub eye_color: Value,
    pub hair_style: Option<HairStyle>,
    pub salery: Option<i64>,
    pub friends: Option<Vec<Friends>>,
    pub groups: Option<Vec<Option<i64>>>,
    pub rooms: Option<Vec<Option<String>>>,
    pub device: Option<Device>,
    pub qualifications: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HairStyle {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Friends {
    pub id: Option<i64>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub android: Option<Android>,
    pub ios: Option<Ios>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Android {
    pub manufacturer: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ios {
    pub manufacturer: Option<String>,
    pub model: Option<String>,
}

/// Any fixture the catalog can produce. Serializes as the bare record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Fixture {
    Base(Base),
    HairStyle(HairStyle),
    Friends(Friends),
    Device(Device),
    Android(Android),
    Ios(Ios),
}

impl Fixture {
    pub fn kind(&self) -> &'static str {
        match self {
            Fixture::Base(_) => "Base",
            Fixture::HairStyle(_) => "HairStyle",
            Fixture::Friends(_) => "Friends",
            Fixture::Device(_) => "Device",
            Fixture::Android(_) => "Android",
            Fixture::Ios(_) => "Ios",
        }
    }
}

macro_rules! fixture_variants {
    ($($ty:ident),* $(,)?) => {
        $(
            impl From<$ty> for Fixture {
                fn from(value: $ty) -> Self {
                    Fixture::$ty(value)
                }
            }

            impl TryFrom<Fixture> for $ty {
                type Error = Fixture;

                fn try_from(fixture: Fixture) -> Result<Self, Fixture> {
                    match fixture {
                        Fixture::$ty(value) => Ok(value),
                        other => Err(other),
                    }
                }
            }
        )*
    };
}

fixture_variants!(Base, HairStyle, Friends, Device, Android, Ios);
