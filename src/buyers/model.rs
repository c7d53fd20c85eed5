use serde::{Serialize, Serializer};
use uuid::Uuid;

/// A closed set of string values accepted for one buyer field.
pub trait Choice: Sized + Copy + 'static {
    const ALL: &'static [Self];

    fn as_str(&self) -> &'static str;

    fn parse(raw: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == raw)
    }

    fn expected() -> String {
        Self::ALL
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

macro_rules! choice_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $($variant),+
        }

        impl Choice for $name {
            const ALL: &'static [Self] = &[$($name::$variant),+];

            fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
                s.serialize_str(self.as_str())
            }
        }
    };
}

choice_enum!(City {
    Chandigarh => "Chandigarh",
    Mohali => "Mohali",
    Zirakpur => "Zirakpur",
    Panchkula => "Panchkula",
    Other => "Other",
});

choice_enum!(PropertyType {
    Apartment => "Apartment",
    Villa => "Villa",
    Plot => "Plot",
    Office => "Office",
    Retail => "Retail",
});

choice_enum!(Bhk {
    Studio => "Studio",
    One => "One",
    Two => "Two",
    Three => "Three",
    Four => "Four",
});

choice_enum!(Purpose {
    Buy => "Buy",
    Rent => "Rent",
});

choice_enum!(Timeline {
    ZeroToThreeMonths => "ZERO_TO_THREE_MONTHS",
    ThreeToSixMonths => "THREE_TO_SIX_MONTHS",
    SixPlusMonths => "SIX_PLUS_MONTHS",
    Exploring => "EXPLORING",
});

choice_enum!(Source {
    Website => "Website",
    Referral => "Referral",
    WalkIn => "Walk_in",
    Call => "Call",
    Other => "Other",
});

impl PropertyType {
    /// Dwellings described by a bedroom count.
    pub fn has_rooms(&self) -> bool {
        matches!(self, PropertyType::Apartment | PropertyType::Villa)
    }
}

/// A lead that passed validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBuyerInput {
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub phone: String,
    pub city: City,
    pub property_type: PropertyType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bhk: Option<Bhk>,
    pub purpose: Purpose,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_min: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_max: Option<i64>,
    pub timeline: Timeline,
    pub source: Source,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub tags: Vec<String>,
}

/// Buyer row about to be written, owned by `owner_id`.
#[derive(Debug, Clone)]
pub struct NewBuyer {
    pub owner_id: Uuid,
    pub input: CreateBuyerInput,
}
