//! Closed categorical domains accepted by the price model.
//!
//! Every enum mirrors the training vocabulary exactly (including accents and
//! the odd embedded newline), because the label encoders shipped with the
//! model are keyed on these strings.

use crate::utils::error::PricingError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Common surface of the categorical enums.
pub trait Categorical: Sized + Copy + 'static {
    /// Encoder / feature column this attribute feeds.
    const COLUMN: &'static str;
    /// Request field name used in validation errors.
    const FIELD: &'static str;

    fn all() -> &'static [Self];
    fn label(&self) -> &'static str;

    fn labels() -> Vec<&'static str> {
        Self::all().iter().map(|v| v.label()).collect()
    }

    fn parse_label(value: &str) -> Result<Self, PricingError> {
        Self::all()
            .iter()
            .copied()
            .find(|v| v.label() == value)
            .ok_or_else(|| PricingError::ValidationError {
                field: Self::FIELD.to_string(),
                value: value.to_string(),
                reason: format!("Allowed values: {}", Self::labels().join(", ")),
            })
    }
}

macro_rules! categorical {
    (
        $(#[$meta:meta])*
        $name:ident, column = $column:literal, field = $field:literal {
            $($variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl Categorical for $name {
            const COLUMN: &'static str = $column;
            const FIELD: &'static str = $field;

            fn all() -> &'static [Self] {
                &[$($name::$variant),+]
            }

            fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl FromStr for $name {
            type Err = PricingError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse_label(s)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

categorical! {
    /// Heating system types present in the training data.
    Heating, column = "Heating", field = "heating" {
        Electric => "elektryczne",
        Gas => "gazowe",
        Other => "inne",
        FireplaceGas => "kominkowe\ngazowe",
        BoilerRoom => "kotłownia",
        Municipal => "miejskie",
        HeatPump => "pompa ciepła",
        Coal => "węglowe",
    }
}

categorical! {
    BuildingMaterial, column = "Building material", field = "building_material" {
        Concrete => "beton",
        CellularConcrete => "beton komórkowy",
        Brick => "cegła",
        Wood => "drewno",
        Other => "inny",
        ExpandedClay => "keramzyt",
        HollowBlock => "pustak",
        Silicate => "silikat",
        LargePanel => "wielka płyta",
        ReinforcedConcrete => "żelbet",
    }
}

categorical! {
    BuildingType, column = "Building type", field = "building_type" {
        ApartmentBuilding => "apartamentowiec",
        SemiDetached => "bliźniak",
        Block => "blok",
        DetachedHouse => "dom wolnostojący",
        Tenement => "kamienica",
        Loft => "loft",
        Infill => "plomba",
        Terraced => "szeregowiec",
        Detached => "wolnostojący",
    }
}

categorical! {
    /// Primary (new build) or secondary (resale) market.
    Market, column = "Market", field = "market" {
        Primary => "pierwotny",
        Secondary => "wtórny",
    }
}

categorical! {
    /// Polish voivodeships.
    Province, column = "voivodeship", field = "voivodeship" {
        LowerSilesian => "dolnośląskie",
        KuyavianPomeranian => "kujawsko-pomorskie",
        Lublin => "lubelskie",
        Lubusz => "lubuskie",
        Masovian => "mazowieckie",
        LesserPoland => "małopolskie",
        Opole => "opolskie",
        Subcarpathian => "podkarpackie",
        Podlaskie => "podlaskie",
        Pomeranian => "pomorskie",
        WarmianMasurian => "warmińsko-mazurskie",
        GreaterPoland => "wielkopolskie",
        WestPomeranian => "zachodniopomorskie",
        Lodz => "łódzkie",
        Silesian => "śląskie",
        HolyCross => "świętokrzyskie",
    }
}
