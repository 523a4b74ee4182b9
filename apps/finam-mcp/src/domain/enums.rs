//! Wire Enumerations
//!
//! Every enumeration the Finam API accepts or returns is a closed set of
//! canonical names (`SIDE_BUY`, `TIME_FRAME_M5`, ...). Numbered enums also
//! carry a numeric value per variant, counted from the enum's first value
//! (`Side` from 0, `TimeFrame` from 1). [`WireEnum::parse`] tries an exact
//! name match first and falls back to the numeric value. Name-only enums
//! (`OrderType`, `AssetType`, ...) accept names and nothing else.
//!
//! Serialization always emits the canonical name. Deserialization accepts a
//! name or a value, as a string or as a JSON number.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

// =============================================================================
// Parse Error
// =============================================================================

/// Input matched neither a canonical name nor a numeric value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} '{input}': expected one of {expected}")]
pub struct EnumParseError {
    /// Enumeration being parsed.
    pub kind: &'static str,
    /// Rejected input.
    pub input: String,
    /// Comma-separated canonical names.
    pub expected: String,
}

// =============================================================================
// WireEnum
// =============================================================================

/// A closed enumeration with a canonical wire name per variant.
pub trait WireEnum: Sized + Copy + PartialEq + 'static {
    /// Human-readable enumeration name used in errors.
    const KIND: &'static str;

    /// All variants in declaration order.
    const VARIANTS: &'static [Self];

    /// Value of the first variant; `None` for name-only enums.
    const FIRST_VALUE: Option<u64>;

    /// Canonical wire name.
    fn name(self) -> &'static str;

    /// Numeric value, or `None` when the enum is name-only.
    fn value(self) -> Option<u64> {
        let first = Self::FIRST_VALUE?;
        let position = Self::VARIANTS.iter().position(|variant| *variant == self)?;
        u64::try_from(position).ok().map(|offset| first + offset)
    }

    /// Variant carrying `value`, if the enum is numbered and in range.
    fn from_value(value: u64) -> Option<Self> {
        let offset = value.checked_sub(Self::FIRST_VALUE?)?;
        let index = usize::try_from(offset).ok()?;
        Self::VARIANTS.get(index).copied()
    }

    /// Two-step parse: exact canonical name, else decimal value.
    fn parse(input: &str) -> Result<Self, EnumParseError> {
        if let Some(variant) = Self::VARIANTS.iter().find(|v| v.name() == input) {
            return Ok(*variant);
        }

        input
            .parse::<u64>()
            .ok()
            .and_then(Self::from_value)
            .ok_or_else(|| EnumParseError {
                kind: Self::KIND,
                input: input.to_string(),
                expected: Self::names().join(", "),
            })
    }

    /// Canonical names in declaration order.
    fn names() -> Vec<&'static str> {
        Self::VARIANTS.iter().map(|v| v.name()).collect()
    }
}

/// Raw enum input as it may appear in JSON.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawWireValue {
    Text(String),
    Number(u64),
}

fn serialize_wire<E: WireEnum, S: Serializer>(value: E, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(value.name())
}

fn deserialize_wire<'de, E: WireEnum, D: Deserializer<'de>>(deserializer: D) -> Result<E, D::Error> {
    let raw = match RawWireValue::deserialize(deserializer)? {
        RawWireValue::Text(text) => text,
        RawWireValue::Number(value) => value.to_string(),
    };
    E::parse(&raw).map_err(serde::de::Error::custom)
}

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident as $kind:literal, numbered from $first:literal {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => $wire:literal,
            )+
        }
    ) => {
        wire_enum!(@define [$(#[$meta])*] $name, $kind, Some($first), [$($(#[$vmeta])* $variant => $wire,)+]);
    };
    (
        $(#[$meta:meta])*
        pub enum $name:ident as $kind:literal {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => $wire:literal,
            )+
        }
    ) => {
        wire_enum!(@define [$(#[$meta])*] $name, $kind, None, [$($(#[$vmeta])* $variant => $wire,)+]);
    };
    (
        @define [$(#[$meta:meta])*] $name:ident, $kind:literal, $first:expr,
        [$($(#[$vmeta:meta])* $variant:ident => $wire:literal,)+]
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                $variant,
            )+
        }

        impl WireEnum for $name {
            const KIND: &'static str = $kind;
            const VARIANTS: &'static [Self] = &[$(Self::$variant),+];
            const FIRST_VALUE: Option<u64> = $first;

            fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl std::str::FromStr for $name {
            type Err = EnumParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <Self as WireEnum>::parse(s)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serialize_wire(*self, serializer)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                deserialize_wire(deserializer)
            }
        }
    };
}

// =============================================================================
// Order Enumerations
// =============================================================================

wire_enum! {
    /// Trade direction.
    #[derive(Default)]
    pub enum Side as "side", numbered from 0 {
        /// Not specified.
        #[default]
        Unspecified => "SIDE_UNSPECIFIED",
        /// Buy.
        Buy => "SIDE_BUY",
        /// Sell.
        Sell => "SIDE_SELL",
    }
}

wire_enum! {
    /// Order type.
    #[derive(Default)]
    pub enum OrderType as "order type" {
        /// Not specified.
        #[default]
        Unspecified => "ORDER_TYPE_UNSPECIFIED",
        /// Market order.
        Market => "ORDER_TYPE_MARKET",
        /// Limit order.
        Limit => "ORDER_TYPE_LIMIT",
        /// Stop order.
        Stop => "ORDER_TYPE_STOP",
        /// Stop-limit order.
        StopLimit => "ORDER_TYPE_STOP_LIMIT",
        /// Multi-leg order.
        MultiLeg => "ORDER_TYPE_MULTI_LEG",
    }
}

wire_enum! {
    /// Order lifetime.
    #[derive(Default)]
    pub enum TimeInForce as "time in force", numbered from 0 {
        /// Not specified.
        #[default]
        Unspecified => "TIME_IN_FORCE_UNSPECIFIED",
        /// Until end of the trading day.
        Day => "TIME_IN_FORCE_DAY",
        /// Until cancelled.
        GoodTillCancel => "TIME_IN_FORCE_GOOD_TILL_CANCEL",
        /// Until crossing.
        GoodTillCrossing => "TIME_IN_FORCE_GOOD_TILL_CROSSING",
        /// Extended hours.
        Ext => "TIME_IN_FORCE_EXT",
        /// At the open.
        OnOpen => "TIME_IN_FORCE_ON_OPEN",
        /// At the close.
        OnClose => "TIME_IN_FORCE_ON_CLOSE",
        /// Immediate or cancel.
        Ioc => "TIME_IN_FORCE_IOC",
        /// Fill or kill.
        Fok => "TIME_IN_FORCE_FOK",
    }
}

wire_enum! {
    /// Stop trigger direction.
    #[derive(Default)]
    pub enum StopCondition as "stop condition", numbered from 0 {
        /// Not specified.
        #[default]
        Unspecified => "STOP_CONDITION_UNSPECIFIED",
        /// Last price rises to the stop.
        LastUp => "STOP_CONDITION_LAST_UP",
        /// Last price falls to the stop.
        LastDown => "STOP_CONDITION_LAST_DOWN",
    }
}

wire_enum! {
    /// Conditional order validity.
    #[derive(Default)]
    pub enum ValidBefore as "valid before", numbered from 0 {
        /// Not specified.
        #[default]
        Unspecified => "VALID_BEFORE_UNSPECIFIED",
        /// Until end of day.
        EndOfDay => "VALID_BEFORE_END_OF_DAY",
        /// Until cancelled.
        GoodTillCancel => "VALID_BEFORE_GOOD_TILL_CANCEL",
        /// Until a date.
        GoodTillDate => "VALID_BEFORE_GOOD_TILL_DATE",
    }
}

// =============================================================================
// Market Data Enumerations
// =============================================================================

wire_enum! {
    /// Bar aggregation period.
    #[derive(Default)]
    pub enum TimeFrame as "time frame", numbered from 1 {
        /// Not specified.
        #[default]
        Unspecified => "TIME_FRAME_UNSPECIFIED",
        /// One minute.
        M1 => "TIME_FRAME_M1",
        /// Five minutes.
        M5 => "TIME_FRAME_M5",
        /// Fifteen minutes.
        M15 => "TIME_FRAME_M15",
        /// Thirty minutes.
        M30 => "TIME_FRAME_M30",
        /// One hour.
        H1 => "TIME_FRAME_H1",
        /// Two hours.
        H2 => "TIME_FRAME_H2",
        /// Four hours.
        H4 => "TIME_FRAME_H4",
        /// Eight hours.
        H8 => "TIME_FRAME_H8",
        /// One day.
        D => "TIME_FRAME_D",
        /// One week.
        W => "TIME_FRAME_W",
        /// One month.
        Mn => "TIME_FRAME_MN",
        /// One quarter.
        Qr => "TIME_FRAME_QR",
    }
}

wire_enum! {
    /// Order book row change.
    #[derive(Default)]
    pub enum OrderBookRowAction as "order book action", numbered from 1 {
        /// Not specified.
        #[default]
        Unspecified => "ACTION_UNSPECIFIED",
        /// Level removed.
        Remove => "ACTION_REMOVE",
        /// Level added.
        Add => "ACTION_ADD",
        /// Level updated.
        Update => "ACTION_UPDATE",
    }
}

// =============================================================================
// Reference Data Enumerations
// =============================================================================

wire_enum! {
    /// Instrument type classification.
    pub enum AssetType as "asset type" {
        /// Shares.
        Equities => "EQUITIES",
        /// Funds.
        Funds => "FUNDS",
        /// Futures.
        Futures => "FUTURES",
        /// Bonds.
        Bonds => "BONDS",
        /// Anything else.
        Other => "OTHER",
        /// Currency pairs.
        Currencies => "CURRENCIES",
        /// Swaps.
        Swaps => "SWAPS",
        /// Indices.
        Indices => "INDICES",
        /// Spreads.
        Spreads => "SPREADS",
    }
}

wire_enum! {
    /// Long position availability.
    pub enum LongableStatus as "longable status" {
        /// Not available.
        NotAvailable => "NOT_AVAILABLE",
        /// Available.
        Available => "AVAILABLE",
        /// Account not approved.
        AccountNotApproved => "ACCOUNT_NOT_APPROVED",
    }
}

wire_enum! {
    /// Short position availability.
    pub enum ShortableStatus as "shortable status" {
        /// Not available.
        NotAvailable => "NOT_AVAILABLE",
        /// Available.
        Available => "AVAILABLE",
        /// Hard to borrow.
        Htb => "HTB",
        /// Account not approved.
        AccountNotApproved => "ACCOUNT_NOT_APPROVED",
        /// Available for strategies only.
        AvailableStrategy => "AVAILABLE_STRATEGY",
    }
}

/// Common exchange MIC codes accepted in `TICKER@MIC` symbols.
pub const KNOWN_MICS: &[&str] = &[
    "_EURB", "XNCM", "RTSX", "_NPRO", "XNMS", "XLON", "XNYM", "XSHG", "XPAR", "XNGS", "PINX",
    "XAMS", "XETR", "XNYS", "_MMBZ", "XSHE", "MISX", "XBRU", "XCEC", "BATS", "XNAS", "XCBT",
    "_CMF", "_SPBZ", "_TRES", "XLOM", "_CRYP", "ARCX", "XASE", "XMAD", "_SCI", "XGAT", "XTKS",
    "XHKG", "XCME",
];
