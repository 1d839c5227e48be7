//! UBX-CFG: receiver configuration messages.

use std::fmt;
use std::str::FromStr;

use bytes::{BufMut, BytesMut};
use serde::{Serialize, Serializer};

use super::{i8_at, require, u16_at};
use crate::error::{DecodeError, ParseNameError, Result};

/// Output rate carried by a CFG-MSG payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MsgRate {
    /// No rate: poll the current setting.
    Poll,
    /// Rate on the port the message arrives on.
    Current(u8),
    /// Rate for each of the six I/O ports.
    PerPort([u8; 6]),
}

impl MsgRate {
    fn len(&self) -> usize {
        match self {
            MsgRate::Poll => 0,
            MsgRate::Current(_) => 1,
            MsgRate::PerPort(_) => 6,
        }
    }
}

/// CFG-MSG: poll or set the output rate of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CfgMsg {
    pub msg_class: u8,
    pub msg_id: u8,
    pub rate: MsgRate,
}

impl CfgMsg {
    /// Poll the output rate of `msg_class`/`msg_id`.
    pub fn poll(msg_class: u8, msg_id: u8) -> Self {
        Self {
            msg_class,
            msg_id,
            rate: MsgRate::Poll,
        }
    }

    /// Set the output rate on the current port.
    pub fn set_rate(msg_class: u8, msg_id: u8, rate: u8) -> Self {
        Self {
            msg_class,
            msg_id,
            rate: MsgRate::Current(rate),
        }
    }

    pub(crate) fn decode(p: &[u8]) -> Result<Self> {
        let rate = match p.len() {
            2 => MsgRate::Poll,
            3 => MsgRate::Current(p[2]),
            8 => {
                let mut ports = [0u8; 6];
                ports.copy_from_slice(&p[2..8]);
                MsgRate::PerPort(ports)
            }
            actual => {
                return Err(DecodeError::PayloadLength {
                    message: "UBX-CFG-MSG",
                    actual,
                })
            }
        };
        Ok(Self {
            msg_class: p[0],
            msg_id: p[1],
            rate,
        })
    }

    pub(crate) fn encode(&self, dst: &mut BytesMut) {
        dst.reserve(2 + self.rate.len());
        dst.put_u8(self.msg_class);
        dst.put_u8(self.msg_id);
        match self.rate {
            MsgRate::Poll => {}
            MsgRate::Current(rate) => dst.put_u8(rate),
            MsgRate::PerPort(ports) => dst.put_slice(&ports),
        }
    }
}

/// CFG-RATE: navigation and measurement rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CfgRate {
    /// Measurement period in milliseconds.
    pub meas_rate: u16,
    /// Measurement cycles per navigation solution.
    pub nav_rate: u16,
    /// Time system the measurements are aligned to.
    pub time_ref: u16,
}

impl CfgRate {
    pub const LEN: usize = 6;

    pub(crate) fn decode(p: &[u8]) -> Result<Self> {
        require(p, Self::LEN, "UBX-CFG-RATE")?;
        Ok(Self {
            meas_rate: u16_at(p, 0),
            nav_rate: u16_at(p, 2),
            time_ref: u16_at(p, 4),
        })
    }

    pub(crate) fn encode(&self, dst: &mut BytesMut) {
        dst.put_u16_le(self.meas_rate);
        dst.put_u16_le(self.nav_rate);
        dst.put_u16_le(self.time_ref);
    }
}

impl Default for CfgRate {
    fn default() -> Self {
        Self {
            meas_rate: 1000,
            nav_rate: 1,
            time_ref: 1,
        }
    }
}

macro_rules! named_u8 {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($variant:ident = $value:literal => $label:literal $(| $alias:literal)*),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)*
            /// A value without a symbolic name.
            Other(u8),
        }

        impl $name {
            /// Symbolic names accepted by `FromStr`.
            pub const NAMES: &'static [&'static str] = &[$($label),*];

            pub fn name(self) -> Option<&'static str> {
                match self {
                    $($name::$variant => Some($label),)*
                    $name::Other(_) => None,
                }
            }
        }

        impl From<u8> for $name {
            fn from(value: u8) -> Self {
                match value {
                    $($value => $name::$variant,)*
                    other => $name::Other(other),
                }
            }
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> u8 {
                match value {
                    $($name::$variant => $value,)*
                    $name::Other(other) => other,
                }
            }
        }

        impl FromStr for $name {
            type Err = ParseNameError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s {
                    $($label $(| $alias)* => Ok($name::$variant),)*
                    other => Err(ParseNameError {
                        kind: $kind,
                        name: other.to_string(),
                        expected: Self::NAMES.join(", "),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self.name() {
                    Some(name) => f.write_str(name),
                    None => write!(f, "{}", u8::from(*self)),
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                match self.name() {
                    Some(name) => serializer.serialize_str(name),
                    None => serializer.serialize_u8(u8::from(*self)),
                }
            }
        }
    };
}

named_u8!(
    /// Platform model used by the navigation filter.
    DynModel, "dynamic model" {
        Portable = 0 => "portable",
        Stationary = 2 => "stationary",
        Pedestrian = 3 => "pedestrian",
        Automotive = 4 => "automotive",
        Sea = 5 => "sea",
        Airborne1g = 6 => "airborne-1g" | "airborn_1g",
        Airborne2g = 7 => "airborne-2g" | "airborn_2g",
        Airborne4g = 8 => "airborne-4g" | "airborn_4g",
        Wristwatch = 9 => "wristwatch",
    }
);

named_u8!(
    /// Position fixing mode.
    FixMode, "fix mode" {
        Fix2d = 1 => "2d",
        Fix3d = 2 => "3d",
        Auto = 3 => "auto",
    }
);

/// CFG-NAV5: navigation engine settings.
///
/// Only the settings present are applied by the receiver; the mask is
/// derived from which fields are `Some`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CfgNav5 {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dyn_model: Option<DynModel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix_mode: Option<FixMode>,
    /// Minimum satellite elevation in degrees.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_elev: Option<i8>,
}

impl CfgNav5 {
    pub const LEN: usize = 36;

    const MASK_DYN: u16 = 1 << 0;
    const MASK_MIN_EL: u16 = 1 << 1;
    const MASK_POS_FIX_MODE: u16 = 1 << 2;

    /// Set only the dynamic platform model.
    pub fn dyn_model(model: DynModel) -> Self {
        Self {
            dyn_model: Some(model),
            ..Self::default()
        }
    }

    /// Parameter mask selecting the settings to apply.
    pub fn mask(&self) -> u16 {
        let mut mask = 0;
        if self.dyn_model.is_some() {
            mask |= Self::MASK_DYN;
        }
        if self.min_elev.is_some() {
            mask |= Self::MASK_MIN_EL;
        }
        if self.fix_mode.is_some() {
            mask |= Self::MASK_POS_FIX_MODE;
        }
        mask
    }

    pub(crate) fn decode(p: &[u8]) -> Result<Self> {
        require(p, Self::LEN, "UBX-CFG-NAV5")?;
        let mask = u16_at(p, 0);
        let set = |bit: u16| mask & bit != 0;
        Ok(Self {
            dyn_model: set(Self::MASK_DYN).then(|| DynModel::from(p[2])),
            fix_mode: set(Self::MASK_POS_FIX_MODE).then(|| FixMode::from(p[3])),
            min_elev: set(Self::MASK_MIN_EL).then(|| i8_at(p, 12)),
        })
    }

    pub(crate) fn encode(&self, dst: &mut BytesMut) {
        let mut payload = [0u8; Self::LEN];
        payload[..2].copy_from_slice(&self.mask().to_le_bytes());
        if let Some(model) = self.dyn_model {
            payload[2] = model.into();
        }
        if let Some(mode) = self.fix_mode {
            payload[3] = mode.into();
        }
        if let Some(elev) = self.min_elev {
            payload[12] = elev as u8;
        }
        dst.put_slice(&payload);
    }
}
