//! UBX-NAV: navigation results.
//!
//! Structs hold the integers exactly as they appear on the wire. Accessors
//! with a unit suffix (`_deg`, `_m`) apply the documented scaling.
//!
//! The JSON form is the decoded view: u-blox key spellings (`iTOW`, `hMSL`),
//! bitfields as maps, enumerations as `{"enum": name, "val": n}`, and
//! angles and distances scaled the same way as the accessors.

use std::fmt;

use bytes::{BufMut, BytesMut};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use super::{i16_at, i32_at, i8_at, require, u16_at, u32_at};
use crate::bitfield::{parse_bitfield, parse_bitfield_into, BitField, Fields, Span};
use crate::error::{EncodeError, Result};

use crate::bitfield::BitField::{Bit, Span as Bits};

const FIX_TYPES: &[&str] = &[
    "noFix",
    "deadReckoning",
    "2D",
    "3D",
    "gnssWithDeadReckoning",
    "timeOnly",
];

const PSM_STATES: &[&str] = &[
    "disabled",
    "enabled",
    "acquisition",
    "tracking",
    "powerOptimizedTracking",
    "inactive",
];

const CARRIER_SOLUTIONS: &[&str] = &["none", "float", "fixed"];

const PVT_VALID: &[(&str, BitField)] = &[
    ("date", Bit(0)),
    ("time", Bit(1)),
    ("fullyResolved", Bits(Span::bits(2, 2))),
    ("mag", Bit(4)),
];

const PVT_FLAGS: &[(&str, BitField)] = &[
    ("gnssFixOK", Bit(0)),
    ("diffSoln", Bit(1)),
    ("psmState", Bits(Span::bits(2, 3).named(PSM_STATES))),
    ("headVehValid", Bit(5)),
    ("carrSoln", Bits(Span::bits(6, 2).named(CARRIER_SOLUTIONS))),
];

const PVT_FLAGS2: &[(&str, BitField)] = &[
    ("confirmedAvai", Bit(5)),
    ("confirmedDate", Bit(6)),
    ("confirmedTime", Bit(7)),
];

const QUALITY: &[&str] = &[
    "noSignal",
    "searching",
    "acquired",
    "unusable",
    "codeLocked",
    "codeCarrierLocked",
    "codeCarrierLocked",
    "codeCarrierLocked",
];

const HEALTH: &[&str] = &["unknown", "healthy", "unhealthy"];

const ORBIT_SOURCES: &[&str] = &[
    "noInfo",
    "ephemeris",
    "almanac",
    "assistNowOffline",
    "assistNowAutonomous",
    "other",
    "other",
    "other",
];

const SAT_FLAGS: &[(&str, BitField)] = &[
    ("qualityInd", Bits(Span::bits(0, 3).named(QUALITY))),
    ("svUsed", Bit(3)),
    ("health", Bits(Span::bits(4, 2).named(HEALTH))),
    ("diffCorr", Bit(6)),
    ("smoothed", Bit(7)),
    ("orbitSource", Bits(Span::bits(8, 3).named(ORBIT_SOURCES))),
    ("ephAvail", Bit(11)),
    ("almAvail", Bit(12)),
    ("anoAvail", Bit(13)),
    ("aopAvail", Bit(14)),
    ("sbasCorrUsed", Bit(16)),
    ("rtcmCorrUsed", Bit(17)),
    ("slasCorrUsed", Bit(18)),
    ("prCorrUsed", Bit(20)),
    ("crCorrUsed", Bit(21)),
    ("doCorrUsed", Bit(22)),
];

/// NAV-HPPOSLLH: high-precision geodetic position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavHpPosLlh {
    pub version: u8,
    pub itow: u32,
    /// Longitude, 1e-7 deg.
    pub lon: i32,
    /// Latitude, 1e-7 deg.
    pub lat: i32,
    /// Height above ellipsoid, mm.
    pub height: i32,
    /// Height above mean sea level, mm.
    pub h_msl: i32,
    /// High-precision longitude component, 1e-9 deg.
    pub lon_hp: i8,
    pub lat_hp: i8,
    /// High-precision height component, 0.1 mm.
    pub height_hp: i8,
    pub h_msl_hp: i8,
    /// Horizontal accuracy, 0.1 mm.
    pub h_acc: u32,
    pub v_acc: u32,
}

impl NavHpPosLlh {
    pub const LEN: usize = 36;

    pub fn lon_deg(&self) -> f64 {
        f64::from(self.lon) * 1e-7 + f64::from(self.lon_hp) * 1e-9
    }

    pub fn lat_deg(&self) -> f64 {
        f64::from(self.lat) * 1e-7 + f64::from(self.lat_hp) * 1e-9
    }

    pub fn height_m(&self) -> f64 {
        (f64::from(self.height) + f64::from(self.height_hp) * 0.1) / 1000.0
    }

    pub fn h_msl_m(&self) -> f64 {
        (f64::from(self.h_msl) + f64::from(self.h_msl_hp) * 0.1) / 1000.0
    }

    pub fn h_acc_m(&self) -> f64 {
        f64::from(self.h_acc) / 10000.0
    }

    pub fn v_acc_m(&self) -> f64 {
        f64::from(self.v_acc) / 10000.0
    }

    pub(crate) fn decode(p: &[u8]) -> Result<Self> {
        require(p, Self::LEN, "UBX-NAV-HPPOSLLH")?;
        Ok(Self {
            version: p[0],
            itow: u32_at(p, 4),
            lon: i32_at(p, 8),
            lat: i32_at(p, 12),
            height: i32_at(p, 16),
            h_msl: i32_at(p, 20),
            lon_hp: i8_at(p, 24),
            lat_hp: i8_at(p, 25),
            height_hp: i8_at(p, 26),
            h_msl_hp: i8_at(p, 27),
            h_acc: u32_at(p, 28),
            v_acc: u32_at(p, 32),
        })
    }

    pub(crate) fn encode(&self, dst: &mut BytesMut) {
        dst.reserve(Self::LEN);
        dst.put_u8(self.version);
        dst.put_bytes(0, 3);
        dst.put_u32_le(self.itow);
        dst.put_i32_le(self.lon);
        dst.put_i32_le(self.lat);
        dst.put_i32_le(self.height);
        dst.put_i32_le(self.h_msl);
        dst.put_i8(self.lon_hp);
        dst.put_i8(self.lat_hp);
        dst.put_i8(self.height_hp);
        dst.put_i8(self.h_msl_hp);
        dst.put_u32_le(self.h_acc);
        dst.put_u32_le(self.v_acc);
    }
}

impl fmt::Display for NavHpPosLlh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.9}°, {:.9}° ± {:.4}m, {:.4} ± {:.4} m MSL",
            self.lat_deg(),
            self.lon_deg(),
            self.h_acc_m(),
            self.h_msl_m(),
            self.v_acc_m()
        )
    }
}

/// NAV-SVIN: survey-in status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavSvin {
    pub version: u8,
    pub itow: u32,
    /// Elapsed survey-in time, s.
    pub dur: u32,
    /// Mean ECEF position, cm.
    pub mean_x: i32,
    pub mean_y: i32,
    pub mean_z: i32,
    /// High-precision ECEF components, 0.1 mm.
    pub mean_x_hp: i8,
    pub mean_y_hp: i8,
    pub mean_z_hp: i8,
    /// Mean position accuracy, 0.1 mm.
    pub mean_acc: u32,
    pub obs: u32,
    pub valid: bool,
    pub active: bool,
}

impl NavSvin {
    pub const LEN: usize = 40;

    pub fn mean_x_m(&self) -> f64 {
        ecef_m(self.mean_x, self.mean_x_hp)
    }

    pub fn mean_y_m(&self) -> f64 {
        ecef_m(self.mean_y, self.mean_y_hp)
    }

    pub fn mean_z_m(&self) -> f64 {
        ecef_m(self.mean_z, self.mean_z_hp)
    }

    pub fn mean_acc_m(&self) -> f64 {
        f64::from(self.mean_acc) / 10000.0
    }

    pub(crate) fn decode(p: &[u8]) -> Result<Self> {
        require(p, Self::LEN, "UBX-NAV-SVIN")?;
        Ok(Self {
            version: p[0],
            itow: u32_at(p, 4),
            dur: u32_at(p, 8),
            mean_x: i32_at(p, 12),
            mean_y: i32_at(p, 16),
            mean_z: i32_at(p, 20),
            mean_x_hp: i8_at(p, 24),
            mean_y_hp: i8_at(p, 25),
            mean_z_hp: i8_at(p, 26),
            mean_acc: u32_at(p, 28),
            obs: u32_at(p, 32),
            valid: p[36] != 0,
            active: p[37] != 0,
        })
    }

    pub(crate) fn encode(&self, dst: &mut BytesMut) {
        dst.reserve(Self::LEN);
        dst.put_u8(self.version);
        dst.put_bytes(0, 3);
        dst.put_u32_le(self.itow);
        dst.put_u32_le(self.dur);
        dst.put_i32_le(self.mean_x);
        dst.put_i32_le(self.mean_y);
        dst.put_i32_le(self.mean_z);
        dst.put_i8(self.mean_x_hp);
        dst.put_i8(self.mean_y_hp);
        dst.put_i8(self.mean_z_hp);
        dst.put_u8(0);
        dst.put_u32_le(self.mean_acc);
        dst.put_u32_le(self.obs);
        dst.put_u8(u8::from(self.valid));
        dst.put_u8(u8::from(self.active));
        dst.put_bytes(0, 2);
    }
}

fn ecef_m(cm: i32, hp: i8) -> f64 {
    (f64::from(cm) + f64::from(hp) * 0.01) / 100.0
}

/// NAV-PVT: navigation position velocity time solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavPvt {
    pub itow: u32,
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub min: u8,
    pub sec: u8,
    /// Validity bits, see [`NavPvt::valid`].
    pub valid: u8,
    /// Time accuracy, ns.
    pub t_acc: u32,
    /// Fraction of second, ns.
    pub nano: i32,
    pub fix_type: u8,
    pub flags: u8,
    pub flags2: u8,
    pub num_sv: u8,
    /// 1e-7 deg.
    pub lon: i32,
    pub lat: i32,
    /// mm.
    pub height: i32,
    pub h_msl: i32,
    pub h_acc: u32,
    pub v_acc: u32,
    /// NED velocity, mm/s.
    pub vel_n: i32,
    pub vel_e: i32,
    pub vel_d: i32,
    pub g_speed: i32,
    /// Heading of motion, 1e-5 deg.
    pub head_mot: i32,
    pub s_acc: u32,
    pub head_acc: u32,
    /// Position DOP, 0.01.
    pub p_dop: u16,
    /// Heading of vehicle, 1e-5 deg.
    pub head_veh: i32,
    /// Magnetic declination, 1e-2 deg.
    pub mag_dec: i16,
    pub mag_acc: i16,
}

impl NavPvt {
    pub const LEN: usize = 92;

    /// Decoded `valid` bits: `date`, `time`, `fullyResolved`, `mag`.
    pub fn valid_fields(&self) -> Fields {
        parse_bitfield(u32::from(self.valid), PVT_VALID)
    }

    /// Decoded `flags` and `flags2` bits as one map.
    pub fn flag_fields(&self) -> Fields {
        let mut fields = parse_bitfield(u32::from(self.flags), PVT_FLAGS);
        parse_bitfield_into(u32::from(self.flags2), PVT_FLAGS2, &mut fields);
        fields
    }

    /// Symbolic fix type; unknown values pass through as numbers.
    pub fn fix_type_name(&self) -> Option<&'static str> {
        FIX_TYPES.get(usize::from(self.fix_type)).copied()
    }

    pub fn lon_deg(&self) -> f64 {
        f64::from(self.lon) * 1e-7
    }

    pub fn lat_deg(&self) -> f64 {
        f64::from(self.lat) * 1e-7
    }

    pub fn head_mot_deg(&self) -> f64 {
        f64::from(self.head_mot) * 1e-5
    }

    pub fn head_veh_deg(&self) -> f64 {
        f64::from(self.head_veh) * 1e-5
    }

    pub fn p_dop_value(&self) -> f64 {
        f64::from(self.p_dop) * 0.01
    }

    pub fn mag_dec_deg(&self) -> f64 {
        f64::from(self.mag_dec) * 1e-2
    }

    pub fn mag_acc_deg(&self) -> f64 {
        f64::from(self.mag_acc) * 1e-2
    }

    pub(crate) fn decode(p: &[u8]) -> Result<Self> {
        require(p, Self::LEN, "UBX-NAV-PVT")?;
        Ok(Self {
            itow: u32_at(p, 0),
            year: u16_at(p, 4),
            month: p[6],
            day: p[7],
            hour: p[8],
            min: p[9],
            sec: p[10],
            valid: p[11],
            t_acc: u32_at(p, 12),
            nano: i32_at(p, 16),
            fix_type: p[20],
            flags: p[21],
            flags2: p[22],
            num_sv: p[23],
            lon: i32_at(p, 24),
            lat: i32_at(p, 28),
            height: i32_at(p, 32),
            h_msl: i32_at(p, 36),
            h_acc: u32_at(p, 40),
            v_acc: u32_at(p, 44),
            vel_n: i32_at(p, 48),
            vel_e: i32_at(p, 52),
            vel_d: i32_at(p, 56),
            g_speed: i32_at(p, 60),
            head_mot: i32_at(p, 64),
            s_acc: u32_at(p, 68),
            head_acc: u32_at(p, 72),
            p_dop: u16_at(p, 76),
            head_veh: i32_at(p, 84),
            mag_dec: i16_at(p, 88),
            mag_acc: i16_at(p, 90),
        })
    }

    pub(crate) fn encode(&self, dst: &mut BytesMut) {
        dst.reserve(Self::LEN);
        dst.put_u32_le(self.itow);
        dst.put_u16_le(self.year);
        dst.put_slice(&[self.month, self.day, self.hour, self.min, self.sec, self.valid]);
        dst.put_u32_le(self.t_acc);
        dst.put_i32_le(self.nano);
        dst.put_slice(&[self.fix_type, self.flags, self.flags2, self.num_sv]);
        dst.put_i32_le(self.lon);
        dst.put_i32_le(self.lat);
        dst.put_i32_le(self.height);
        dst.put_i32_le(self.h_msl);
        dst.put_u32_le(self.h_acc);
        dst.put_u32_le(self.v_acc);
        dst.put_i32_le(self.vel_n);
        dst.put_i32_le(self.vel_e);
        dst.put_i32_le(self.vel_d);
        dst.put_i32_le(self.g_speed);
        dst.put_i32_le(self.head_mot);
        dst.put_u32_le(self.s_acc);
        dst.put_u32_le(self.head_acc);
        dst.put_u16_le(self.p_dop);
        dst.put_bytes(0, 6);
        dst.put_i32_le(self.head_veh);
        dst.put_i16_le(self.mag_dec);
        dst.put_i16_le(self.mag_acc);
    }
}

impl fmt::Display for NavPvt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.fix_type_name() {
            Some(name) => f.write_str(name)?,
            None => write!(f, "fix {}", self.fix_type)?,
        }
        write!(
            f,
            " {}SV {:04}-{:02}-{:02}T{:02}:{:02}:{:02} {:.7}°, {:.7}° ± {:.3}m",
            self.num_sv,
            self.year,
            self.month,
            self.day,
            self.hour,
            self.min,
            self.sec,
            self.lat_deg(),
            self.lon_deg(),
            f64::from(self.h_acc) / 1000.0
        )
    }
}

/// One satellite block of NAV-SAT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SatInfo {
    pub gnss_id: u8,
    pub sv_id: u8,
    /// Carrier-to-noise ratio, dBHz.
    pub cno: u8,
    /// Elevation, deg.
    pub elev: i8,
    /// Azimuth, deg.
    pub azim: i16,
    /// Pseudorange residual, 0.1 m.
    pub pr_res: i16,
    pub flags: u32,
}

impl SatInfo {
    pub const LEN: usize = 12;

    pub fn pr_res_m(&self) -> f64 {
        f64::from(self.pr_res) * 0.1
    }

    /// Decoded signal quality, health, orbit source and correction flags.
    pub fn flag_fields(&self) -> Fields {
        parse_bitfield(self.flags, SAT_FLAGS)
    }

    /// True if the satellite is used in the navigation solution.
    pub fn used(&self) -> bool {
        crate::bitfield::flag(self.flags, 3)
    }

    fn decode(p: &[u8]) -> Self {
        Self {
            gnss_id: p[0],
            sv_id: p[1],
            cno: p[2],
            elev: i8_at(p, 3),
            azim: i16_at(p, 4),
            pr_res: i16_at(p, 6),
            flags: u32_at(p, 8),
        }
    }

    fn encode(&self, dst: &mut BytesMut) {
        dst.put_u8(self.gnss_id);
        dst.put_u8(self.sv_id);
        dst.put_u8(self.cno);
        dst.put_i8(self.elev);
        dst.put_i16_le(self.azim);
        dst.put_i16_le(self.pr_res);
        dst.put_u32_le(self.flags);
    }
}

/// NAV-SAT: satellite information.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NavSat {
    pub itow: u32,
    pub version: u8,
    pub svs: Vec<SatInfo>,
}

impl NavSat {
    pub const HEADER_LEN: usize = 8;

    pub fn num_svs(&self) -> usize {
        self.svs.len()
    }

    pub(crate) fn decode(p: &[u8]) -> Result<Self> {
        require(p, Self::HEADER_LEN, "UBX-NAV-SAT")?;
        let num_svs = usize::from(p[5]);
        require(p, Self::HEADER_LEN + SatInfo::LEN * num_svs, "UBX-NAV-SAT")?;

        let svs = p[Self::HEADER_LEN..]
            .chunks_exact(SatInfo::LEN)
            .take(num_svs)
            .map(SatInfo::decode)
            .collect();

        Ok(Self {
            itow: u32_at(p, 0),
            version: p[4],
            svs,
        })
    }

    pub(crate) fn encode(&self, dst: &mut BytesMut) -> std::result::Result<(), EncodeError> {
        let count = u8::try_from(self.svs.len()).map_err(|_| EncodeError::TooManyEntries {
            message: "UBX-NAV-SAT",
            field: "svs",
            count: self.svs.len(),
            max: usize::from(u8::MAX),
        })?;

        dst.reserve(Self::HEADER_LEN + SatInfo::LEN * self.svs.len());
        dst.put_u32_le(self.itow);
        dst.put_u8(self.version);
        dst.put_u8(count);
        dst.put_bytes(0, 2);
        for sv in &self.svs {
            sv.encode(dst);
        }
        Ok(())
    }
}

/// An enumerated value: `{"enum": name, "val": n}`, or just `{"val": n}`
/// when the number has no name.
#[derive(Serialize)]
struct Enumerated {
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    name: Option<&'static str>,
    val: u8,
}

impl Serialize for NavHpPosLlh {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("NavHpPosLlh", 8)?;
        s.serialize_field("version", &self.version)?;
        s.serialize_field("iTOW", &self.itow)?;
        s.serialize_field("lon", &self.lon_deg())?;
        s.serialize_field("lat", &self.lat_deg())?;
        s.serialize_field("height", &self.height_m())?;
        s.serialize_field("hMSL", &self.h_msl_m())?;
        s.serialize_field("hAcc", &self.h_acc_m())?;
        s.serialize_field("vAcc", &self.v_acc_m())?;
        s.end()
    }
}

impl Serialize for NavSvin {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("NavSvin", 10)?;
        s.serialize_field("version", &self.version)?;
        s.serialize_field("iTOW", &self.itow)?;
        s.serialize_field("dur", &self.dur)?;
        s.serialize_field("meanX", &self.mean_x_m())?;
        s.serialize_field("meanY", &self.mean_y_m())?;
        s.serialize_field("meanZ", &self.mean_z_m())?;
        s.serialize_field("meanAcc", &self.mean_acc_m())?;
        s.serialize_field("obs", &self.obs)?;
        s.serialize_field("valid", &self.valid)?;
        s.serialize_field("active", &self.active)?;
        s.end()
    }
}

// Position, height and velocity stay in the receiver's mm and mm/s; only
// the angular fields and DOP are scaled.
impl Serialize for NavPvt {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("NavPvt", 30)?;
        s.serialize_field("iTOW", &self.itow)?;
        s.serialize_field("year", &self.year)?;
        s.serialize_field("month", &self.month)?;
        s.serialize_field("day", &self.day)?;
        s.serialize_field("hour", &self.hour)?;
        s.serialize_field("min", &self.min)?;
        s.serialize_field("sec", &self.sec)?;
        s.serialize_field("valid", &self.valid_fields())?;
        s.serialize_field("tAcc", &self.t_acc)?;
        s.serialize_field("nano", &self.nano)?;
        s.serialize_field(
            "fixType",
            &Enumerated {
                name: self.fix_type_name(),
                val: self.fix_type,
            },
        )?;
        s.serialize_field("flags", &self.flag_fields())?;
        s.serialize_field("numSV", &self.num_sv)?;
        s.serialize_field("lon", &self.lon_deg())?;
        s.serialize_field("lat", &self.lat_deg())?;
        s.serialize_field("height", &self.height)?;
        s.serialize_field("hMSL", &self.h_msl)?;
        s.serialize_field("hAcc", &self.h_acc)?;
        s.serialize_field("vAcc", &self.v_acc)?;
        s.serialize_field("velN", &self.vel_n)?;
        s.serialize_field("velE", &self.vel_e)?;
        s.serialize_field("velD", &self.vel_d)?;
        s.serialize_field("gSpeed", &self.g_speed)?;
        s.serialize_field("headMot", &self.head_mot_deg())?;
        s.serialize_field("sAcc", &self.s_acc)?;
        s.serialize_field("headAcc", &self.head_acc)?;
        s.serialize_field("pDOP", &self.p_dop_value())?;
        s.serialize_field("headVeh", &self.head_veh_deg())?;
        s.serialize_field("magDec", &self.mag_dec_deg())?;
        s.serialize_field("magAcc", &self.mag_acc_deg())?;
        s.end()
    }
}

impl Serialize for SatInfo {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("SatInfo", 7)?;
        s.serialize_field("gnssId", &self.gnss_id)?;
        s.serialize_field("svId", &self.sv_id)?;
        s.serialize_field("cno", &self.cno)?;
        s.serialize_field("elev", &self.elev)?;
        s.serialize_field("azim", &self.azim)?;
        s.serialize_field("prRes", &self.pr_res_m())?;
        s.serialize_field("flags", &self.flag_fields())?;
        s.end()
    }
}

impl Serialize for NavSat {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("NavSat", 4)?;
        s.serialize_field("iTOW", &self.itow)?;
        s.serialize_field("version", &self.version)?;
        s.serialize_field("numSvs", &self.num_svs())?;
        s.serialize_field("svs", &self.svs)?;
        s.end()
    }
}
