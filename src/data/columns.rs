//! Measured parameters and their source column names.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Header of the optional sampling-date column.
pub const DATE_HEADER: &str = "FECHA";

/// Cell values meaning "below the detection limit".
///
/// Matching is exact on the trimmed cell: `<100` is not a sentinel.
pub const SENTINEL_TOKENS: [&str; 2] = ["<1", "<10"];

/// Calendar years held out for validation.
pub const VALIDATION_YEARS: [i32; 2] = [2012, 2013];

/// A measured water-quality parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Parameter {
    /// Field pH.
    Ph,
    /// Chemical oxygen demand.
    Cod,
    /// Dissolved oxygen.
    DissolvedOxygen,
    /// Total suspended solids.
    Tss,
    /// Water temperature.
    WaterTemp,
    /// Five-day biochemical oxygen demand, the regression target.
    Bod5,
}

impl Parameter {
    /// Every required parameter, in storage order.
    pub const ALL: [Parameter; 6] = [
        Parameter::Ph,
        Parameter::Cod,
        Parameter::DissolvedOxygen,
        Parameter::Tss,
        Parameter::WaterTemp,
        Parameter::Bod5,
    ];

    /// Candidate predictors of BOD5, in the column order used for selection.
    pub const PREDICTORS: [Parameter; 5] = [
        Parameter::Ph,
        Parameter::Cod,
        Parameter::DissolvedOxygen,
        Parameter::Tss,
        Parameter::WaterTemp,
    ];

    /// Default regression target.
    pub const TARGET: Parameter = Parameter::Bod5;

    /// Exact column header in the source file.
    pub fn header(self) -> &'static str {
        match self {
            Parameter::Ph => "pH_CAMPO",
            Parameter::Cod => "DQO_TOT",
            Parameter::DissolvedOxygen => "OD_mg/L",
            Parameter::Tss => "SST",
            Parameter::WaterTemp => "TEMP_AGUA",
            Parameter::Bod5 => "DBO5",
        }
    }

    /// Short English name.
    pub fn short_name(self) -> &'static str {
        match self {
            Parameter::Ph => "pH",
            Parameter::Cod => "COD",
            Parameter::DissolvedOxygen => "DO",
            Parameter::Tss => "TSS",
            Parameter::WaterTemp => "WaterTemp",
            Parameter::Bod5 => "BOD5",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Parameter::Ph => "",
            Parameter::WaterTemp => "°C",
            _ => "mg/L",
        }
    }

    /// Position in [`Parameter::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Every parameter except `target`, in storage order.
    pub fn predictors_for(target: Parameter) -> Vec<Parameter> {
        Self::ALL.into_iter().filter(|&p| p != target).collect()
    }

    /// Look up a parameter by its exact source header.
    pub fn from_header(header: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.header() == header)
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// Error for an unrecognised parameter name.
#[derive(Debug, thiserror::Error)]
#[error("unknown parameter '{0}'")]
pub struct UnknownParameter(pub String);

impl FromStr for Parameter {
    type Err = UnknownParameter;

    /// Accepts the source header or the short name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| {
                p.header().eq_ignore_ascii_case(wanted) || p.short_name().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| UnknownParameter(s.to_owned()))
    }
}
