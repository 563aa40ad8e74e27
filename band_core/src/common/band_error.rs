use strum_macros::{Display, EnumString};
use thiserror::Error;

use crate::common::enums::Horizon;

/// Error codes for the band engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[repr(i32)]
pub enum ErrCode {
    // Analysis errors (0-99)
    #[strum(serialize = "_ANALYSIS_ERR_BEGIN")]
    AnalysisErrBegin = 0,
    #[strum(serialize = "INSUFFICIENT_HISTORY")]
    InsufficientHistory = 1,
    #[strum(serialize = "INSUFFICIENT_DATA")]
    InsufficientData = 2,
    #[strum(serialize = "PARA_ERROR")]
    ParaError = 5,
    #[strum(serialize = "SINGULAR_FIT")]
    SingularFit = 6,
    #[strum(serialize = "CONFIG_ERROR")]
    ConfigError = 17,
    #[strum(serialize = "_ANALYSIS_ERR_END")]
    AnalysisErrEnd = 99,

    // KL data errors (200-299)
    #[strum(serialize = "_KL_ERR_BEGIN")]
    KlErrBegin = 200,
    #[strum(serialize = "PRICE_BELOW_ZERO")]
    PriceBelowZero = 201,
    #[strum(serialize = "KL_DATA_INVALID")]
    KlDataInvalid = 203,
    #[strum(serialize = "KL_NOT_MONOTONOUS")]
    KlNotMonotonous = 206,
    #[strum(serialize = "_KL_ERR_END")]
    KlErrEnd = 299,
}

impl ErrCode {
    pub fn is_kldata_err(&self) -> bool {
        let code = *self as i32;
        code > Self::KlErrBegin as i32 && code < Self::KlErrEnd as i32
    }

    pub fn is_analysis_err(&self) -> bool {
        let code = *self as i32;
        code > Self::AnalysisErrBegin as i32 && code < Self::AnalysisErrEnd as i32
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BandError {
    /// A delta horizon reaches further back than the series goes.
    #[error(
        "{}: horizon {horizon} needs {required} bars, only {available} available (longest satisfiable: {})",
        ErrCode::InsufficientHistory,
        .satisfiable.as_ref().map(|h| h.to_string()).unwrap_or_else(|| "none".to_string())
    )]
    InsufficientHistory {
        horizon: Horizon,
        required: usize,
        available: usize,
        satisfiable: Option<Horizon>,
    },

    #[error("{}: need at least {required} closes to fit, got {available}", ErrCode::InsufficientData)]
    InsufficientData { required: usize, available: usize },

    #[error("{}: {0}", ErrCode::ParaError)]
    InvalidParameter(String),

    #[error("{}: least squares system is singular at order {order}", ErrCode::SingularFit)]
    SingularFit { order: usize },

    #[error("{code}: {msg}")]
    InvalidBar { code: ErrCode, msg: String },

    #[error("{}: {0}", ErrCode::KlNotMonotonous)]
    NotMonotonous(String),

    #[error("{}: {0}", ErrCode::ConfigError)]
    Config(String),
}

impl BandError {
    pub fn errcode(&self) -> ErrCode {
        match self {
            BandError::InsufficientHistory { .. } => ErrCode::InsufficientHistory,
            BandError::InsufficientData { .. } => ErrCode::InsufficientData,
            BandError::InvalidParameter(_) => ErrCode::ParaError,
            BandError::SingularFit { .. } => ErrCode::SingularFit,
            BandError::InvalidBar { code, .. } => *code,
            BandError::NotMonotonous(_) => ErrCode::KlNotMonotonous,
            BandError::Config(_) => ErrCode::ConfigError,
        }
    }

    pub fn is_kldata_err(&self) -> bool {
        self.errcode().is_kldata_err()
    }

    pub fn is_analysis_err(&self) -> bool {
        self.errcode().is_analysis_err()
    }
}
