pub mod band_error;
pub mod enums;
pub mod time;
