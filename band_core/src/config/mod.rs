pub mod band_config;
