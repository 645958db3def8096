pub mod locator;
pub mod open_meteo;
pub mod risk;
