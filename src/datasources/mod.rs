pub mod grid_weather;
pub mod weather_file;

pub use grid_weather::GridWeatherClient;
pub use weather_file::load_weather_file;
