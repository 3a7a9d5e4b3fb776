mod operation;
mod proxy;

pub use operation::{UpstreamBase, UpstreamEndpoints, WeatherOperation};
pub use proxy::{CacheSource, ProxyResponse, WeatherProxy};
