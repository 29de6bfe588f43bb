mod forecast;
mod health;

pub(crate) use forecast::forecast;
pub(crate) use health::health;
