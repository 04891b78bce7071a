// Domain layer: core models and ports (interfaces). No dependencies on the
// concrete HTTP client or storage backends.

pub mod model;
pub mod ports;
