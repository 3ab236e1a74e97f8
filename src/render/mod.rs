pub(crate) mod cover;
pub(crate) mod renderer;
pub(crate) mod surface;
