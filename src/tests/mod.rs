mod environment;
pub(crate) mod helpers;
