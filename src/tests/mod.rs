pub(crate) mod generators;
