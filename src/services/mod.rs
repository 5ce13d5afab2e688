pub(crate) mod attempts;
pub(crate) mod question_bank;
pub(crate) mod registry;
pub(crate) mod snapshots;
