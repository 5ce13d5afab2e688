pub(crate) mod attempts;
pub(crate) mod batches;
pub(crate) mod exams;
pub(crate) mod users;
