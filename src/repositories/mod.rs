pub(crate) mod exams;
pub(crate) mod health;
pub(crate) mod questions;
pub(crate) mod submissions;
pub(crate) mod users;
