pub(crate) mod csv_text;
pub(crate) mod plan_text;
