use ::time::OffsetDateTime;
use ::time::format_description::BorrowedFormatItem;
use ::time::macros::format_description;

use crate::error::SeedResult;

/// `YYYY-MM-DD HH:MM:SS+00`, always rendered in UTC.
const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]+00");

pub fn format_timestamp(at: OffsetDateTime) -> SeedResult<String> {
    let utc = at.to_offset(::time::UtcOffset::UTC);
    Ok(utc.format(TIMESTAMP_FORMAT)?)
}

/// Creation timestamp shared by every row of a run.
pub fn run_timestamp() -> SeedResult<String> {
    format_timestamp(OffsetDateTime::now_utc())
}
