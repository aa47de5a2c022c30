//! Row -> record hydration.

use crate::driver::Row;
use crate::error::OrmResult;
use crate::record::Record;
use crate::schema::Schema;

/// Populate a fresh `R` from `row`.
///
/// For each field whose column is present in `row`, the raw value goes
/// through the attribute's load hook (if any) and is assigned with
/// [`Record::set`]. Columns missing from `row` leave the attribute at its
/// default; attributes the type does not declare are skipped.
pub fn hydrate<R: Record>(schema: &Schema, row: &Row) -> OrmResult<R> {
    let mut record = R::default();
    for field in schema.fields() {
        if record.get(&field.attr).is_none() {
            continue;
        }
        let Some(raw) = row.get(&field.column) else {
            continue;
        };
        let value = schema.hooks().load(&field.attr, raw.clone())?;
        record.set(&field.attr, value)?;
    }
    Ok(record)
}
