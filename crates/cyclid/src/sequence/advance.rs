#[cfg(feature = "memory")]
use crate::{Record, ScriptValue, StoreError};
#[cfg(feature = "memory")]
use std::collections::HashMap;

/// Name of the bundled cycle-advance script.
pub const CYCLE_NEXT: &str = "cycle_next";

/// Lua source of the bundled cycle-advance script, for Redis-compatible
/// stores.
pub const CYCLE_NEXT_LUA: &str = include_str!("cycle_next.lua");

/// Field of a cycle record that holds the index of the element the next
/// advance returns.
pub const CURRENT_FIELD: &str = "current";

/// Native counterpart of [`CYCLE_NEXT_LUA`], run by [`MemoryStore`].
///
/// Given `keys = [cycle]`:
/// 1. reads `current` as an index
/// 2. reads the element at that index
/// 3. counts the element fields (`n`)
/// 4. stores `(index + 1) mod n` back into `current`
/// 5. returns the element
///
/// A missing record yields [`ScriptValue::Nil`]. A record whose `current` is
/// missing, unparseable, at the largest index, or points at a missing element
/// is corrupt and fails
/// with [`StoreError::Script`], leaving the record untouched.
///
/// [`MemoryStore`]: crate::MemoryStore
#[cfg_attr(docsrs, doc(cfg(feature = "memory")))]
#[cfg(feature = "memory")]
pub fn advance_cycle(
    records: &mut HashMap<String, Record>,
    keys: &[&str],
    _args: &[&str],
) -> Result<ScriptValue, StoreError> {
    let [key] = keys else {
        return Err(StoreError::script(format!(
            "{CYCLE_NEXT} expects exactly one key, got {}",
            keys.len()
        )));
    };
    let Some(record) = records.get_mut(*key) else {
        return Ok(ScriptValue::Nil);
    };

    let idx = record
        .get(CURRENT_FIELD)
        .and_then(|raw| raw.parse::<u64>().ok())
        .ok_or_else(|| StoreError::script(format!("cycle {key} has a corrupt current index")))?;
    let value = record
        .get(&idx.to_string())
        .cloned()
        .ok_or_else(|| StoreError::script(format!("cycle {key} has no element {idx}")))?;

    let n = record.keys().filter(|field| is_element_field(field)).count() as u64;
    let next = idx
        .checked_add(1)
        .ok_or_else(|| StoreError::script(format!("cycle {key} index {idx} cannot advance")))?
        % n;
    record.insert(CURRENT_FIELD.to_owned(), next.to_string());

    Ok(ScriptValue::Str(value))
}

#[cfg(feature = "memory")]
fn is_element_field(field: &str) -> bool {
    !field.is_empty() && field.bytes().all(|b| b.is_ascii_digit())
}
