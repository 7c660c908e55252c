use crate::{CURRENT_FIELD, Error, KeyValueStore, Result, Script, ScriptExecutor, ScriptValue};
use core::fmt;
use std::sync::Arc;
#[cfg(feature = "tracing")]
use tracing::instrument;

/// A named, persistent sequence of strings that many processes advance
/// together, wrapping back to the first element after the last.
///
/// The sequence lives in the store as one record: field `current` holds the
/// index of the element the next [`advance`] returns, fields `0..n` hold the
/// elements. Each [`advance`] is a single atomic script call that returns the
/// current element and moves `current` forward, so concurrent callers across
/// processes jointly observe `e0, e1, .., e(n-1), e0, ..` with nothing
/// skipped or repeated out of turn. No client-side lock is involved.
///
/// `CycleSequence` deliberately does **not** implement [`Iterator`]: it never
/// ends, so adapters such as `collect` or `count` would never return. Use
/// [`advance`] directly. There is no way to remove an element.
///
/// # Example
///
/// ```
/// use cyclid::{CachingScriptExecutor, CycleSequence, MemoryStore};
/// use std::sync::Arc;
///
/// let store = Arc::new(MemoryStore::new());
/// let executor = Arc::new(CachingScriptExecutor::new(Arc::clone(&store)));
/// let colors = CycleSequence::new("colors", store, executor);
///
/// colors.create(["red", "green"]).unwrap();
/// assert_eq!(colors.advance().unwrap().as_deref(), Some("red"));
/// assert_eq!(colors.advance().unwrap().as_deref(), Some("green"));
/// assert_eq!(colors.advance().unwrap().as_deref(), Some("red"));
///
/// colors.delete().unwrap();
/// assert_eq!(colors.advance().unwrap(), None);
/// ```
///
/// [`advance`]: Self::advance
pub struct CycleSequence<S, E>
where
    S: KeyValueStore + ?Sized,
    E: ScriptExecutor + ?Sized,
{
    name: String,
    store: Arc<S>,
    executor: Arc<E>,
    script: Script,
}

impl<S, E> Clone for CycleSequence<S, E>
where
    S: KeyValueStore + ?Sized,
    E: ScriptExecutor + ?Sized,
{
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            store: Arc::clone(&self.store),
            executor: Arc::clone(&self.executor),
            script: self.script.clone(),
        }
    }
}

impl<S, E> fmt::Debug for CycleSequence<S, E>
where
    S: KeyValueStore + ?Sized,
    E: ScriptExecutor + ?Sized,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CycleSequence")
            .field("name", &self.name)
            .field("script", &self.script.name())
            .finish_non_exhaustive()
    }
}

impl<S, E> CycleSequence<S, E>
where
    S: KeyValueStore + ?Sized,
    E: ScriptExecutor + ?Sized,
{
    /// Binds a handle to the record `name`. Nothing is read or written.
    pub fn new(name: impl Into<String>, store: Arc<S>, executor: Arc<E>) -> Self {
        Self {
            name: name.into(),
            store,
            executor,
            script: Script::cycle_next(),
        }
    }

    /// Advances with `script` instead of the bundled one, e.g. a script
    /// obtained through [`Script::resolve`].
    pub fn with_script(mut self, script: Script) -> Self {
        self.script = script;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` if the record exists in the store.
    pub fn exists(&self) -> Result<bool> {
        Ok(self.store.exists(&self.name)?)
    }

    /// Writes a fresh record holding `elements` and positioned on the first.
    ///
    /// Any previous record under the same name is replaced as a whole,
    /// including elements beyond the new length. Returns `self` for chaining.
    ///
    /// # Errors
    /// - [`Error::EmptyCycle`] if `elements` is empty
    /// - [`Error::Store`] if the write fails
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all, fields(cycle = %self.name)))]
    pub fn create<I, V>(&self, elements: I) -> Result<&Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let mut fields = vec![(CURRENT_FIELD.to_owned(), "0".to_owned())];
        fields.extend(
            elements
                .into_iter()
                .enumerate()
                .map(|(i, element)| (i.to_string(), element.into())),
        );
        if fields.len() == 1 {
            return Err(Error::EmptyCycle {
                key: self.name.clone(),
            });
        }

        self.store.replace_fields(&self.name, &fields)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(elements = fields.len() - 1, "created cycle");
        Ok(self)
    }

    /// Like [`Self::create`], but leaves an existing record untouched.
    ///
    /// The existence check and the write are two separate requests. Two
    /// callers racing here may both create; afterwards the cycle exists, but
    /// its elements are those of whichever write landed last.
    pub fn create_if_not_exists<I, V>(&self, elements: I) -> Result<&Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        if self.exists()? {
            return Ok(self);
        }
        self.create(elements)
    }

    /// Returns the current element and moves the cycle forward, atomically.
    ///
    /// # Returns
    /// - `Ok(Some(element))`: The element this call claimed
    /// - `Ok(None)`: The cycle does not exist (never created, or deleted)
    /// - `Err(e)`: The store failed, or the script answered with something
    ///   other than a string ([`Error::UnexpectedScriptResult`])
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self), fields(cycle = %self.name)))]
    pub fn advance(&self) -> Result<Option<String>> {
        if !self.exists()? {
            return Ok(None);
        }

        match self.executor.execute(&self.script, &[self.name.as_str()], &[])? {
            ScriptValue::Str(element) => Ok(Some(element)),
            // Deleted between the existence check and the script.
            ScriptValue::Nil => Ok(None),
            found => Err(Error::UnexpectedScriptResult {
                key: self.name.clone(),
                found,
            }),
        }
    }

    /// Always `true`: a cycle has no end.
    pub fn has_next(&self) -> bool {
        true
    }

    /// Removes the record. Deleting a missing cycle succeeds.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self), fields(cycle = %self.name)))]
    pub fn delete(&self) -> Result<()> {
        self.store.delete(&self.name)?;

        #[cfg(feature = "tracing")]
        tracing::debug!("deleted cycle");
        Ok(())
    }
}
