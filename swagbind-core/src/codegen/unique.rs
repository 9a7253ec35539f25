use std::borrow::Cow;

use bumpalo::{
    Bump,
    collections::{CollectIn, Vec as BumpVec},
};
use itertools::Itertools;
use rustc_hash::FxHashMap;
use unicase::UniCase;

/// An arena for scopes of unique names.
#[derive(Debug, Default)]
pub struct UniqueNames(Bump);

impl UniqueNames {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new, empty scope that's backed by this arena.
    ///
    /// Two names collide within a scope if they have the same words,
    /// ignoring case and separators: `user_id`, `userId` and `UserID`
    /// all collide.
    #[inline]
    pub fn scope(&self) -> UniqueNamesScope<'_> {
        UniqueNamesScope {
            arena: &self.0,
            taken: FxHashMap::default(),
        }
    }

    /// Creates a new scope that's backed by this arena, with
    /// the given names already taken.
    ///
    /// # Examples
    ///
    /// ```
    /// # use swagbind_core::codegen::UniqueNames;
    /// let unique = UniqueNames::new();
    /// let mut scope = unique.scope_with_reserved(["Codable"]);
    /// assert_eq!(scope.uniquify("codable"), "codable2");
    /// ```
    pub fn scope_with_reserved<S: AsRef<str>>(
        &self,
        reserved: impl IntoIterator<Item = S>,
    ) -> UniqueNamesScope<'_> {
        let mut scope = self.scope();
        for name in reserved {
            scope.take(name.as_ref());
        }
        scope
    }
}

/// A scope of unique names.
#[derive(Debug)]
pub struct UniqueNamesScope<'a> {
    arena: &'a Bump,
    /// Maps the words of each taken name to the last
    /// suffix tried for it.
    taken: FxHashMap<&'a [UniCase<&'a str>], usize>,
}

impl<'a> UniqueNamesScope<'a> {
    /// Adds a name to this scope. Returns the name as-is if it doesn't
    /// collide with any name in the scope; otherwise, returns the name
    /// with the lowest numeric suffix that doesn't collide.
    ///
    /// # Examples
    ///
    /// ```
    /// # use swagbind_core::codegen::UniqueNames;
    /// let unique = UniqueNames::new();
    /// let mut scope = unique.scope();
    /// assert_eq!(scope.uniquify("userId"), "userId");
    /// assert_eq!(scope.uniquify("user_id"), "user_id2");
    /// assert_eq!(scope.uniquify("UserID"), "UserID3");
    /// ```
    pub fn uniquify<'b>(&mut self, name: &'b str) -> Cow<'b, str> {
        let key = self.key(name);
        let Some(&last) = self.taken.get(key) else {
            self.taken.insert(key, 1);
            return name.into();
        };
        let mut suffix = last;
        let unique = loop {
            suffix += 1;
            let candidate = format!("{name}{suffix}");
            if !self.taken.contains_key(self.key(&candidate)) {
                break candidate;
            }
        };
        self.taken.insert(key, suffix);
        self.take(&unique);
        unique.into()
    }

    /// Takes a name without renaming it.
    fn take(&mut self, name: &str) {
        let key = self.key(name);
        self.taken.entry(key).or_insert(1);
    }

    fn key(&self, name: &str) -> &'a [UniCase<&'a str>] {
        let name: &'a str = self.arena.alloc_str(name);
        words(name)
            .map(UniCase::new)
            .collect_in::<BumpVec<_>>(self.arena)
            .into_bump_slice()
    }
}

/// Splits an identifier into words.
///
/// Words are separated by any character that isn't a letter or a digit,
/// and by case changes: `httpResponse` and `XMLHttp` are two words each.
/// A letter that follows a digit also starts a new word, so that
/// `1099KStatus` and `1099_K_Status` have the same words.
///
/// # Examples
///
/// ```
/// # use itertools::Itertools;
/// # use swagbind_core::codegen::words;
/// assert_eq!(words("XMLHttpRequest").collect_vec(), ["XML", "Http", "Request"]);
/// assert_eq!(words("user-accounts").collect_vec(), ["user", "accounts"]);
/// assert_eq!(words("1099KStatus").collect_vec(), ["1099", "K", "Status"]);
/// ```
pub fn words(input: &str) -> impl Iterator<Item = &str> {
    input
        .split(|c: char| !c.is_alphanumeric())
        .filter(|chunk| !chunk.is_empty())
        .flat_map(humps)
}

/// Splits a run of letters and digits at case and digit-to-letter changes.
fn humps(chunk: &str) -> impl Iterator<Item = &str> {
    let chars = chunk.char_indices().collect_vec();
    let boundaries = chars
        .iter()
        .tuple_windows()
        .enumerate()
        .filter(|&(index, (&(_, prev), &(_, c)))| {
            let next = chars.get(index + 2).map(|&(_, next)| next);
            (prev.is_lowercase() && c.is_uppercase())
                || (prev.is_uppercase() && c.is_uppercase() && next.is_some_and(char::is_lowercase))
                || (prev.is_numeric() && c.is_alphabetic())
        })
        .map(|(_, (_, &(at, _)))| at)
        .collect_vec();
    std::iter::once(0)
        .chain(boundaries)
        .chain(std::iter::once(chunk.len()))
        .tuple_windows()
        .map(|(start, end)| &chunk[start..end])
}
