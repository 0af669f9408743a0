//! Named abstract function spaces.

/// A named abstract function space a field lives on.
///
/// Not to be confused with a coordinate basis: a `Basis` here is the isogeometric notion of
/// "which control mesh is this field's data indexed against". Equality and hashing are by
/// name only.
#[derive(Debug, Clone, Eq)]
pub struct Basis {
    name: String,
}

impl Basis {
    /// Construct a basis with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Basis { name: name.into() }
    }

    /// The basis' stable name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Case-folded comparison against a user-supplied filter token.
    pub fn fits_name(&self, code: &str) -> bool {
        self.name.eq_ignore_ascii_case(code)
    }
}

impl PartialEq for Basis {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl std::hash::Hash for Basis {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl std::fmt::Display for Basis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}
